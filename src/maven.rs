pub mod coordinates;
pub mod metadata_xml;
pub mod paths;
pub mod remote_repo;

pub use coordinates::{MavenArtifactRef, SnapshotSuffixPolicy};
pub use metadata_xml::MavenMetadata;
pub use remote_repo::{RemoteMavenRepo, ResolvedArtifact, SnapshotResolution, DEFAULT_REPOSITORY_URL};
