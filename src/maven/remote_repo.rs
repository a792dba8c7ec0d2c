use hyper::{StatusCode, Uri};
use tracing::{debug, trace, warn};

use crate::error::FetchError;
use crate::maven::coordinates::{MavenArtifactId, MavenArtifactRef, MavenCoordinates, MavenGroupId};
use crate::maven::metadata_xml::{parse_metadata_xml, MavenMetadata};
use crate::maven::paths::{artifact_metadata_path, as_maven_path, snapshot_metadata_path};
use crate::util::body::HttpResponse;
use crate::util::http_transport::{Credentials, HttpTransport};

pub const DEFAULT_REPOSITORY_URL: &str = "https://repo1.maven.org/maven2/";

/// What happens if the snapshot-level metadata can not be fetched or parsed while resolving a
///  snapshot artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotResolution {
    /// fall back to the literal '-SNAPSHOT' file name
    #[default]
    Lenient,
    /// fail the resolution with the metadata error
    Strict,
}

/// An artifact reference together with the absolute URL it is downloaded from. For snapshots,
///  the reference carries the qualifier if one was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub artifact_ref: MavenArtifactRef,
    pub url: String,
}

pub struct RemoteMavenRepo<T: HttpTransport> {
    transport: T,
    base_uri: String, // with trailing '/'
    credentials: Option<Credentials>,
    snapshot_resolution: SnapshotResolution,
}

impl <T: HttpTransport> RemoteMavenRepo<T> {
    /// `None` (or an empty string) means Maven Central
    pub fn new(base_uri: Option<String>, transport: T) -> Result<RemoteMavenRepo<T>, FetchError> {
        let mut base_uri = base_uri
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REPOSITORY_URL.to_string());
        if !base_uri.ends_with('/') {
            base_uri.push('/');
        }

        // check that the base URI is valid
        Uri::try_from(base_uri.clone())
            .map_err(|e| FetchError::InvalidRepositoryUrl { url: base_uri.clone(), reason: e.to_string() })?;

        Ok(RemoteMavenRepo {
            transport,
            base_uri,
            credentials: None,
            snapshot_resolution: SnapshotResolution::default(),
        })
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> RemoteMavenRepo<T> {
        self.credentials = credentials;
        self
    }

    pub fn with_snapshot_resolution(mut self, snapshot_resolution: SnapshotResolution) -> RemoteMavenRepo<T> {
        self.snapshot_resolution = snapshot_resolution;
        self
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_uri, path)
    }

    /// Artifact-level maven-metadata.xml, listing latest / release versions
    pub async fn fetch_artifact_metadata(&self, group_id: &MavenGroupId, artifact_id: &MavenArtifactId) -> Result<MavenMetadata, FetchError> {
        self.fetch_metadata(self.url_for(&artifact_metadata_path(group_id, artifact_id))).await
    }

    /// Snapshot-level maven-metadata.xml in the '<version>-SNAPSHOT' directory, announcing the
    ///  current timestamp and build number
    pub async fn fetch_snapshot_metadata(&self, coordinates: &MavenCoordinates) -> Result<MavenMetadata, FetchError> {
        self.fetch_metadata(self.url_for(&snapshot_metadata_path(coordinates))).await
    }

    async fn fetch_metadata(&self, url: String) -> Result<MavenMetadata, FetchError> {
        debug!("fetching maven metadata from {}", url);

        let response = match self.transport.get(&url, self.credentials.as_ref()).await {
            Ok(response) => response,
            Err(source) => return Err(FetchError::MetadataTransport { url, source }),
        };

        if response.status != StatusCode::OK {
            return Err(FetchError::MetadataFetch { url, status: response.status });
        }

        let body = match response.into_bytes().await {
            Ok(body) => body,
            Err(source) => return Err(FetchError::MetadataTransport { url, source }),
        };

        parse_metadata_xml(&body)
            .map_err(|source| FetchError::MetadataParse { url, source })
    }

    /// Attaches the current snapshot qualifier to an unresolved snapshot reference. Releases and
    ///  references that are resolved already are returned as they are.
    ///
    /// A snapshot directory whose metadata does not announce a timestamp / build number pair
    ///  leaves the reference unresolved.
    pub async fn resolve_snapshot(&self, artifact_ref: MavenArtifactRef) -> Result<MavenArtifactRef, FetchError> {
        if !artifact_ref.coordinates.version.is_snapshot() || artifact_ref.coordinates.version.qualifier().is_some() {
            return Ok(artifact_ref);
        }

        match self.fetch_snapshot_metadata(&artifact_ref.coordinates).await {
            Ok(metadata) => match metadata.snapshot {
                Some(qualifier) => {
                    debug!("resolved snapshot {} to build {}", artifact_ref, qualifier);
                    Ok(artifact_ref.with_snapshot_qualifier(qualifier))
                }
                None => {
                    debug!("no snapshot build announced for {}", artifact_ref);
                    Ok(artifact_ref)
                }
            },
            Err(e) => match self.snapshot_resolution {
                SnapshotResolution::Lenient => {
                    warn!("could not resolve snapshot {}, falling back to unqualified file name: {}", artifact_ref, e);
                    Ok(artifact_ref)
                }
                SnapshotResolution::Strict => Err(e),
            }
        }
    }

    /// Computes the absolute download URL, doing the snapshot metadata round-trip if necessary
    pub async fn resolve(&self, artifact_ref: MavenArtifactRef) -> Result<ResolvedArtifact, FetchError> {
        let artifact_ref = self.resolve_snapshot(artifact_ref).await?;
        let url = self.url_for(&as_maven_path(&artifact_ref));
        trace!("{} resolves to {}", artifact_ref, url);
        Ok(ResolvedArtifact { artifact_ref, url })
    }

    /// Starts the download of a resolved artifact. Anything but a 2xx status is an error.
    pub async fn get_artifact(&self, resolved: &ResolvedArtifact) -> Result<HttpResponse, FetchError> {
        let response = self.transport.get(&resolved.url, self.credentials.as_ref())
            .await
            .map_err(|source| FetchError::Transport { url: resolved.url.clone(), source })?;

        if !response.status.is_success() {
            return Err(FetchError::Download { url: resolved.url.clone(), status: response.status });
        }
        Ok(response)
    }
}
