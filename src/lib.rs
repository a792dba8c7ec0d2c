//! Fetches artifacts and their metadata from Maven-style repositories, given shorthand
//!  coordinates like `groupId:artifactId[:extension[:classifier]]:version`.

pub mod download;
pub mod error;
pub mod maven;
pub mod util;

pub use download::Downloader;
pub use error::FetchError;
