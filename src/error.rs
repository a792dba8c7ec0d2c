use std::path::PathBuf;

use hyper::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between parsing a coordinate and having its artifact on disk.
///
/// Nothing is retried internally - every error is returned to the immediate caller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid package name {coordinate:?}: {reason}; expected groupId:artifactId:version")]
    MalformedCoordinate {
        coordinate: String,
        reason: String,
    },

    #[error("invalid repository URL {url:?}: {reason}")]
    InvalidRepositoryUrl {
        url: String,
        reason: String,
    },

    #[error("unable to fetch maven metadata from {url}: HTTP status code {status}")]
    MetadataFetch {
        url: String,
        status: StatusCode,
    },

    #[error("unable to fetch maven metadata from {url}")]
    MetadataTransport {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("malformed maven metadata at {url}")]
    MetadataParse {
        url: String,
        #[source]
        source: serde_xml_rs::Error,
    },

    #[error("request for {url} failed")]
    Transport {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("download of {url} failed: HTTP status code {status}")]
    Download {
        url: String,
        status: StatusCode,
    },

    #[error("cannot write {}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn malformed(coordinate: &str, reason: impl Into<String>) -> FetchError {
        FetchError::MalformedCoordinate {
            coordinate: coordinate.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> FetchError {
        FetchError::Filesystem {
            path: path.into(),
            source,
        }
    }
}
