#![allow(non_snake_case)]

//! Serde model of the subset of maven-metadata.xml this crate consumes, see
//!  https://maven.apache.org/ref/3.9.5/maven-repository-metadata/repository-metadata.html
//!
//! Unknown elements are ignored, every element is optional.

use serde::Deserialize;

use crate::maven::coordinates::SnapshotQualifier;

#[derive(Deserialize, Debug, Default)]
pub struct Metadata {
    #[serde(default)]
    groupId: Option<String>,
    #[serde(default)]
    artifactId: Option<String>,
    #[serde(default)]
    versioning: Option<Versioning>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Versioning {
    #[serde(default)]
    latest: Option<String>,
    #[serde(default)]
    release: Option<String>,
    #[serde(default)]
    versions: Option<Versions>,
    #[serde(default)]
    lastUpdated: Option<String>,
    #[serde(default)]
    snapshot: Option<Snapshot>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Versions {
    #[serde(default)]
    version: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Snapshot {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    buildNumber: Option<String>,
}

/// The information a maven-metadata.xml file provides about an artifact (artifact-level
///  metadata) or about one of its snapshot versions (snapshot-level metadata).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MavenMetadata {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub latest_version: Option<String>,
    pub release_version: Option<String>,
    pub versions: Vec<String>,
    pub last_updated: Option<String>,
    /// only present if the document announces both a timestamp and a build number
    pub snapshot: Option<SnapshotQualifier>,
}

impl From<Metadata> for MavenMetadata {
    fn from(metadata: Metadata) -> Self {
        let versioning = metadata.versioning.unwrap_or_default();

        let snapshot = versioning.snapshot
            .and_then(|s| match (non_blank(s.timestamp), non_blank(s.buildNumber)) {
                (Some(timestamp), Some(build_number)) => Some(SnapshotQualifier { timestamp, build_number }),
                _ => None,
            });

        MavenMetadata {
            group_id: non_blank(metadata.groupId),
            artifact_id: non_blank(metadata.artifactId),
            latest_version: non_blank(versioning.latest),
            release_version: non_blank(versioning.release),
            versions: versioning.versions
                .map(|v| v.version)
                .unwrap_or_default(),
            last_updated: non_blank(versioning.lastUpdated),
            snapshot,
        }
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// The root element's name is not checked
pub fn parse_metadata_xml(xml: &[u8]) -> Result<MavenMetadata, serde_xml_rs::Error> {
    let metadata: Metadata = serde_xml_rs::from_reader(xml)?;
    Ok(metadata.into())
}
