use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::FetchError;

pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";
pub const DEFAULT_EXTENSION: &str = "jar";

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MavenGroupId(pub String);

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MavenArtifactId(pub String);

/// Identifies one concrete build of a snapshot, as announced in the snapshot directory's
///  maven-metadata.xml. Rendered as `<timestamp>-<buildNumber>`.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SnapshotQualifier {
    pub timestamp: String,
    pub build_number: String,
}
impl Display for SnapshotQualifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.timestamp, self.build_number)
    }
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum MavenVersion {
    Release(String),
    Snapshot {
        version: String, // without the '-SNAPSHOT' suffix
        qualifier: Option<SnapshotQualifier>,
    }
}
impl MavenVersion {
    /// The version as stored after parsing, i.e. without any snapshot marker
    pub fn base(&self) -> &str {
        match self {
            MavenVersion::Release(v) => v,
            MavenVersion::Snapshot { version, .. } => version,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, MavenVersion::Snapshot { .. })
    }

    pub fn qualifier(&self) -> Option<&SnapshotQualifier> {
        match self {
            MavenVersion::Release(_) => None,
            MavenVersion::Snapshot { qualifier, .. } => qualifier.as_ref(),
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MavenCoordinates {
    pub group_id: MavenGroupId,
    pub artifact_id: MavenArtifactId,
    pub version: MavenVersion,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum MavenClassifier {
    Unclassified,
    Classified(String),
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MavenArtifactRef {
    pub coordinates: MavenCoordinates,
    pub classifier: MavenClassifier,
    /// without leading '.'; `None` means the default 'jar'
    pub extension: Option<String>,
}
impl MavenArtifactRef {
    pub fn extension(&self) -> &str {
        self.extension.as_deref().unwrap_or(DEFAULT_EXTENSION)
    }

    /// An explicit extension replaces the parsed one, `None` keeps it
    pub fn with_extension(mut self, extension: Option<String>) -> MavenArtifactRef {
        if let Some(extension) = extension.filter(|e| !e.is_empty()) {
            self.extension = Some(extension);
        }
        self
    }

    /// Attaches the concrete build of a snapshot. Release versions are returned unchanged.
    pub fn with_snapshot_qualifier(mut self, snapshot_qualifier: SnapshotQualifier) -> MavenArtifactRef {
        if let MavenVersion::Snapshot { qualifier, .. } = &mut self.coordinates.version {
            *qualifier = Some(snapshot_qualifier);
        }
        self
    }
}
impl Display for MavenArtifactRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let coordinates = &self.coordinates;
        write!(f, "{}:{}", coordinates.group_id.0, coordinates.artifact_id.0)?;
        match &self.classifier {
            MavenClassifier::Classified(c) => write!(f, ":{}:{}", self.extension(), c)?,
            MavenClassifier::Unclassified => {
                if let Some(extension) = &self.extension {
                    write!(f, ":{}", extension)?;
                }
            }
        }
        write!(f, ":{}", coordinates.version.base())?;
        if coordinates.version.is_snapshot() {
            f.write_str(SNAPSHOT_SUFFIX)?;
        }
        Ok(())
    }
}

/// How the `-SNAPSHOT` marker is removed from a version string during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotSuffixPolicy {
    /// remove exactly one trailing `-SNAPSHOT`
    #[default]
    StripSuffix,
    /// trim every character of `-SNAPSHOT` from both ends of the version, as older tooling did.
    ///  NB: this over-trims versions that legitimately start or end with one of these characters
    TrimCharacters,
}
impl SnapshotSuffixPolicy {
    fn strip<'a>(&self, version: &'a str) -> &'a str {
        match self {
            SnapshotSuffixPolicy::StripSuffix => version.strip_suffix(SNAPSHOT_SUFFIX).unwrap_or(version),
            SnapshotSuffixPolicy::TrimCharacters => version.trim_matches(|c: char| SNAPSHOT_SUFFIX.contains(c)),
        }
    }
}

/// Parses `groupId:artifactId[:extension[:classifier]]:version`.
///
/// The last segment is always the version, segments between the classifier and the version are
///  ignored. Empty extension or classifier segments count as absent.
pub fn parse_coordinate(coordinate: &str, policy: SnapshotSuffixPolicy) -> Result<MavenArtifactRef, FetchError> {
    let parts: Vec<&str> = coordinate.split(':').collect();
    if parts.len() < 3 {
        return Err(FetchError::malformed(coordinate, format!("expected at least 3 segments, found {}", parts.len())));
    }

    let group_id = parts[0];
    let artifact_id = parts[1];
    let raw_version = parts[parts.len() - 1];

    if group_id.is_empty() {
        return Err(FetchError::malformed(coordinate, "empty groupId"));
    }
    if artifact_id.is_empty() {
        return Err(FetchError::malformed(coordinate, "empty artifactId"));
    }

    let extension = if parts.len() > 3 { non_empty(parts[2]) } else { None };
    let classifier = if parts.len() > 4 { non_empty(parts[3]) } else { None };

    let version = if raw_version.ends_with(SNAPSHOT_SUFFIX) {
        MavenVersion::Snapshot {
            version: policy.strip(raw_version).to_string(),
            qualifier: None,
        }
    }
    else {
        MavenVersion::Release(raw_version.to_string())
    };

    if version.base().is_empty() {
        return Err(FetchError::malformed(coordinate, "empty version"));
    }

    Ok(MavenArtifactRef {
        coordinates: MavenCoordinates {
            group_id: MavenGroupId(group_id.to_string()),
            artifact_id: MavenArtifactId(artifact_id.to_string()),
            version,
        },
        classifier: match classifier {
            None => MavenClassifier::Unclassified,
            Some(c) => MavenClassifier::Classified(c),
        },
        extension,
    })
}

fn non_empty(segment: &str) -> Option<String> {
    if segment.is_empty() {
        None
    }
    else {
        Some(segment.to_string())
    }
}

impl FromStr for MavenArtifactRef {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_coordinate(s, SnapshotSuffixPolicy::default())
    }
}
