use crate::maven::coordinates::*;

pub const METADATA_FILE_NAME: &str = "maven-metadata.xml";


/// `<groupId with '/' instead of '.'>/<artifactId>`, the directory holding all versions of an
///  artifact
pub fn artifact_directory(group_id: &MavenGroupId, artifact_id: &MavenArtifactId) -> String {
    format!("{}/{}", group_id.0.replace('.', "/"), artifact_id.0)
}

/// NB: snapshot directories always carry the literal '-SNAPSHOT' suffix, no matter how the
///  suffix was removed from the parsed version
pub fn version_directory(coordinates: &MavenCoordinates) -> String {
    let version = match &coordinates.version {
        MavenVersion::Release(v) => v.clone(),
        MavenVersion::Snapshot { version, .. } => format!("{}{}", version, SNAPSHOT_SUFFIX),
    };

    format!(
        "{}/{}",
        artifact_directory(&coordinates.group_id, &coordinates.artifact_id),
        version,
    )
}

/// path is the relative path inside a maven repository, i.e. it starts with something like
///  "org/..." or "com/..."
pub fn as_maven_path(artifact_ref: &MavenArtifactRef) -> String {
    format!(
        "{}/{}",
        version_directory(&artifact_ref.coordinates),
        maven_file_name(artifact_ref),
    )
}

/// The artifact-level metadata listing latest / release versions
pub fn artifact_metadata_path(group_id: &MavenGroupId, artifact_id: &MavenArtifactId) -> String {
    format!("{}/{}", artifact_directory(group_id, artifact_id), METADATA_FILE_NAME)
}

/// The snapshot-level metadata announcing the current timestamp and build number
pub fn snapshot_metadata_path(coordinates: &MavenCoordinates) -> String {
    format!("{}/{}", version_directory(coordinates), METADATA_FILE_NAME)
}

/// `<artifactId>-<version>[-<classifier>].<extension>`, where a snapshot's version is followed
///  either by its resolved qualifier or by the literal 'SNAPSHOT'
pub fn maven_file_name(artifact_ref: &MavenArtifactRef) -> String {
    let classifier_string = match &artifact_ref.classifier {
        MavenClassifier::Unclassified => "".to_string(),
        MavenClassifier::Classified(c) => format!("-{}", c),
    };

    let version_string = match &artifact_ref.coordinates.version {
        MavenVersion::Release(v) => v.clone(),
        MavenVersion::Snapshot { version, qualifier: Some(qualifier) } => format!("{}-{}", version, qualifier),
        MavenVersion::Snapshot { version, qualifier: None } => format!("{}{}", version, SNAPSHOT_SUFFIX),
    };

    format!("{}-{}{}.{}",
            artifact_ref.coordinates.artifact_id.0,
            version_string,
            classifier_string,
            artifact_ref.extension(),
    )
}
