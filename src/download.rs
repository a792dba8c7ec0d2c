use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use futures::StreamExt;
use tokio::fs::{remove_file, rename, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::FetchError;
use crate::maven::coordinates::{parse_coordinate, MavenArtifactRef, SnapshotSuffixPolicy};
use crate::maven::metadata_xml::MavenMetadata;
use crate::maven::paths::maven_file_name;
use crate::maven::remote_repo::{RemoteMavenRepo, ResolvedArtifact};
use crate::util::body::HttpResponse;
use crate::util::http_transport::HttpTransport;

/// Entry point tying together coordinate parsing, URL resolution and writing the payload to disk.
///
/// Everything is sequential: at most one snapshot metadata request followed by the artifact
///  request per download.
pub struct Downloader<T: HttpTransport> {
    repo: RemoteMavenRepo<T>,
    suffix_policy: SnapshotSuffixPolicy,
}

impl <T: HttpTransport> Downloader<T> {
    pub fn new(repo: RemoteMavenRepo<T>) -> Downloader<T> {
        Downloader {
            repo,
            suffix_policy: SnapshotSuffixPolicy::default(),
        }
    }

    pub fn with_suffix_policy(mut self, suffix_policy: SnapshotSuffixPolicy) -> Downloader<T> {
        self.suffix_policy = suffix_policy;
        self
    }

    pub fn repo(&self) -> &RemoteMavenRepo<T> {
        &self.repo
    }

    pub fn parse(&self, coordinate: &str) -> Result<MavenArtifactRef, FetchError> {
        parse_coordinate(coordinate, self.suffix_policy)
    }

    pub async fn resolve_url(&self, coordinate: &str, extension: Option<&str>) -> Result<ResolvedArtifact, FetchError> {
        let artifact_ref = self.parse(coordinate)?
            .with_extension(extension.map(str::to_string));
        self.repo.resolve(artifact_ref).await
    }

    /// Downloads the artifact to `<dest>/<filename>` and returns that path.
    ///
    /// `filename` defaults to the artifact's file name as computed from the coordinate. For
    ///  snapshots this is the unqualified '-SNAPSHOT' name, so that newer builds replace older
    ///  ones locally.
    ///
    /// An explicit `filename` is relative to `dest` and may name a subdirectory, which must exist.
    ///  Absolute names and names containing '..' are rejected before anything is requested.
    ///
    /// The destination directory must exist. The payload goes to a temporary file first, which
    ///  is renamed only once the download is complete, so a failed download never leaves a
    ///  truncated file behind.
    pub async fn download(&self, coordinate: &str, dest: &Path, filename: Option<&str>, extension: Option<&str>) -> Result<PathBuf, FetchError> {
        let artifact_ref = self.parse(coordinate)?
            .with_extension(extension.map(str::to_string));

        let filename = match filename.filter(|f| !f.is_empty()) {
            Some(f) => f.to_string(),
            None => maven_file_name(&artifact_ref),
        };

        let target = target_path(dest, &filename)?;
        let temp = temp_path(&target, &filename);

        let resolved = self.repo.resolve(artifact_ref).await?;
        let response = self.repo.get_artifact(&resolved).await?;

        debug!("downloading {} to {} via {}", resolved.url, target.display(), temp.display());

        match write_body(&resolved.url, response, &temp).await {
            Ok(num_bytes) => {
                rename(&temp, &target)
                    .await
                    .map_err(|e| FetchError::filesystem(&target, e))?;
                info!("downloaded {} ({} bytes) to {}", resolved.url, num_bytes, target.display());
                Ok(target)
            }
            Err(e) => {
                match remove_file(&temp).await {
                    Ok(_) => {}
                    Err(cleanup) if cleanup.kind() == ErrorKind::NotFound => {}
                    Err(cleanup) => {
                        error!("error cleaning up {} after failed download: {}", temp.display(), cleanup);
                    }
                }
                Err(e)
            }
        }
    }

    /// The artifact-level metadata for the coordinate's group and artifact. The coordinate's
    ///  version is required syntactically but ignored.
    pub async fn download_metadata(&self, coordinate: &str) -> Result<MavenMetadata, FetchError> {
        let artifact_ref = self.parse(coordinate)?;
        self.repo.fetch_artifact_metadata(&artifact_ref.coordinates.group_id, &artifact_ref.coordinates.artifact_id).await
    }
}

/// `<dest>/<filename>`, as long as `filename` stays inside `dest`
fn target_path(dest: &Path, filename: &str) -> Result<PathBuf, FetchError> {
    let relative = Path::new(filename);
    let stays_inside = relative.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !stays_inside || relative.file_name().is_none() {
        return Err(FetchError::filesystem(
            relative,
            std::io::Error::new(ErrorKind::InvalidInput, "file name must be relative to the destination directory"),
        ));
    }
    Ok(dest.join(relative))
}

/// hidden sibling of the target, so that the final rename never crosses directories
fn temp_path(target: &Path, filename: &str) -> PathBuf {
    let name = target.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string());
    target.with_file_name(format!(".{}.{}.part", name, Uuid::new_v4().as_hyphenated()))
}

async fn write_body(url: &str, response: HttpResponse, path: &Path) -> Result<u64, FetchError> {
    let mut data = response.data;

    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .await
        .map_err(|e| FetchError::filesystem(path, e))?;

    let mut num_bytes = 0u64;
    while let Some(chunk) = data.next().await {
        let chunk = chunk.map_err(|source| FetchError::Transport { url: url.to_string(), source })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| FetchError::filesystem(path, e))?;
        num_bytes += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| FetchError::filesystem(path, e))?;

    Ok(num_bytes)
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::maven::remote_repo::SnapshotResolution;
    use crate::util::mock_transport::MockHttpTransport;

    const REPO: &str = "http://greatestRepo.com/";

    fn downloader(transport: MockHttpTransport) -> Downloader<MockHttpTransport> {
        Downloader::new(RemoteMavenRepo::new(Some(REPO.to_string()), transport).unwrap())
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir).unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_download_release() {
        let dest = tempfile::tempdir().unwrap();
        let downloader = downloader(MockHttpTransport::new()
            .with_response("http://greatestRepo.com/ch/qos/logback/logback-classic/1.2.11/logback-classic-1.2.11.jar", 200, "jar bytes"));

        let path = downloader.download("ch.qos.logback:logback-classic:1.2.11", dest.path(), None, None).await.unwrap();

        assert_eq!(path, dest.path().join("logback-classic-1.2.11.jar"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "jar bytes");
        assert_eq!(dir_entries(dest.path()), vec!["logback-classic-1.2.11.jar"]);
    }

    #[tokio::test]
    async fn test_download_with_filename_and_extension_override() {
        let dest = tempfile::tempdir().unwrap();
        let downloader = downloader(MockHttpTransport::new()
            .with_response("http://greatestRepo.com/g/a/1.0/a-1.0.pom", 200, "<project/>"));

        let path = downloader.download("g:a:war:1.0", dest.path(), Some("renamed.xml"), Some("pom")).await.unwrap();

        assert_eq!(path, dest.path().join("renamed.xml"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<project/>");
    }

    #[tokio::test]
    async fn test_download_snapshot_keeps_unqualified_local_name() {
        let dest = tempfile::tempdir().unwrap();
        let downloader = downloader(MockHttpTransport::new()
            .with_response(
                "http://greatestRepo.com/my/group/theFact/7-SNAPSHOT/maven-metadata.xml",
                200,
                "<metadata><versioning><snapshot><timestamp>123</timestamp><buildNumber>456</buildNumber></snapshot></versioning></metadata>",
            )
            .with_response("http://greatestRepo.com/my/group/theFact/7-SNAPSHOT/theFact-7-123-456.jar", 200, "snapshot build"));

        let path = downloader.download("my.group:theFact:7-SNAPSHOT", dest.path(), None, None).await.unwrap();

        assert_eq!(path, dest.path().join("theFact-7-SNAPSHOT.jar"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "snapshot build");

        let urls: Vec<String> = downloader.repo().transport().requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec![
            "http://greatestRepo.com/my/group/theFact/7-SNAPSHOT/maven-metadata.xml",
            "http://greatestRepo.com/my/group/theFact/7-SNAPSHOT/theFact-7-123-456.jar",
        ]);
    }

    #[tokio::test]
    async fn test_download_truncates_existing_file() {
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(dest.path().join("a-1.0.jar"), "a much longer previous content").unwrap();
        let downloader = downloader(MockHttpTransport::new()
            .with_response("http://greatestRepo.com/g/a/1.0/a-1.0.jar", 200, "new"));

        let path = downloader.download("g:a:1.0", dest.path(), None, None).await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_download_non_success_status() {
        let dest = tempfile::tempdir().unwrap();
        let downloader = downloader(MockHttpTransport::new()
            .with_response("http://greatestRepo.com/g/a/1.0/a-1.0.jar", 401, "unauthorized"));

        let err = downloader.download("g:a:1.0", dest.path(), None, None).await.unwrap_err();
        assert!(matches!(err, FetchError::Download { .. }), "{:?}", err);
        assert!(dir_entries(dest.path()).is_empty());
    }

    #[tokio::test]
    async fn test_download_transport_failure() {
        let dest = tempfile::tempdir().unwrap();
        let downloader = downloader(MockHttpTransport::new()
            .with_failure("http://greatestRepo.com/g/a/1.0/a-1.0.jar", "connection reset"));

        let err = downloader.download("g:a:1.0", dest.path(), None, None).await.unwrap_err();
        match err {
            FetchError::Transport { url, .. } => assert_eq!(url, "http://greatestRepo.com/g/a/1.0/a-1.0.jar"),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_missing_destination_directory() {
        let dest = tempfile::tempdir().unwrap();
        let missing = dest.path().join("does-not-exist");
        let downloader = downloader(MockHttpTransport::new()
            .with_response("http://greatestRepo.com/g/a/1.0/a-1.0.jar", 200, "payload"));

        let err = downloader.download("g:a:1.0", &missing, None, None).await.unwrap_err();
        assert!(matches!(err, FetchError::Filesystem { .. }), "{:?}", err);
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn test_download_into_existing_subdirectory() {
        let dest = tempfile::tempdir().unwrap();
        std::fs::create_dir(dest.path().join("sub")).unwrap();
        let downloader = downloader(MockHttpTransport::new()
            .with_response("http://greatestRepo.com/g/a/1.0/a-1.0.jar", 200, "payload"));

        let path = downloader.download("g:a:1.0", dest.path(), Some("sub/x.jar"), None).await.unwrap();

        assert_eq!(path, dest.path().join("sub").join("x.jar"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "payload");
        assert_eq!(dir_entries(&dest.path().join("sub")), vec!["x.jar"]);
    }

    #[tokio::test]
    async fn test_broken_body_keeps_previous_file() {
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(dest.path().join("a-1.0.jar"), "old").unwrap();
        let downloader = downloader(MockHttpTransport::new()
            .with_broken_body("http://greatestRepo.com/g/a/1.0/a-1.0.jar", 200, "partial", "connection reset"));

        let err = downloader.download("g:a:1.0", dest.path(), None, None).await.unwrap_err();

        match err {
            FetchError::Transport { url, .. } => assert_eq!(url, "http://greatestRepo.com/g/a/1.0/a-1.0.jar"),
            other => panic!("expected transport error, got {:?}", other),
        }
        assert_eq!(dir_entries(dest.path()), vec!["a-1.0.jar"]);
        assert_eq!(std::fs::read_to_string(dest.path().join("a-1.0.jar")).unwrap(), "old");
    }

    #[rstest::rstest]
    #[case::parent("../escape.jar")]
    #[case::nested_parent("sub/../../escape.jar")]
    #[case::absolute("/tmp/escape.jar")]
    #[case::current_dir(".")]
    #[tokio::test]
    async fn test_download_rejects_filename_outside_destination(#[case] filename: &str) {
        let dest = tempfile::tempdir().unwrap();
        let downloader = downloader(MockHttpTransport::new()
            .with_response("http://greatestRepo.com/g/a/1.0/a-1.0.jar", 200, "payload"));

        let err = downloader.download("g:a:1.0", dest.path(), Some(filename), None).await.unwrap_err();

        match err {
            FetchError::Filesystem { path, source } => {
                assert_eq!(path, PathBuf::from(filename));
                assert_eq!(source.kind(), ErrorKind::InvalidInput);
            }
            other => panic!("expected filesystem error, got {:?}", other),
        }
        assert!(downloader.repo().transport().requests().is_empty());
        assert!(dir_entries(dest.path()).is_empty());
    }

    #[tokio::test]
    async fn test_download_malformed_coordinate_makes_no_request() {
        let dest = tempfile::tempdir().unwrap();
        let downloader = downloader(MockHttpTransport::new());

        let err = downloader.download("g:a", dest.path(), None, None).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedCoordinate { .. }), "{:?}", err);
        assert!(downloader.repo().transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_strict_snapshot_download_fails_on_missing_metadata() {
        let dest = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(
            RemoteMavenRepo::new(Some(REPO.to_string()), MockHttpTransport::new())
                .unwrap()
                .with_snapshot_resolution(SnapshotResolution::Strict)
        );

        let err = downloader.download("g:a:1.0-SNAPSHOT", dest.path(), None, None).await.unwrap_err();
        assert!(matches!(err, FetchError::MetadataFetch { .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn test_resolve_url_with_suffix_policy() {
        let downloader = downloader(MockHttpTransport::new())
            .with_suffix_policy(SnapshotSuffixPolicy::TrimCharacters);

        let resolved = downloader.resolve_url("g:a:1.0-HOTS-SNAPSHOT", Some("pom")).await.unwrap();
        assert_eq!(resolved.url, "http://greatestRepo.com/g/a/1.0-SNAPSHOT/a-1.0-SNAPSHOT.pom");
    }

    #[tokio::test]
    async fn test_download_metadata() {
        let downloader = downloader(MockHttpTransport::new()
            .with_response(
                "http://greatestRepo.com/ch/qos/logback/logback-classic/maven-metadata.xml",
                200,
                "<metadata><versioning><latest>2.11.0</latest><release>2.10.0</release></versioning></metadata>",
            ));

        let metadata = downloader.download_metadata("ch.qos.logback:logback-classic:1").await.unwrap();
        assert_eq!(metadata.latest_version.as_deref(), Some("2.11.0"));
        assert_eq!(metadata.release_version.as_deref(), Some("2.10.0"));
    }
}
