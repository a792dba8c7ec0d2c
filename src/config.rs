use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use arti_fetch::maven::{SnapshotResolution, SnapshotSuffixPolicy};
use arti_fetch::util::http_transport::Credentials;

/// Download artifacts and metadata from Maven-style repositories
#[derive(Parser, Debug)]
#[command(name = "arti-fetch", version, about)]
pub struct Cli {
    /// Repository base URL, defaults to Maven Central
    #[arg(long, short, env = "ARTI_FETCH_REPOSITORY", global = true)]
    pub repository: Option<String>,

    /// User for basic auth, only used together with --password
    #[arg(long, env = "ARTI_FETCH_USER", global = true)]
    pub user: Option<String>,

    #[arg(long, env = "ARTI_FETCH_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Deadline for the response head and for each chunk of the body, in seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,

    /// Fail instead of falling back to the '-SNAPSHOT' file name if snapshot metadata is unavailable
    #[arg(long, global = true)]
    pub strict_snapshots: bool,

    /// Strip the snapshot marker by trimming its characters from both ends of the version
    #[arg(long, global = true)]
    pub legacy_snapshot_trim: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Download an artifact, printing the path of the written file
    Fetch {
        /// groupId:artifactId[:extension[:classifier]]:version
        coordinate: String,

        /// Existing directory to write to
        #[arg(long, short, default_value = ".")]
        dest: PathBuf,

        /// Local file name instead of the artifact's own, relative to --dest
        #[arg(long, short)]
        filename: Option<String>,

        /// Overrides the coordinate's extension
        #[arg(long, short)]
        extension: Option<String>,
    },
    /// Print latest / release versions from the artifact's maven-metadata.xml
    Metadata {
        coordinate: String,
    },
    /// Print the resolved download URL without downloading
    Url {
        coordinate: String,

        #[arg(long, short)]
        extension: Option<String>,
    },
}

impl Cli {
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(self.user.clone(), self.password.clone())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    pub fn snapshot_resolution(&self) -> SnapshotResolution {
        if self.strict_snapshots {
            SnapshotResolution::Strict
        }
        else {
            SnapshotResolution::Lenient
        }
    }

    pub fn suffix_policy(&self) -> SnapshotSuffixPolicy {
        if self.legacy_snapshot_trim {
            SnapshotSuffixPolicy::TrimCharacters
        }
        else {
            SnapshotSuffixPolicy::StripSuffix
        }
    }

    /// default filter if RUST_LOG is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "arti_fetch=debug"
        }
        else {
            "arti_fetch=info"
        }
    }
}
