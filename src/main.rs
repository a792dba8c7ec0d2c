mod config;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use arti_fetch::Downloader;
use arti_fetch::maven::RemoteMavenRepo;
use arti_fetch::util::http_transport::HyperTransport;

use crate::config::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // logs go to stderr, stdout is reserved for the command's result
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter())))
        .with_writer(std::io::stderr)
        .init();

    let transport = HyperTransport::new()
        .with_timeout(cli.timeout());
    let repo = RemoteMavenRepo::new(cli.repository.clone(), transport)?
        .with_credentials(cli.credentials())
        .with_snapshot_resolution(cli.snapshot_resolution());
    let downloader = Downloader::new(repo)
        .with_suffix_policy(cli.suffix_policy());

    match &cli.command {
        Command::Fetch { coordinate, dest, filename, extension } => {
            let path = downloader.download(coordinate, dest, filename.as_deref(), extension.as_deref())
                .await
                .with_context(|| format!("failed to download {}", coordinate))?;
            println!("{}", path.display());
        }
        Command::Metadata { coordinate } => {
            let metadata = downloader.download_metadata(coordinate)
                .await
                .with_context(|| format!("failed to fetch metadata for {}", coordinate))?;
            println!("latest={}", metadata.latest_version.as_deref().unwrap_or(""));
            println!("release={}", metadata.release_version.as_deref().unwrap_or(""));
            if !metadata.versions.is_empty() {
                println!("versions={}", metadata.versions.join(","));
            }
        }
        Command::Url { coordinate, extension } => {
            let resolved = downloader.resolve_url(coordinate, extension.as_deref())
                .await
                .with_context(|| format!("failed to resolve {}", coordinate))?;
            println!("{}", resolved.url);
        }
    }

    Ok(())
}
