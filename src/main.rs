use anyhow::{Context, Result};
use clap::Parser;
use relcheck::{CheckerConfig, ReleaseChecker, ReleaseInfo, RepoId};
use serde::Serialize;

/// relcheck - check GitHub for a newer release
///
/// Compares CURRENT_VERSION against the tag of the latest published release.
///
/// Set RELCHECK_DISABLED to skip the network request entirely.
///
/// Examples:
///   relcheck owner/repo v1.2.0          # Report whether v1.2.0 is the latest release
///   relcheck owner/repo v1.2.0 --json   # Same, as a JSON report
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// The GitHub repository in the format "owner/repo"
    #[arg(value_name = "OWNER/REPO")]
    repo: String,

    /// The version currently in use, compared verbatim against the release tag
    #[arg(value_name = "CURRENT_VERSION")]
    current_version: String,

    /// GitHub API URL (defaults to https://api.github.com; also via RELCHECK_API_URL)
    #[arg(long = "api-url", value_name = "URL")]
    api_url: Option<String>,

    /// Do not contact GitHub
    #[arg(long)]
    disabled: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug)]
struct Report<'a> {
    repository: String,
    current_version: &'a str,
    update_available: bool,
    latest: Option<&'a ReleaseInfo>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let repo: RepoId = cli.repo.parse()?;
    let mut config = CheckerConfig::from_env(&repo.owner, &repo.repo, &cli.current_version);
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }
    if cli.disabled {
        config = config.disabled(true);
    }

    let checker = ReleaseChecker::from_config(config)?;
    let latest = checker
        .check()
        .await
        .with_context(|| format!("Failed to check {} for a new release", repo))?;
    let update_available = checker.is_update_available().await?;

    if cli.json {
        let report = Report {
            repository: repo.to_string(),
            current_version: checker.current_version(),
            update_available,
            latest: latest.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match latest {
        None => println!("No release information available for {}", repo),
        Some(release) if update_available => {
            println!(
                "Update available for {}: {} -> {} ({})",
                repo,
                checker.current_version(),
                release.version(),
                release.name()
            );
            println!("Download: {}", release.download_page());
        }
        Some(release) => println!("{} is up to date ({})", repo, release.version()),
    }

    Ok(())
}
