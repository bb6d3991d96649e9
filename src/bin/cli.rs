use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rediscover_weekly as lib;
use lib::api::spotify::SpotifyClient;
use lib::config::Config;
use lib::models::{SyncOutcome, SyncTarget};
use lib::sync::PlaylistSync;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::subscriber as tracing_subscriber_global;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "rediscover-weekly",
    version,
    about = "Copy Discover Weekly into this week's dated playlist, or merge it into a named one"
)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Playlist to add missing tracks to. Without it, this week's dated
    /// playlist is created or overwritten.
    #[arg(short = 'p', long, alias = "playlist_name", value_name = "NAME")]
    playlist_name: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize with Spotify and store the token (interactive)
    Auth,
    /// Validate config file and exit
    ConfigValidate,
}

/// Stdout logging plus, when `log_dir` is configured, a daily-rotated file.
/// The returned guard must live until exit so buffered lines are flushed.
fn init_logging(cfg: &Config) -> Option<WorkerGuard> {
    let _ = LogTracer::init();

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let (file_layer, guard) = match &cfg.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "rediscover-weekly.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(non_blocking)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);

    if let Err(e) = tracing_subscriber_global::set_global_default(subscriber) {
        eprintln!("failed to set global tracing subscriber: {}", e);
    }
    guard
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::ConfigValidate) = cli.command {
        match Config::load(cli.config.as_deref()) {
            Ok(_) => println!("OK"),
            Err(e) => {
                eprintln!("Config validation failed: {}", e);
                std::process::exit(2);
            }
        }
        return Ok(());
    }

    let cfg = Config::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(p) => format!("loading config from {}", p.display()),
        None => "loading config".to_string(),
    })?;
    let _guard = init_logging(&cfg);

    if let Some(Commands::Auth) = cli.command {
        lib::api::auth::run_auth(&cfg).await?;
        return Ok(());
    }

    if !cfg.has_client_credentials() {
        tracing::warn!("client_id/client_secret not configured; token refresh will fail");
    }
    let client = SpotifyClient::new(&cfg);
    let sync = PlaylistSync::from_config(Arc::new(client), &cfg);
    let target = SyncTarget::from_name(cli.playlist_name);
    let today = chrono::Local::now().date_naive();

    let report = sync
        .run(&target, today)
        .await
        .with_context(|| "running sync".to_string())?;

    let action = match report.outcome {
        SyncOutcome::Replaced { count } => format!("replaced contents with {} tracks", count),
        SyncOutcome::Added { count } => format!("added {} tracks", count),
        SyncOutcome::UpToDate => "already up to date".to_string(),
    };
    println!(
        "{}: {} ({}{})",
        report.target.name,
        action,
        report.source.name,
        if report.created { ", new playlist" } else { "" }
    );
    println!("success!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_name_accepts_short_long_and_underscore_forms() {
        for args in [
            ["rediscover-weekly", "-p", "Keepers"],
            ["rediscover-weekly", "--playlist-name", "Keepers"],
            ["rediscover-weekly", "--playlist_name", "Keepers"],
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            assert_eq!(cli.playlist_name.as_deref(), Some("Keepers"));
            assert!(cli.command.is_none());
        }
    }

    #[test]
    fn no_flag_means_weekly_target() {
        let cli = Cli::try_parse_from(["rediscover-weekly"]).unwrap();
        assert_eq!(SyncTarget::from_name(cli.playlist_name), SyncTarget::Weekly);
    }
}
