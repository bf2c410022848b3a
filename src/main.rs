use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;

mod ai;
mod app;
mod config;
mod db;
mod error;
mod feed;
mod models;
mod pipeline;
mod server;

use app::App;
use config::Config;
use error::Result;

#[derive(Debug, Parser)]
#[command(name = "ad-news", version, about = "Ad-tech news collector and daily digest builder")]
struct Cli {
    /// Config file (default: <config_dir>/ad-news/config.toml)
    #[arg(long, global = true, env = "AD_NEWS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Collect, summarize one batch, refresh today's counters, sweep old rows
    FetchNews,
    /// Search keywords and store new raw items
    Collect,
    /// Summarize one batch of unprocessed raw items
    Summarize,
    /// Build the digest for a local calendar day
    Digest {
        /// YYYY-MM-DD; defaults to the day of the newest published item
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },
    /// Delete items past the retention window
    Cleanup,
    /// Run the HTTP service
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let app = App::new(config).await?;

    match cli.command {
        Command::FetchNews => print_report(&app.fetch_news().await?)?,
        Command::Collect => print_report(&app.collect().await?)?,
        Command::Summarize => print_report(&app.summarize().await?)?,
        Command::Digest { date } => print_report(&app.build_digest(date).await?)?,
        Command::Cleanup => print_report(&app.cleanup().await?)?,
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| app.config.bind_addr.clone());
            server::serve(app, &bind).await?;
        }
    }

    Ok(())
}

fn parse_date_arg(value: &str) -> std::result::Result<NaiveDate, String> {
    pipeline::digest::parse_digest_date(value).map_err(|e| e.to_string())
}

fn print_report<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_digest_date() {
        let cli = Cli::try_parse_from(["ad-news", "digest", "--date", "2026-03-02"]).unwrap();
        match cli.command {
            Command::Digest { date } => assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 2)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        assert!(Cli::try_parse_from(["ad-news", "digest", "--date", "March 2"]).is_err());
        assert!(Cli::try_parse_from(["ad-news", "digest", "--date", "10000-01-01"]).is_err());
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli =
            Cli::try_parse_from(["ad-news", "serve", "--config", "/tmp/ad.toml", "--bind", "0.0.0.0:9000"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/ad.toml")));
        assert!(matches!(cli.command, Command::Serve { bind: Some(_) }));
    }
}
