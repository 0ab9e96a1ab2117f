//! `assist usage` - download per-day usage and write it as JSON or CSV

use std::path::PathBuf;

use anyhow::{Context, bail};
use assist_usage::{Credentials, Error, OutputFormat, UsageClient, download_range, render};
use chrono::NaiveDate;

use crate::config::{self, Config};
use crate::utils::parse_date;

/// Options for `assist usage`
#[derive(clap::Args, Debug)]
pub struct UsageArgs {
    /// First day to download (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    pub start: NaiveDate,

    /// Day after the last one to download (YYYY-MM-DD, default: today)
    #[arg(short, long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// API key or full `Bearer ...` authorization value
    #[arg(short, long)]
    pub authorization: Option<String>,

    /// Organization id
    #[arg(short = 'g', long)]
    pub organization: Option<String>,

    /// Output format (json, csv)
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// API host
    #[arg(long)]
    pub base_url: Option<String>,
}

/// Resolve credentials from flags, config, then `env`
fn credentials(
    args: &UsageArgs,
    cfg: &Config,
    env: impl Fn(&str) -> Option<String> + Copy,
) -> anyhow::Result<Credentials> {
    let Some(authorization) = cfg.authorization(args.authorization.clone(), env) else {
        bail!(
            "No authorization found. Pass --authorization, set OPENAI_API_KEY, \
             or add it to the [usage] config section"
        );
    };
    let Some(organization) = cfg.organization(args.organization.clone(), env) else {
        bail!(
            "No organization found. Pass --organization, set OPENAI_ORGANIZATION, \
             or add it to the [usage] config section"
        );
    };
    Ok(Credentials::new(authorization, organization))
}

/// Only an exhausted day points at the credentials
fn download_error(e: Error) -> anyhow::Error {
    match e {
        Error::ExhaustedRetries { .. } => anyhow::Error::new(e)
            .context("download failed, please check your authorization and organization id"),
        other => anyhow::Error::new(other),
    }
}

pub async fn run_usage(args: UsageArgs, cfg: &Config) -> anyhow::Result<()> {
    let credentials = credentials(&args, cfg, config::env_var)?;
    let client = match args.base_url.or(cfg.usage.base_url.clone()) {
        Some(url) => UsageClient::with_base_url(credentials, &url),
        None => UsageClient::new(credentials),
    };

    let end = args.end.unwrap_or_else(|| chrono::Utc::now().date_naive());

    let snapshots = download_range(&client, args.start, end, |date| {
        eprintln!("Downloading {}...", date);
    })
    .await
    .map_err(download_error)?;

    let text = render(args.format, &snapshots)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Saved {} days of usage to {}",
                snapshots.len(),
                path.display()
            );
        }
        None => println!("{}", text),
    }

    Ok(())
}
