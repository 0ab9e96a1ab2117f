//! assist-usage: Per-day usage downloader
//!
//! Walks a date range one day at a time, fetching each day's usage snapshot
//! with a fixed retry budget, and renders the collected snapshots as JSON or CSV.

pub mod client;
pub mod download;
pub mod error;
pub mod format;
pub mod retry;
pub mod types;

pub use client::{Credentials, UsageClient, UsageSource};
pub use download::{DAY_RETRIES, download_range};
pub use error::{Error, Result};
pub use format::{OutputFormat, render, to_csv, to_json};
pub use retry::{Exhausted, Retry, retry};
pub use types::{UsageRecord, UsageSnapshot};
