//! Output formats for downloaded usage

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat};

use crate::error::Result;
use crate::types::UsageSnapshot;

/// CSV header, one column per [`crate::UsageRecord`] field
pub const CSV_COLUMNS: [&str; 8] = [
    "aggregation_timestamp",
    "n_requests",
    "operation",
    "snapshot_id",
    "n_context",
    "n_context_tokens_total",
    "n_generated",
    "n_generated_tokens_total",
];

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown format '{}' (expected json or csv)", other)),
        }
    }
}

/// Render snapshots in the given format
pub fn render(format: OutputFormat, snapshots: &[UsageSnapshot]) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(snapshots),
        OutputFormat::Csv => to_csv(snapshots),
    }
}

/// Pretty-printed JSON array of snapshots
pub fn to_json(snapshots: &[UsageSnapshot]) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshots)?)
}

/// One CSV row per record across all snapshots, in snapshot then record order
pub fn to_csv(snapshots: &[UsageSnapshot]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;

    for record in snapshots.iter().flat_map(|s| s.data.iter()) {
        writer.write_record([
            iso_instant(record.aggregation_timestamp),
            record.n_requests.to_string(),
            record.operation.clone(),
            record.snapshot_id.clone(),
            record.n_context.to_string(),
            record.n_context_tokens_total.to_string(),
            record.n_generated.to_string(),
            record.n_generated_tokens_total.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Epoch seconds as `YYYY-MM-DDTHH:MM:SS.sssZ`
fn iso_instant(epoch_seconds: i64) -> String {
    DateTime::from_timestamp(epoch_seconds, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| epoch_seconds.to_string())
}
