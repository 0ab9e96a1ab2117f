//! Usage data model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One aggregation bucket of API requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Bucket start, epoch seconds
    pub aggregation_timestamp: i64,
    pub n_requests: u64,
    pub operation: String,
    pub snapshot_id: String,
    pub n_context: u64,
    pub n_context_tokens_total: u64,
    pub n_generated: u64,
    pub n_generated_tokens_total: u64,
}

/// One calendar day of usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub date: NaiveDate,
    pub data: Vec<UsageRecord>,
    pub current_usage_usd: f64,
}

/// The document served by the usage endpoint.
///
/// Only the per-request records and the running cost are kept; the fine-tune,
/// image and audio arrays are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct UsageResponse {
    #[serde(default)]
    pub data: Vec<UsageRecord>,
    #[serde(default)]
    pub current_usage_usd: f64,
}

impl UsageResponse {
    pub(crate) fn into_snapshot(self, date: NaiveDate) -> UsageSnapshot {
        UsageSnapshot {
            date,
            data: self.data,
            current_usage_usd: self.current_usage_usd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_usage_document() {
        let body = r#"{
            "object": "list",
            "data": [{
                "aggregation_timestamp": 1680307200,
                "n_requests": 3,
                "operation": "completion",
                "snapshot_id": "gpt-3.5-turbo-0301",
                "n_context": 3,
                "n_context_tokens_total": 120,
                "n_generated": 3,
                "n_generated_tokens_total": 400
            }],
            "ft_data": [],
            "dalle_api_data": [],
            "whisper_api_data": [{"model_id": "whisper-1"}],
            "current_usage_usd": 0.52
        }"#;
        let response: UsageResponse = serde_json::from_str(body).unwrap();
        let snapshot = response.into_snapshot("2023-04-01".parse().unwrap());
        assert_eq!(snapshot.data.len(), 1);
        assert_eq!(snapshot.data[0].snapshot_id, "gpt-3.5-turbo-0301");
        assert_eq!(snapshot.data[0].n_generated_tokens_total, 400);
        assert_eq!(snapshot.current_usage_usd, 0.52);
        assert_eq!(snapshot.date.to_string(), "2023-04-01");
    }

    #[test]
    fn test_empty_day() {
        let response: UsageResponse =
            serde_json::from_str(r#"{"object": "list", "data": [], "current_usage_usd": 0.0}"#)
                .unwrap();
        assert!(response.data.is_empty());
    }
}
