//! Usage endpoint client

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::types::{UsageResponse, UsageSnapshot};

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Something that can produce one day's usage snapshot
#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Fetch the snapshot for `date` with a single request
    async fn fetch_day(&self, date: NaiveDate) -> Result<UsageSnapshot>;
}

/// Authorization and organization for the usage endpoint
#[derive(Clone)]
pub struct Credentials {
    pub authorization: String,
    pub organization: String,
}

impl Credentials {
    pub fn new(authorization: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            authorization: authorization.into(),
            organization: organization.into(),
        }
    }

    /// Authorization header value; a bare key gets the `Bearer ` prefix
    pub fn bearer(&self) -> String {
        let auth = self.authorization.trim();
        if auth.starts_with("Bearer ") {
            auth.to_string()
        } else {
            format!("Bearer {}", auth)
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("authorization", &"<redacted>")
            .field("organization", &self.organization)
            .finish()
    }
}

/// reqwest client for `GET /v1/usage?date=YYYY-MM-DD`
pub struct UsageClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl UsageClient {
    /// Create a client against the public API host
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// Create a client against another host (proxies, tests)
    pub fn with_base_url(credentials: Credentials, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn url(&self) -> String {
        format!("{}/v1/usage", self.base_url)
    }
}

#[async_trait]
impl UsageSource for UsageClient {
    async fn fetch_day(&self, date: NaiveDate) -> Result<UsageSnapshot> {
        let day = date.format("%Y-%m-%d").to_string();
        tracing::debug!("GET {}?date={}", self.url(), day);

        let response = self
            .client
            .get(self.url())
            .query(&[("date", day.as_str())])
            .header("accept", "*/*")
            .header("Authorization", self.credentials.bearer())
            .header("OpenAI-Organization", &self.credentials.organization)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body = response.text().await?;
        let usage: UsageResponse =
            serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))?;

        Ok(usage.into_snapshot(date))
    }
}
