use crate::core::rate::{RateSource, Record};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, error};

/// Reads the PTAX series from the Banco Central do Brasil SGS API.
pub struct BcbProvider {
    url: String,
    client: reqwest::Client,
}

impl BcbProvider {
    pub fn new(url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("ptax/0.1")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl RateSource for BcbProvider {
    async fn fetch_series(&self) -> Result<Vec<Record>> {
        debug!("Requesting rate series from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.url))?
            .error_for_status()
            .context("Rate series request failed")?;

        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty response from {}", self.url));
        }

        let records: Vec<Record> = match serde_json::from_str(&response_text) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse rate series response"
                );
                return Err(e).context("Failed to parse rate series response");
            }
        };

        debug!("Fetched {} records", records.len());
        Ok(records)
    }
}
