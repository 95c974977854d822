//! Exchange-rate series abstractions and the per-cycle selection policy

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A quote as published by the upstream series. Numbers are kept as JSON
/// numbers and strings as strings so they print back unchanged.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RateValue {
    Number(serde_json::Number),
    Text(String),
}

impl Display for RateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateValue::Number(n) => write!(f, "{n}"),
            RateValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for RateValue {
    fn from(s: &str) -> Self {
        RateValue::Text(s.to_string())
    }
}

/// One (date, value) pair of the remote time series.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Record {
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "valor")]
    pub value: RateValue,
}

impl Record {
    pub fn new(date: &str, value: impl Into<RateValue>) -> Self {
        Self {
            date: date.to_string(),
            value: value.into(),
        }
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_series(&self) -> Result<Vec<Record>>;
}

/// Picks the value to publish for `today`.
///
/// The first record dated `today` is taken, and is then replaced by the
/// last record whose date is anything other than `today`, if one exists.
/// So an exact match only survives when every record is dated `today`.
pub fn select_value(records: &[Record], today: &str) -> Option<RateValue> {
    let mut selected = records
        .iter()
        .find(|r| r.date == today)
        .map(|r| r.value.clone());

    if let Some(fallback) = records.iter().rev().find(|r| r.date != today) {
        selected = Some(fallback.value.clone());
    }

    selected
}
