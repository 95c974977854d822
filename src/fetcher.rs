//! One poll cycle: fetch the series, pick today's quote, publish it and
//! fire the restart action.

use crate::core::action::RestartAction;
use crate::core::rate::{RateSource, RateValue, select_value};
use anyhow::{Result, bail};
use chrono::format::{Item, StrftimeItems};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const NOT_FOUND_MESSAGE: &str = "Cotação não encontrada para a data atual.";

type TodayFn = dyn Fn() -> String + Send + Sync;

#[derive(Debug)]
pub enum CycleOutcome {
    Selected(RateValue),
    NotFound,
    FetchFailed(anyhow::Error),
}

impl CycleOutcome {
    /// The line printed to stdout for this cycle, if any.
    pub fn json_line(&self) -> Option<String> {
        match self {
            CycleOutcome::Selected(value) => Some(json!({ "Valor": value }).to_string()),
            CycleOutcome::NotFound => Some(json!({ "error": NOT_FOUND_MESSAGE }).to_string()),
            CycleOutcome::FetchFailed(_) => None,
        }
    }
}

pub struct RateFetcher {
    source: Arc<dyn RateSource>,
    action: Arc<dyn RestartAction>,
    today: Arc<TodayFn>,
}

impl RateFetcher {
    /// Today's date is rendered from the local clock with `date_format`.
    pub fn new(
        source: Arc<dyn RateSource>,
        action: Arc<dyn RestartAction>,
        date_format: &str,
    ) -> Result<Self> {
        if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
            bail!("Invalid date format: {date_format}");
        }

        let date_format = date_format.to_string();
        Ok(Self::with_today(source, action, move || {
            chrono::Local::now().format(&date_format).to_string()
        }))
    }

    pub fn with_today<F>(
        source: Arc<dyn RateSource>,
        action: Arc<dyn RestartAction>,
        today: F,
    ) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            source,
            action,
            today: Arc::new(today),
        }
    }

    pub async fn fetch_and_select(&self) -> CycleOutcome {
        let records = match self.source.fetch_series().await {
            Ok(records) => records,
            Err(e) => return CycleOutcome::FetchFailed(e),
        };

        let today = (self.today)();
        if !records.iter().any(|r| r.date == today) {
            debug!(%today, "No record for today, falling back to an earlier date");
        }

        match select_value(&records, &today) {
            Some(value) => CycleOutcome::Selected(value),
            None => CycleOutcome::NotFound,
        }
    }

    /// Runs a full cycle, printing to stdout. Failures are logged here and
    /// never escape.
    pub async fn run_cycle(&self) -> CycleOutcome {
        self.run_cycle_to(&mut std::io::stdout()).await
    }

    pub async fn run_cycle_to<W: Write + Send>(&self, out: &mut W) -> CycleOutcome {
        let outcome = self.fetch_and_select().await;

        if let Some(line) = outcome.json_line()
            && let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush())
        {
            error!(error = %e, "Failed to write quote to stdout");
        }

        match &outcome {
            CycleOutcome::Selected(value) => {
                debug!(%value, "Quote selected");
                self.action.restart().await;
            }
            CycleOutcome::NotFound => warn!("Rate series had no usable record"),
            CycleOutcome::FetchFailed(e) => error!(error = ?e, "Failed to fetch the rate series"),
        }

        outcome
    }
}
