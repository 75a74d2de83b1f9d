//! Report service - aggregate figures for a date range
//!
//! Layers a caller-level retry policy on top of the gateway: network and
//! 5xx faults are retried up to twice with exponential backoff. This is
//! deliberately not a gateway guarantee - other callers see those faults
//! immediately.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::domain::result::{Error, Result};
use crate::domain::Report;
use crate::gateway::{ApiGateway, ApiRequest};
use crate::ports::Notifier;

/// Retries after the initial attempt
const MAX_RETRIES: u32 = 2;

pub struct ReportService {
    gateway: Arc<ApiGateway>,
    notifier: Arc<dyn Notifier>,
    /// Base backoff delay; doubled per retry. Shrunk in tests.
    retry_delay: Duration,
}

impl ReportService {
    pub fn new(gateway: Arc<ApiGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Override the backoff base delay (tests)
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Fetch the aggregate report for `[start, end]`. The range is
    /// validated before any request goes out.
    pub fn get_report(&self, start: NaiveDate, end: NaiveDate) -> Result<Report> {
        if end < start {
            return Err(Error::config("End date cannot be before start date"));
        }

        let mut attempt = 0u32;
        loop {
            let request = ApiRequest::get("/reports")
                .with_query("startDate", start.format("%Y-%m-%d").to_string())
                .with_query("endDate", end.format("%Y-%m-%d").to_string());

            match self.gateway.send(request) {
                Ok(response) => return response.envelope(),
                Err(e) if (e.is_network() || e.is_server()) && attempt < MAX_RETRIES => {
                    attempt += 1;
                    self.notifier.info(&format!(
                        "Connection issue detected. Retrying... ({}/{})",
                        attempt, MAX_RETRIES
                    ));
                    std::thread::sleep(self.retry_delay * 2u32.pow(attempt - 1));
                }
                Err(e) => return Err(e),
            }
        }
    }
}
