use std::time::Duration;

use tokio::sync::{mpsc, watch};

use super::types::{OkxRestResponse, OkxTickerRow};
use super::{matches_quote_filter, ExponentialBackoff};
use crate::error::ScreenerError;
use crate::event::{AppEvent, FeedStatus};
use crate::ingest;
use crate::model::tick::Tick;

pub struct OkxRestClient {
    http: reqwest::Client,
    base_url: String,
}

impl OkxRestClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ScreenerError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the full SWAP ticker table.
    pub async fn fetch_swap_tickers(&self) -> Result<Vec<OkxTickerRow>, ScreenerError> {
        let url = format!("{}/api/v5/market/tickers?instType=SWAP", self.base_url);
        let resp: OkxRestResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if resp.code != "0" {
            return Err(ScreenerError::OkxApi {
                code: resp.code,
                msg: resp.msg,
            });
        }
        Ok(resp.data)
    }

    /// Poll tickers on a fixed interval, with exponential backoff on failure.
    /// Malformed rows are logged and dropped; the loop only exits on shutdown.
    pub async fn run_poll_loop(
        &self,
        poll_interval: Duration,
        quote_filter: &str,
        tick_tx: mpsc::Sender<Tick>,
        status_tx: mpsc::Sender<AppEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(60), 2.0);
        let mut attempt: u32 = 0;
        let mut connected = false;

        loop {
            match self.fetch_swap_tickers().await {
                Ok(rows) => {
                    if !connected {
                        connected = true;
                        attempt = 0;
                        backoff.reset();
                        let _ = status_tx
                            .send(AppEvent::FeedStatus(FeedStatus::Connected))
                            .await;
                    }
                    forward_rows(&rows, quote_filter, &tick_tx);
                    tokio::select! {
                        _ = tokio::time::sleep(poll_interval) => {}
                        _ = shutdown.changed() => return,
                    }
                }
                Err(e) => {
                    attempt += 1;
                    connected = false;
                    tracing::warn!(error = %e, attempt, "Ticker poll failed");
                    let _ = status_tx
                        .send(AppEvent::FeedStatus(FeedStatus::Disconnected))
                        .await;
                    let delay = backoff.next_delay();
                    let _ = status_tx
                        .send(AppEvent::FeedStatus(FeedStatus::Reconnecting {
                            attempt,
                            delay_ms: delay.as_millis() as u64,
                        }))
                        .await;
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = shutdown.changed() => return,
                    }
                }
            }
        }
    }
}

/// Normalize and forward one batch of raw rows.
pub(crate) fn forward_rows(rows: &[OkxTickerRow], quote_filter: &str, tick_tx: &mpsc::Sender<Tick>) {
    for row in rows {
        if let Some(inst_id) = row.inst_id.as_deref() {
            if !matches_quote_filter(inst_id, quote_filter) {
                continue;
            }
        }
        match ingest::normalize(row) {
            Ok(tick) => {
                if tick_tx.try_send(tick).is_err() {
                    tracing::warn!("Tick channel full, dropping tick");
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Dropping malformed ticker row");
            }
        }
    }
}
