use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite;

use super::rest::forward_rows;
use super::types::OkxWsFrame;
use super::ExponentialBackoff;
use crate::error::ScreenerError;
use crate::event::{AppEvent, FeedStatus};
use crate::model::tick::Tick;

/// OKX closes idle connections after 30s without traffic.
const PING_INTERVAL: Duration = Duration::from_secs(25);

pub struct OkxWsClient {
    url: String,
    instruments: Vec<String>,
    quote_filter: String,
}

impl OkxWsClient {
    pub fn new(ws_url: &str, instruments: Vec<String>, quote_filter: &str) -> Self {
        Self {
            url: ws_url.to_string(),
            instruments,
            quote_filter: quote_filter.to_string(),
        }
    }

    /// Connect and run the WebSocket loop with automatic reconnection.
    /// Sends status events through `status_tx` and ticks through `tick_tx`.
    pub async fn connect_and_run(
        &self,
        tick_tx: mpsc::Sender<Tick>,
        status_tx: mpsc::Sender<AppEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(60), 2.0);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.connect_once(&tick_tx, &status_tx, &mut shutdown).await {
                Ok(()) => {
                    // Clean shutdown requested
                    let _ = status_tx
                        .send(AppEvent::FeedStatus(FeedStatus::Disconnected))
                        .await;
                    break;
                }
                Err(e) => {
                    let _ = status_tx
                        .send(AppEvent::FeedStatus(FeedStatus::Disconnected))
                        .await;
                    let _ = status_tx
                        .send(AppEvent::LogMessage(format!("WS error: {}", e)))
                        .await;

                    let delay = backoff.next_delay();
                    let _ = status_tx
                        .send(AppEvent::FeedStatus(FeedStatus::Reconnecting {
                            attempt,
                            delay_ms: delay.as_millis() as u64,
                        }))
                        .await;

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => continue,
                        _ = shutdown.changed() => {
                            let _ = status_tx
                                .send(AppEvent::LogMessage("Shutdown during reconnect".to_string()))
                                .await;
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn subscribe_message(&self) -> String {
        let args: Vec<_> = self
            .instruments
            .iter()
            .map(|inst| json!({"channel": "tickers", "instId": inst}))
            .collect();
        json!({"op": "subscribe", "args": args}).to_string()
    }

    async fn connect_once(
        &self,
        tick_tx: &mpsc::Sender<Tick>,
        status_tx: &mpsc::Sender<AppEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<()> {
        let _ = status_tx
            .send(AppEvent::LogMessage(format!("Connecting to {}", self.url)))
            .await;

        let (ws_stream, _resp) = tokio_tungstenite::connect_async(&self.url)
            .await
            .context("WebSocket connect failed")?;

        let (mut write, mut read) = ws_stream.split();
        write
            .send(tungstenite::Message::Text(self.subscribe_message().into()))
            .await
            .context("tickers subscribe failed")?;

        let _ = status_tx
            .send(AppEvent::FeedStatus(FeedStatus::Connected))
            .await;
        let _ = status_tx
            .send(AppEvent::LogMessage("WebSocket connected".to_string()))
            .await;

        let mut ping_timer = tokio::time::interval(PING_INTERVAL);
        ping_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(tungstenite::Message::Text(text))) => {
                            // Application-level keepalive reply, not JSON.
                            if text == "pong" {
                                continue;
                            }
                            match serde_json::from_str::<OkxWsFrame>(&text) {
                                Ok(frame) => {
                                    if frame.event.as_deref() == Some("error") {
                                        return Err(ScreenerError::OkxApi {
                                            code: frame.code.unwrap_or_default(),
                                            msg: frame.msg.unwrap_or_default(),
                                        }
                                        .into());
                                    }
                                    forward_rows(&frame.data, &self.quote_filter, tick_tx);
                                }
                                Err(e) => {
                                    tracing::debug!(error = %e, "Failed to parse WS frame");
                                }
                            }
                        }
                        Some(Ok(tungstenite::Message::Ping(_))) => {
                            // tokio-tungstenite answers pongs automatically
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            return Err(ScreenerError::WebSocket(e.to_string()).into());
                        }
                        None => {
                            return Err(
                                ScreenerError::WebSocket("stream ended".to_string()).into()
                            );
                        }
                    }
                }
                _ = ping_timer.tick() => {
                    write
                        .send(tungstenite::Message::Text("ping".into()))
                        .await
                        .context("keepalive ping failed")?;
                }
                _ = shutdown.changed() => {
                    return Ok(());
                }
            }
        }
    }
}
