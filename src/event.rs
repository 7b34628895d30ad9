use std::sync::Arc;

use crate::model::snapshot::ScreenerSnapshot;

#[derive(Debug, Clone)]
pub enum FeedStatus {
    Connected,
    Disconnected,
    Reconnecting { attempt: u32, delay_ms: u64 },
}

/// Events flowing from the background tasks into the TUI loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Snapshot(Arc<ScreenerSnapshot>),
    FeedStatus(FeedStatus),
    LogMessage(String),
    Error(String),
}
