pub mod dashboard;

use std::sync::Arc;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::event::{AppEvent, FeedStatus};
use crate::model::snapshot::{ScreenerSnapshot, SortKey};

use dashboard::{KeybindBar, LogPanel, ScreenerTable, StatusBar};

const MAX_LOG_MESSAGES: usize = 200;

pub struct AppState {
    pub snapshot: Arc<ScreenerSnapshot>,
    pub feed_connected: bool,
    pub reconnecting: Option<(u32, u64)>,
    pub paused: bool,
    pub sort_key: SortKey,
    pub scroll: usize,
    pub log_messages: Vec<String>,
    /// Wall-clock ms when the current snapshot arrived.
    pub last_snapshot_wall_ms: u64,
    pub stale_after_ms: u64,
}

impl AppState {
    pub fn new(sort_key: SortKey, stale_after_ms: u64) -> Self {
        Self {
            snapshot: Arc::new(ScreenerSnapshot::default()),
            feed_connected: false,
            reconnecting: None,
            paused: false,
            sort_key,
            scroll: 0,
            log_messages: Vec::new(),
            last_snapshot_wall_ms: 0,
            stale_after_ms,
        }
    }

    pub fn apply(&mut self, event: AppEvent, now_wall_ms: u64) {
        match event {
            AppEvent::Snapshot(snapshot) => {
                if !self.paused {
                    self.snapshot = snapshot;
                    self.last_snapshot_wall_ms = now_wall_ms;
                }
            }
            AppEvent::FeedStatus(status) => match status {
                FeedStatus::Connected => {
                    self.feed_connected = true;
                    self.reconnecting = None;
                }
                FeedStatus::Disconnected => {
                    self.feed_connected = false;
                }
                FeedStatus::Reconnecting { attempt, delay_ms } => {
                    self.feed_connected = false;
                    self.reconnecting = Some((attempt, delay_ms));
                }
            },
            AppEvent::LogMessage(msg) => self.push_log(msg),
            AppEvent::Error(msg) => self.push_log(format!("[ERROR] {}", msg)),
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            let excess = self.log_messages.len() - MAX_LOG_MESSAGES;
            self.log_messages.drain(..excess);
        }
    }

    /// Age of the displayed snapshot in milliseconds.
    pub fn snapshot_age_ms(&self, now_wall_ms: u64) -> u64 {
        now_wall_ms.saturating_sub(self.last_snapshot_wall_ms)
    }

    pub fn is_stale(&self, now_wall_ms: u64) -> bool {
        self.last_snapshot_wall_ms == 0 || self.snapshot_age_ms(now_wall_ms) > self.stale_after_ms
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max = self.snapshot.rows.len().saturating_sub(1);
        self.scroll = (self.scroll + lines).min(max);
    }
}

pub fn render(frame: &mut Frame, state: &AppState, now_wall_ms: u64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(StatusBar::new(state, now_wall_ms), chunks[0]);
    frame.render_widget(ScreenerTable::new(state), chunks[1]);
    frame.render_widget(LogPanel::new(&state.log_messages), chunks[2]);
    frame.render_widget(KeybindBar, chunks[3]);
}
