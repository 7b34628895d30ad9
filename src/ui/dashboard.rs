use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::model::candle::Engulfing;
use crate::model::snapshot::{IndicatorSnapshot, SignalKind, VolumeTrend};

use super::AppState;

pub struct StatusBar<'a> {
    state: &'a AppState,
    now_wall_ms: u64,
}

impl<'a> StatusBar<'a> {
    pub fn new(state: &'a AppState, now_wall_ms: u64) -> Self {
        Self { state, now_wall_ms }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let feed = if self.state.feed_connected {
            Span::styled("FEED UP", Style::default().fg(Color::Green))
        } else if let Some((attempt, delay_ms)) = self.state.reconnecting {
            Span::styled(
                format!("RECONNECT #{} in {}ms", attempt, delay_ms),
                Style::default().fg(Color::Yellow),
            )
        } else {
            Span::styled("FEED DOWN", Style::default().fg(Color::Red))
        };

        let age_ms = self.state.snapshot_age_ms(self.now_wall_ms);
        let age = if self.state.last_snapshot_wall_ms == 0 {
            Span::styled("no data yet", Style::default().fg(Color::DarkGray))
        } else if self.state.is_stale(self.now_wall_ms) {
            Span::styled(
                format!("STALE, updated {}s ago", age_ms / 1000),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw(format!("updated {}s ago", age_ms / 1000))
        };

        let paused = if self.state.paused {
            Span::styled(" | PAUSED", Style::default().fg(Color::Yellow))
        } else {
            Span::raw("")
        };

        let line = Line::from(vec![
            feed,
            Span::raw(" | "),
            Span::raw(format!("{} symbols", self.state.snapshot.rows.len())),
            Span::raw(" | sort: "),
            Span::styled(
                self.state.sort_key.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            age,
            paused,
        ]);

        Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL).title(" screener "))
            .render(area, buf);
    }
}

pub struct ScreenerTable<'a> {
    state: &'a AppState,
}

impl<'a> ScreenerTable<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }
}

fn fmt_price(v: f64) -> String {
    if v >= 100.0 {
        format!("{:.2}", v)
    } else {
        format!("{:.5}", v)
    }
}

fn fmt_volume(v: f64) -> String {
    if v >= 1_000_000.0 {
        format!("{:.2}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("{:.1}K", v / 1_000.0)
    } else {
        format!("{:.1}", v)
    }
}

fn fmt_opt(v: Option<f64>, precision: usize) -> String {
    v.map_or_else(|| "---".to_string(), |x| format!("{:.*}", precision, x))
}

fn pct_cell(v: Option<f64>) -> Cell<'static> {
    match v {
        None => Cell::from("---").style(Style::default().fg(Color::DarkGray)),
        Some(x) if x > 0.0 => {
            Cell::from(format!("+{:.2}%", x)).style(Style::default().fg(Color::Green))
        }
        Some(x) if x < 0.0 => {
            Cell::from(format!("{:.2}%", x)).style(Style::default().fg(Color::Red))
        }
        Some(x) => Cell::from(format!("{:.2}%", x)),
    }
}

fn trend_cell(trend: VolumeTrend) -> Cell<'static> {
    let style = match trend {
        VolumeTrend::Rising => Style::default().fg(Color::Green),
        VolumeTrend::Falling => Style::default().fg(Color::Red),
        VolumeTrend::Flat => Style::default().fg(Color::Gray),
        VolumeTrend::New => Style::default().fg(Color::Cyan),
    };
    Cell::from(trend.as_str()).style(style)
}

fn engulfing_cell(e: Option<Engulfing>) -> Cell<'static> {
    match e {
        Some(Engulfing::Bullish) => Cell::from("bull").style(Style::default().fg(Color::Green)),
        Some(Engulfing::Bearish) => Cell::from("bear").style(Style::default().fg(Color::Red)),
        None => Cell::from("-").style(Style::default().fg(Color::DarkGray)),
    }
}

fn signal_cell(signal: SignalKind) -> Cell<'static> {
    let style = match signal {
        SignalKind::Buy => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        SignalKind::Sell => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        SignalKind::Neutral => Style::default(),
        SignalKind::Wait => Style::default().fg(Color::DarkGray),
    };
    Cell::from(signal.as_str()).style(style)
}

fn row_cells(row: &IndicatorSnapshot) -> Row<'static> {
    Row::new(vec![
        Cell::from(row.symbol.clone()),
        Cell::from(fmt_price(row.price)),
        pct_cell(row.price_change_pct),
        Cell::from(fmt_opt(row.rsi, 1)),
        Cell::from(fmt_opt(row.ema, 2)),
        Cell::from(fmt_volume(row.volume)),
        pct_cell(row.volume_change_pct),
        Cell::from(if row.volume_spike {
            format!("{:.2}x", row.volume_spike_ratio.unwrap_or(0.0))
        } else {
            "-".to_string()
        })
        .style(if row.volume_spike {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default().fg(Color::DarkGray)
        }),
        trend_cell(row.volume_trend),
        engulfing_cell(row.engulfing),
        signal_cell(row.signal),
    ])
}

impl Widget for ScreenerTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.height.saturating_sub(3) as usize;
        let rows: Vec<Row> = self
            .state
            .snapshot
            .rows
            .iter()
            .skip(self.state.scroll)
            .take(visible)
            .map(row_cells)
            .collect();

        let header = Row::new(vec![
            "Symbol", "Price", "dPrice", "RSI", "EMA", "Volume", "dVol", "Spike", "Trend",
            "Engulf", "Signal",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let widths = [
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(8),
        ];

        Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                " markets [{}..{}] ",
                self.state.scroll,
                (self.state.scroll + visible).min(self.state.snapshot.rows.len())
            )))
            .render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(visible);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|m| Line::from(m.as_str()))
            .collect();
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" log "))
            .render(area, buf);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::from(Span::styled(
            " q quit | p pause | r resume | s sort | j/k scroll ",
            Style::default().fg(Color::DarkGray),
        )))
        .render(area, buf);
    }
}
