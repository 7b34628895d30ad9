use std::collections::BTreeMap;

use serde::Deserialize;

use super::candle::Engulfing;

/// Discrete per-symbol trading signal.
///
/// `Wait` means the symbol does not yet have enough history for the required
/// lookbacks; `Neutral` means history exists but no threshold was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Buy,
    Sell,
    Neutral,
    Wait,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Neutral => "NEUTRAL",
            Self::Wait => "WAIT",
        }
    }

    /// Rank used by the signal-then-volume compound sort (BUY first).
    pub fn sort_rank(&self) -> u8 {
        match self {
            Self::Buy => 0,
            Self::Sell => 1,
            Self::Neutral => 2,
            Self::Wait => 3,
        }
    }
}

/// Volume direction versus the previous evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTrend {
    Rising,
    Falling,
    Flat,
    New,
}

impl VolumeTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rising => "up",
            Self::Falling => "down",
            Self::Flat => "flat",
            Self::New => "new",
        }
    }
}

/// Per-symbol derived state for one evaluation cycle.
///
/// Maps are keyed by lookback milliseconds; a missing key means the window
/// does not yet cover that lookback. Absences always propagate as `None`,
/// never as a silent zero.
#[derive(Debug, Clone)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    pub price_ago: BTreeMap<u64, f64>,
    pub volume_ago: BTreeMap<u64, f64>,
    pub price_change_pct: Option<f64>,
    pub volume_change_pct: Option<f64>,
    pub rsi: Option<f64>,
    pub ema: Option<f64>,
    pub volume_spike_ratio: Option<f64>,
    pub volume_spike: bool,
    pub volume_trend: VolumeTrend,
    pub engulfing: Option<Engulfing>,
    pub signal: SignalKind,
    pub observed_at_ms: u64,
}

/// Immutable point-in-time view of every tracked symbol, replaced atomically
/// each refresh cycle.
#[derive(Debug, Clone, Default)]
pub struct ScreenerSnapshot {
    pub generated_at_ms: u64,
    pub rows: Vec<IndicatorSnapshot>,
}

/// Sort key for the published snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Price,
    Volume,
    /// Signal rank first (BUY, SELL, NEUTRAL, WAIT), volume desc within.
    SignalVolume,
}

impl SortKey {
    pub fn next(&self) -> Self {
        match self {
            Self::Price => Self::Volume,
            Self::Volume => Self::SignalVolume,
            Self::SignalVolume => Self::Price,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Volume => "volume",
            Self::SignalVolume => "signal+volume",
        }
    }
}
