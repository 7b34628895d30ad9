use std::collections::{HashMap, VecDeque};

use crate::model::candle::{Candle, CandleBuilder};
use crate::model::tick::Tick;

/// What happened to a tick handed to [`SymbolWindowStore::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Newest tick for the symbol, appended at the back.
    Appended,
    /// Out-of-order arrival, inserted at its timestamp position.
    Reordered,
    /// Same (symbol, observed_at_ms) already present; dropped.
    Duplicate,
}

#[derive(Debug, Default)]
struct SymbolWindow {
    ticks: VecDeque<Tick>,
}

impl SymbolWindow {
    fn insert(&mut self, tick: Tick) -> UpdateOutcome {
        match self.ticks.back() {
            Some(last) if tick.observed_at_ms <= last.observed_at_ms => {
                let idx = self
                    .ticks
                    .partition_point(|t| t.observed_at_ms < tick.observed_at_ms);
                if self
                    .ticks
                    .get(idx)
                    .is_some_and(|t| t.observed_at_ms == tick.observed_at_ms)
                {
                    UpdateOutcome::Duplicate
                } else {
                    self.ticks.insert(idx, tick);
                    UpdateOutcome::Reordered
                }
            }
            _ => {
                self.ticks.push_back(tick);
                UpdateOutcome::Appended
            }
        }
    }

    /// Drop everything older than the horizon, anchored to the newest
    /// observed timestamp rather than the wall clock.
    fn evict(&mut self, horizon_ms: u64) {
        let Some(newest) = self.ticks.back().map(|t| t.observed_at_ms) else {
            return;
        };
        while let Some(front) = self.ticks.front() {
            if newest.saturating_sub(front.observed_at_ms) > horizon_ms {
                self.ticks.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Per-symbol bounded, time-ordered tick history.
///
/// Owned by the evaluation task; the ingest and read paths are serialized
/// through that task's event loop, so a reader can never observe a
/// half-applied update.
#[derive(Debug)]
pub struct SymbolWindowStore {
    horizon_ms: u64,
    windows: HashMap<String, SymbolWindow>,
}

impl SymbolWindowStore {
    pub fn new(horizon_ms: u64) -> Self {
        assert!(horizon_ms > 0, "retention horizon must be > 0");
        Self {
            horizon_ms,
            windows: HashMap::new(),
        }
    }

    pub fn horizon_ms(&self) -> u64 {
        self.horizon_ms
    }

    /// Insert a tick into its symbol window. Eviction runs before the update
    /// is considered complete, so a returned `Appended`/`Reordered` means the
    /// window is already consistent with the horizon.
    pub fn update(&mut self, tick: Tick) -> UpdateOutcome {
        let window = self.windows.entry(tick.symbol.clone()).or_default();
        let outcome = window.insert(tick);
        if outcome != UpdateOutcome::Duplicate {
            window.evict(self.horizon_ms);
        }
        outcome
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.windows.keys().map(String::as_str)
    }

    pub fn symbol_count(&self) -> usize {
        self.windows.len()
    }

    pub fn tick_count(&self, symbol: &str) -> usize {
        self.windows.get(symbol).map_or(0, |w| w.ticks.len())
    }

    /// Most recent tick for a symbol.
    pub fn latest(&self, symbol: &str) -> Option<&Tick> {
        self.windows.get(symbol).and_then(|w| w.ticks.back())
    }

    /// Most recent tick whose age relative to `now_ms` is at least
    /// `lookback_ms`. Among all qualifying ticks the one closest to the
    /// target age wins; `None` when the window does not reach that far back.
    pub fn value_at(&self, symbol: &str, now_ms: u64, lookback_ms: u64) -> Option<&Tick> {
        let window = self.windows.get(symbol)?;
        let cutoff = now_ms.checked_sub(lookback_ms)?;
        let idx = window
            .ticks
            .partition_point(|t| t.observed_at_ms <= cutoff);
        idx.checked_sub(1).and_then(|i| window.ticks.get(i))
    }

    /// Mean volume over `(now - span, now]`, excluding the newest tick so the
    /// current sample is compared against its own baseline.
    pub fn volume_mean(&self, symbol: &str, now_ms: u64, span_ms: u64) -> Option<f64> {
        let window = self.windows.get(symbol)?;
        let len = window.ticks.len();
        if len < 2 {
            return None;
        }
        let oldest = now_ms.saturating_sub(span_ms);
        let mut sum = 0.0;
        let mut count = 0usize;
        for tick in window.ticks.iter().take(len - 1) {
            if tick.observed_at_ms > oldest && tick.observed_at_ms <= now_ms {
                sum += tick.volume;
                count += 1;
            }
        }
        (count > 0).then(|| sum / count as f64)
    }

    /// Bucket the symbol's window into interval-aligned OHLC candles,
    /// oldest first. The last candle may still be forming.
    pub fn candles(&self, symbol: &str, interval_ms: u64) -> Vec<Candle> {
        let Some(window) = self.windows.get(symbol) else {
            return Vec::new();
        };
        let mut candles = Vec::new();
        let mut builder: Option<CandleBuilder> = None;
        for tick in &window.ticks {
            match builder.as_mut() {
                Some(b) if b.contains(tick.observed_at_ms) => b.update(tick.price),
                Some(b) => {
                    candles.push(b.finish());
                    builder = Some(CandleBuilder::new(
                        tick.price,
                        tick.observed_at_ms,
                        interval_ms,
                    ));
                }
                None => {
                    builder = Some(CandleBuilder::new(
                        tick.price,
                        tick.observed_at_ms,
                        interval_ms,
                    ));
                }
            }
        }
        if let Some(b) = builder {
            candles.push(b.finish());
        }
        candles
    }
}
