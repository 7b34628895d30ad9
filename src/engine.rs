use std::collections::{BTreeMap, HashMap};

use crate::indicator::ema::Ema;
use crate::indicator::rsi::single_sample_rsi;
use crate::model::candle::detect_engulfing;
use crate::model::snapshot::{IndicatorSnapshot, SignalKind, VolumeTrend};
use crate::model::tick::Tick;
use crate::window::{SymbolWindowStore, UpdateOutcome};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lookbacks to resolve each cycle, ascending, in milliseconds.
    pub lookbacks_ms: Vec<u64>,
    /// The lookback pair driving percent change, RSI, and the classifier.
    pub signal_lookback_ms: u64,
    pub ema_span: usize,
    pub volume_ma_span_ms: u64,
    pub spike_threshold: f64,
    pub candle_interval_ms: u64,
}

/// Computes per-symbol derived metrics from the window store.
///
/// All computations are pure functions of the current tick and the window;
/// absent history propagates as `None`, never as a silent zero.
pub struct IndicatorEngine {
    cfg: EngineConfig,
    store: SymbolWindowStore,
    ema_by_symbol: HashMap<String, Ema>,
    prev_cycle_volume: HashMap<String, f64>,
}

impl IndicatorEngine {
    pub fn new(cfg: EngineConfig, horizon_ms: u64) -> Self {
        Self {
            cfg,
            store: SymbolWindowStore::new(horizon_ms),
            ema_by_symbol: HashMap::new(),
            prev_cycle_volume: HashMap::new(),
        }
    }

    pub fn store(&self) -> &SymbolWindowStore {
        &self.store
    }

    /// Absorb one tick into the window. The EMA advances only for ticks the
    /// window accepted as its new head, so duplicates and late arrivals never
    /// double-count.
    pub fn absorb(&mut self, tick: Tick) -> UpdateOutcome {
        let symbol = tick.symbol.clone();
        let price = tick.price;
        let outcome = self.store.update(tick);
        if outcome == UpdateOutcome::Appended {
            self.ema_by_symbol
                .entry(symbol)
                .or_insert_with(|| Ema::new(self.cfg.ema_span))
                .push(price);
        }
        outcome
    }

    /// Compute one [`IndicatorSnapshot`] per tracked symbol at `now_ms`.
    /// Signals are left at `Wait`; classification is the caller's next step.
    pub fn evaluate(&mut self, now_ms: u64) -> Vec<IndicatorSnapshot> {
        let symbols: Vec<String> = self.store.symbols().map(str::to_string).collect();
        let mut rows = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if let Some(row) = self.evaluate_symbol(&symbol, now_ms) {
                rows.push(row);
            }
        }
        rows
    }

    fn evaluate_symbol(&mut self, symbol: &str, now_ms: u64) -> Option<IndicatorSnapshot> {
        let latest = self.store.latest(symbol)?.clone();

        let mut price_ago = BTreeMap::new();
        let mut volume_ago = BTreeMap::new();
        for &lookback in &self.cfg.lookbacks_ms {
            if let Some(past) = self.store.value_at(symbol, now_ms, lookback) {
                price_ago.insert(lookback, past.price);
                volume_ago.insert(lookback, past.volume);
            }
        }

        let signal_lb = self.cfg.signal_lookback_ms;
        let price_change_pct = price_ago
            .get(&signal_lb)
            .and_then(|&past| percent_change(latest.price, past));
        let volume_change_pct = volume_ago
            .get(&signal_lb)
            .and_then(|&past| percent_change(latest.volume, past));
        let rsi = price_ago
            .get(&signal_lb)
            .map(|&past| single_sample_rsi(latest.price, past));

        let volume_spike_ratio = self
            .store
            .volume_mean(symbol, now_ms, self.cfg.volume_ma_span_ms)
            .filter(|mean| *mean > 0.0)
            .map(|mean| latest.volume / mean);
        let volume_spike = volume_spike_ratio
            .is_some_and(|ratio| ratio > self.cfg.spike_threshold);

        let volume_trend = match self.prev_cycle_volume.get(symbol) {
            None => VolumeTrend::New,
            Some(prev) if latest.volume > *prev => VolumeTrend::Rising,
            Some(prev) if latest.volume < *prev => VolumeTrend::Falling,
            Some(_) => VolumeTrend::Flat,
        };
        self.prev_cycle_volume
            .insert(symbol.to_string(), latest.volume);

        let candles = self.store.candles(symbol, self.cfg.candle_interval_ms);
        // The final candle may still be forming; compare the last two closed.
        let engulfing = match candles.len() {
            n if n >= 3 => detect_engulfing(&candles[n - 3], &candles[n - 2]),
            _ => None,
        };

        Some(IndicatorSnapshot {
            symbol: symbol.to_string(),
            price: latest.price,
            volume: latest.volume,
            price_ago,
            volume_ago,
            price_change_pct,
            volume_change_pct,
            rsi,
            ema: self.ema_by_symbol.get(symbol).and_then(Ema::value),
            volume_spike_ratio,
            volume_spike,
            volume_trend,
            engulfing,
            signal: SignalKind::Wait,
            observed_at_ms: latest.observed_at_ms,
        })
    }
}

/// `(current - past) / past * 100`, undefined when the base is zero.
pub fn percent_change(current: f64, past: f64) -> Option<f64> {
    (past != 0.0).then(|| (current - past) / past * 100.0)
}
