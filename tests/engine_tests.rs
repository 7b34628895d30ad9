use swap_screener::engine::{EngineConfig, IndicatorEngine};
use swap_screener::model::snapshot::{SignalKind, VolumeTrend};
use swap_screener::model::tick::Tick;
use swap_screener::window::UpdateOutcome;

const MIN: u64 = 60_000;

fn engine_config(signal_lookback_ms: u64) -> EngineConfig {
    EngineConfig {
        lookbacks_ms: vec![5 * MIN, 15 * MIN],
        signal_lookback_ms,
        ema_span: 21,
        volume_ma_span_ms: 15 * MIN,
        spike_threshold: 1.5,
        candle_interval_ms: MIN,
    }
}

fn tick(ts: u64, price: f64, volume: f64) -> Tick {
    Tick::new("X-USDT-SWAP", price, volume, ts)
}

#[test]
fn known_price_path_yields_exact_percent_change() {
    // Prices 100, 101, 99, 105 sampled 5 minutes apart; the change between
    // the first and last sample must be exactly (105-100)/100*100 = 5.0.
    let mut engine = IndicatorEngine::new(engine_config(15 * MIN), 30 * MIN);
    for (i, price) in [100.0, 101.0, 99.0, 105.0].iter().enumerate() {
        engine.absorb(tick(i as u64 * 5 * MIN, *price, 50.0));
    }

    let rows = engine.evaluate(15 * MIN);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert!((row.price - 105.0).abs() < f64::EPSILON);
    let change = row.price_change_pct.unwrap();
    assert!((change - 5.0).abs() < 1e-12, "change = {}", change);
}

#[test]
fn insufficient_history_propagates_as_absent() {
    let mut engine = IndicatorEngine::new(engine_config(5 * MIN), 15 * MIN);
    engine.absorb(tick(0, 100.0, 50.0));

    let rows = engine.evaluate(MIN);
    let row = &rows[0];
    assert!(row.price_change_pct.is_none());
    assert!(row.volume_change_pct.is_none());
    assert!(row.rsi.is_none());
    assert_eq!(row.signal, SignalKind::Wait);
    // EMA seeds from the first observed price immediately.
    assert!((row.ema.unwrap() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn zero_base_price_never_defaults_to_zero_change() {
    let mut engine = IndicatorEngine::new(engine_config(5 * MIN), 15 * MIN);
    engine.absorb(tick(0, 0.0, 0.0));
    engine.absorb(tick(6 * MIN, 10.0, 10.0));

    let rows = engine.evaluate(6 * MIN);
    let row = &rows[0];
    // Past sample exists but the base is zero: undefined, not 0.0.
    assert!(row.price_change_pct.is_none());
    assert!(row.volume_change_pct.is_none());
}

#[test]
fn rsi_saturates_with_direction() {
    let mut engine = IndicatorEngine::new(engine_config(5 * MIN), 15 * MIN);
    engine.absorb(tick(0, 100.0, 50.0));
    engine.absorb(tick(6 * MIN, 110.0, 50.0));
    let rows = engine.evaluate(6 * MIN);
    assert!(rows[0].rsi.unwrap() > 99.0);

    let mut engine = IndicatorEngine::new(engine_config(5 * MIN), 15 * MIN);
    engine.absorb(tick(0, 100.0, 50.0));
    engine.absorb(tick(6 * MIN, 90.0, 50.0));
    let rows = engine.evaluate(6 * MIN);
    assert!(rows[0].rsi.unwrap() < 1.0);
}

#[test]
fn volume_spike_flagged_above_threshold() {
    let mut engine = IndicatorEngine::new(engine_config(5 * MIN), 15 * MIN);
    engine.absorb(tick(MIN, 100.0, 10.0));
    engine.absorb(tick(2 * MIN, 100.0, 10.0));
    engine.absorb(tick(3 * MIN, 100.0, 10.0));
    engine.absorb(tick(4 * MIN, 100.0, 30.0));

    let rows = engine.evaluate(4 * MIN);
    let row = &rows[0];
    // Baseline mean is 10, current 30 -> ratio 3.0 over the 1.5 threshold.
    assert!((row.volume_spike_ratio.unwrap() - 3.0).abs() < 1e-12);
    assert!(row.volume_spike);
}

#[test]
fn steady_volume_is_not_a_spike() {
    let mut engine = IndicatorEngine::new(engine_config(5 * MIN), 15 * MIN);
    for i in 1..=4 {
        engine.absorb(tick(i * MIN, 100.0, 10.0));
    }
    let rows = engine.evaluate(4 * MIN);
    assert!((rows[0].volume_spike_ratio.unwrap() - 1.0).abs() < 1e-12);
    assert!(!rows[0].volume_spike);
}

#[test]
fn duplicate_ticks_do_not_advance_ema() {
    let mut engine = IndicatorEngine::new(engine_config(5 * MIN), 15 * MIN);
    engine.absorb(tick(0, 100.0, 50.0));
    let ema_after_first = engine.evaluate(0)[0].ema.unwrap();

    assert_eq!(
        engine.absorb(tick(0, 100.0, 50.0)),
        UpdateOutcome::Duplicate
    );
    let ema_after_duplicate = engine.evaluate(0)[0].ema.unwrap();
    assert!((ema_after_first - ema_after_duplicate).abs() < f64::EPSILON);
}

#[test]
fn volume_trend_tracks_cycles() {
    let mut engine = IndicatorEngine::new(engine_config(5 * MIN), 15 * MIN);
    engine.absorb(tick(0, 100.0, 50.0));

    // First cycle sees the symbol for the first time.
    assert_eq!(engine.evaluate(0)[0].volume_trend, VolumeTrend::New);

    engine.absorb(tick(MIN, 100.0, 60.0));
    assert_eq!(engine.evaluate(MIN)[0].volume_trend, VolumeTrend::Rising);

    engine.absorb(tick(2 * MIN, 100.0, 40.0));
    assert_eq!(engine.evaluate(2 * MIN)[0].volume_trend, VolumeTrend::Falling);

    // No fresh tick: volume unchanged since the last cycle.
    assert_eq!(engine.evaluate(3 * MIN)[0].volume_trend, VolumeTrend::Flat);
}

#[test]
fn engulfing_detected_from_closed_candles() {
    let mut engine = IndicatorEngine::new(engine_config(5 * MIN), 15 * MIN);
    // Candle 1 (0..1m): bearish 102 -> 100.
    engine.absorb(tick(1_000, 102.0, 10.0));
    engine.absorb(tick(50_000, 100.0, 10.0));
    // Candle 2 (1m..2m): bullish 99.5 -> 103, engulfing candle 1's body.
    engine.absorb(tick(MIN + 1_000, 99.5, 10.0));
    engine.absorb(tick(MIN + 50_000, 103.0, 10.0));
    // Candle 3 still forming.
    engine.absorb(tick(2 * MIN + 1_000, 103.5, 10.0));

    let rows = engine.evaluate(2 * MIN + 1_000);
    assert_eq!(
        rows[0].engulfing,
        Some(swap_screener::model::candle::Engulfing::Bullish)
    );
}

#[test]
fn lookback_maps_fill_in_as_history_accumulates() {
    let mut engine = IndicatorEngine::new(engine_config(5 * MIN), 30 * MIN);
    engine.absorb(tick(0, 100.0, 50.0));
    engine.absorb(tick(6 * MIN, 101.0, 55.0));

    let rows = engine.evaluate(6 * MIN);
    let row = &rows[0];
    // 5m lookback resolved, 15m not yet.
    assert!(row.price_ago.contains_key(&(5 * MIN)));
    assert!(!row.price_ago.contains_key(&(15 * MIN)));
    assert!((row.price_ago[&(5 * MIN)] - 100.0).abs() < f64::EPSILON);
}
