use swap_screener::model::tick::Tick;
use swap_screener::window::{SymbolWindowStore, UpdateOutcome};

const MIN: u64 = 60_000;

fn tick(symbol: &str, ts: u64, price: f64, volume: f64) -> Tick {
    Tick::new(symbol, price, volume, ts)
}

#[test]
fn value_at_returns_closest_qualifying_sample() {
    let mut store = SymbolWindowStore::new(15 * MIN);
    // Samples at t=0, 2m, 4m, 6m
    for (i, price) in [100.0, 101.0, 102.0, 103.0].iter().enumerate() {
        store.update(tick("BTC-USDT-SWAP", i as u64 * 2 * MIN, *price, 10.0));
    }

    // At now=6m with 5m lookback, only t=0 qualifies (age 6m >= 5m).
    let past = store.value_at("BTC-USDT-SWAP", 6 * MIN, 5 * MIN).unwrap();
    assert_eq!(past.observed_at_ms, 0);

    // At now=10m with 5m lookback, t=0 (age 10m), t=2m (age 8m) and t=4m
    // (age 6m) all qualify; the most recent qualifying sample wins.
    let past = store.value_at("BTC-USDT-SWAP", 10 * MIN, 5 * MIN).unwrap();
    assert_eq!(past.observed_at_ms, 4 * MIN);
    assert!((past.price - 102.0).abs() < f64::EPSILON);
}

#[test]
fn insufficient_history_is_absent() {
    let mut store = SymbolWindowStore::new(15 * MIN);
    store.update(tick("BTC-USDT-SWAP", 10 * MIN, 100.0, 10.0));
    store.update(tick("BTC-USDT-SWAP", 12 * MIN, 101.0, 10.0));

    assert!(store
        .value_at("BTC-USDT-SWAP", 12 * MIN, 5 * MIN)
        .is_none());
    assert!(store.value_at("UNKNOWN-USDT-SWAP", 12 * MIN, MIN).is_none());
}

#[test]
fn ticks_beyond_horizon_are_evicted() {
    let mut store = SymbolWindowStore::new(15 * MIN);
    store.update(tick("BTC-USDT-SWAP", 0, 100.0, 500.0));
    store.update(tick("BTC-USDT-SWAP", 10 * MIN, 101.0, 10.0));
    assert_eq!(store.tick_count("BTC-USDT-SWAP"), 2);

    // This tick pushes the t=0 sample past the horizon.
    store.update(tick("BTC-USDT-SWAP", 16 * MIN, 102.0, 10.0));
    assert_eq!(store.tick_count("BTC-USDT-SWAP"), 2);

    // The evicted tick is invisible to lookups...
    assert!(store
        .value_at("BTC-USDT-SWAP", 16 * MIN, 15 * MIN)
        .is_none());
    // ...and its outsized volume no longer skews the mean.
    let mean = store
        .volume_mean("BTC-USDT-SWAP", 16 * MIN, 15 * MIN)
        .unwrap();
    assert!((mean - 10.0).abs() < f64::EPSILON);
}

#[test]
fn out_of_order_arrival_lands_in_timestamp_order() {
    let mut store = SymbolWindowStore::new(15 * MIN);
    assert_eq!(
        store.update(tick("BTC-USDT-SWAP", 4 * MIN, 104.0, 10.0)),
        UpdateOutcome::Appended
    );
    assert_eq!(
        store.update(tick("BTC-USDT-SWAP", 2 * MIN, 102.0, 10.0)),
        UpdateOutcome::Reordered
    );

    let latest = store.latest("BTC-USDT-SWAP").unwrap();
    assert_eq!(latest.observed_at_ms, 4 * MIN);
    let past = store.value_at("BTC-USDT-SWAP", 4 * MIN, 2 * MIN).unwrap();
    assert_eq!(past.observed_at_ms, 2 * MIN);
}

#[test]
fn duplicate_tick_does_not_double_count_volume_mean() {
    let mut store = SymbolWindowStore::new(15 * MIN);
    store.update(tick("BTC-USDT-SWAP", MIN, 100.0, 30.0));
    store.update(tick("BTC-USDT-SWAP", 2 * MIN, 100.0, 60.0));
    store.update(tick("BTC-USDT-SWAP", 3 * MIN, 100.0, 5.0));
    assert_eq!(
        store.update(tick("BTC-USDT-SWAP", 2 * MIN, 100.0, 60.0)),
        UpdateOutcome::Duplicate
    );
    assert_eq!(store.tick_count("BTC-USDT-SWAP"), 3);

    // Mean over the baseline (everything but the newest): (30 + 60) / 2.
    let mean = store.volume_mean("BTC-USDT-SWAP", 3 * MIN, 15 * MIN).unwrap();
    assert!((mean - 45.0).abs() < f64::EPSILON);
}

#[test]
fn windows_are_independent_per_symbol() {
    let mut store = SymbolWindowStore::new(15 * MIN);
    store.update(tick("BTC-USDT-SWAP", 0, 100.0, 10.0));
    store.update(tick("ETH-USDT-SWAP", 0, 2000.0, 99.0));
    store.update(tick("BTC-USDT-SWAP", 6 * MIN, 105.0, 10.0));

    assert_eq!(store.symbol_count(), 2);
    let btc = store.value_at("BTC-USDT-SWAP", 6 * MIN, 5 * MIN).unwrap();
    assert!((btc.price - 100.0).abs() < f64::EPSILON);
    assert!(store.value_at("ETH-USDT-SWAP", 6 * MIN, 5 * MIN).is_some());
}

#[test]
fn candle_bucketing_splits_on_interval() {
    let mut store = SymbolWindowStore::new(15 * MIN);
    store.update(tick("BTC-USDT-SWAP", 10_000, 100.0, 1.0));
    store.update(tick("BTC-USDT-SWAP", 30_000, 105.0, 1.0));
    store.update(tick("BTC-USDT-SWAP", MIN + 5_000, 103.0, 1.0));
    store.update(tick("BTC-USDT-SWAP", 2 * MIN + 1_000, 99.0, 1.0));

    let candles = store.candles("BTC-USDT-SWAP", MIN);
    assert_eq!(candles.len(), 3);
    assert!((candles[0].open - 100.0).abs() < f64::EPSILON);
    assert!((candles[0].close - 105.0).abs() < f64::EPSILON);
    assert!((candles[1].open - 103.0).abs() < f64::EPSILON);
}
