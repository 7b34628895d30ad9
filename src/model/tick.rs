/// One observed (price, volume, timestamp) sample for a trading symbol.
///
/// Immutable once created by the ingest path; lives in a symbol window until
/// evicted by the retention horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    pub observed_at_ms: u64,
}

impl Tick {
    pub fn new(symbol: impl Into<String>, price: f64, volume: f64, observed_at_ms: u64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume,
            observed_at_ms,
        }
    }
}
