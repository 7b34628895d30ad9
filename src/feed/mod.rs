pub mod rest;
pub mod types;
pub mod ws;

use std::time::Duration;

/// Exponential backoff for feed retries.
pub(crate) struct ExponentialBackoff {
    current: Duration,
    initial: Duration,
    max: Duration,
    factor: f64,
}

impl ExponentialBackoff {
    pub(crate) fn new(initial: Duration, max: Duration, factor: f64) -> Self {
        Self {
            current: initial,
            initial,
            max,
            factor,
        }
    }

    pub(crate) fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = Duration::from_secs_f64(
            (self.current.as_secs_f64() * self.factor).min(self.max.as_secs_f64()),
        );
        delay
    }

    pub(crate) fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Keep only instruments matching the configured quote suffix
/// (e.g. "-USDT-SWAP").
pub fn matches_quote_filter(inst_id: &str, quote_filter: &str) -> bool {
    quote_filter.is_empty() || inst_id.ends_with(quote_filter)
}
