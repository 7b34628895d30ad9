/// OHLC candle bucketed from ticks over a fixed interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub open_time_ms: u64,
    pub close_time_ms: u64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Two-candle engulfing pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engulfing {
    Bullish,
    Bearish,
}

/// Detect an engulfing pattern: the current body must fully cover the
/// previous body and reverse its direction.
pub fn detect_engulfing(prev: &Candle, current: &Candle) -> Option<Engulfing> {
    if !prev.is_bullish()
        && current.is_bullish()
        && current.open <= prev.close
        && current.close >= prev.open
    {
        Some(Engulfing::Bullish)
    } else if prev.is_bullish()
        && !current.is_bullish()
        && current.open >= prev.close
        && current.close <= prev.open
    {
        Some(Engulfing::Bearish)
    } else {
        None
    }
}

/// Aggregates ticks into a single candle over an interval-aligned bucket.
#[derive(Debug, Clone)]
pub struct CandleBuilder {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub open_time_ms: u64,
    pub close_time_ms: u64,
}

impl CandleBuilder {
    pub fn new(price: f64, timestamp_ms: u64, interval_ms: u64) -> Self {
        assert!(interval_ms > 0, "interval_ms must be > 0");
        let open_time_ms = timestamp_ms - (timestamp_ms % interval_ms);
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
            open_time_ms,
            close_time_ms: open_time_ms + interval_ms,
        }
    }

    pub fn update(&mut self, price: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
    }

    pub fn contains(&self, timestamp_ms: u64) -> bool {
        timestamp_ms >= self.open_time_ms && timestamp_ms < self.close_time_ms
    }

    pub fn finish(&self) -> Candle {
        Candle {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            open_time_ms: self.open_time_ms,
            close_time_ms: self.close_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, close: f64) -> Candle {
        Candle {
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            open_time_ms: 0,
            close_time_ms: 60_000,
        }
    }

    #[test]
    fn candle_builder_buckets_and_aggregates() {
        let mut cb = CandleBuilder::new(100.0, 60_500, 60_000);
        assert_eq!(cb.open_time_ms, 60_000);
        assert_eq!(cb.close_time_ms, 120_000);
        assert!(cb.contains(119_999));
        assert!(!cb.contains(120_000));

        cb.update(105.0);
        cb.update(95.0);
        cb.update(102.0);

        let candle = cb.finish();
        assert!((candle.open - 100.0).abs() < f64::EPSILON);
        assert!((candle.high - 105.0).abs() < f64::EPSILON);
        assert!((candle.low - 95.0).abs() < f64::EPSILON);
        assert!((candle.close - 102.0).abs() < f64::EPSILON);
        assert!(candle.is_bullish());
    }

    #[test]
    fn bullish_engulfing_detected() {
        let prev = candle(102.0, 100.0);
        let current = candle(99.5, 103.0);
        assert_eq!(detect_engulfing(&prev, &current), Some(Engulfing::Bullish));
    }

    #[test]
    fn bearish_engulfing_detected() {
        let prev = candle(100.0, 102.0);
        let current = candle(102.5, 99.0);
        assert_eq!(detect_engulfing(&prev, &current), Some(Engulfing::Bearish));
    }

    #[test]
    fn small_body_is_not_engulfing() {
        let prev = candle(100.0, 104.0);
        let current = candle(103.0, 101.0);
        assert_eq!(detect_engulfing(&prev, &current), None);
    }

    #[test]
    #[should_panic(expected = "interval_ms must be > 0")]
    fn candle_builder_rejects_zero_interval() {
        let _ = CandleBuilder::new(100.0, 60_500, 0);
    }
}
