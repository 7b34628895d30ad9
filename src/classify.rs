use crate::model::snapshot::{IndicatorSnapshot, SignalKind};

/// Threshold rules mapping indicator output to a discrete signal.
///
/// Stateless: every cycle re-evaluates from scratch, so a symbol moves
/// freely between WAIT/NEUTRAL/BUY/SELL as data arrives.
#[derive(Debug, Clone)]
pub struct SignalClassifier {
    price_threshold_pct: f64,
    volume_threshold_pct: f64,
}

impl SignalClassifier {
    pub fn new(price_threshold_pct: f64, volume_threshold_pct: f64) -> Self {
        assert!(
            price_threshold_pct > 0.0 && volume_threshold_pct > 0.0,
            "classifier thresholds must be > 0"
        );
        Self {
            price_threshold_pct,
            volume_threshold_pct,
        }
    }

    pub fn classify(
        &self,
        price_change_pct: Option<f64>,
        volume_change_pct: Option<f64>,
    ) -> SignalKind {
        let (Some(price_pct), Some(volume_pct)) = (price_change_pct, volume_change_pct) else {
            return SignalKind::Wait;
        };
        if volume_pct > self.volume_threshold_pct {
            if price_pct > self.price_threshold_pct {
                return SignalKind::Buy;
            }
            if price_pct < -self.price_threshold_pct {
                return SignalKind::Sell;
            }
        }
        SignalKind::Neutral
    }

    /// Classify a whole evaluation cycle in place.
    pub fn apply(&self, rows: &mut [IndicatorSnapshot]) {
        for row in rows {
            row.signal = self.classify(row.price_change_pct, row.volume_change_pct);
        }
    }
}
