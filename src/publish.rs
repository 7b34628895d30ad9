use std::sync::Arc;

use tokio::sync::watch;

use crate::model::snapshot::{IndicatorSnapshot, ScreenerSnapshot, SortKey};

/// Assembles per-symbol rows into an immutable [`ScreenerSnapshot`] and
/// publishes it atomically through a `watch` channel: consumers only ever
/// observe a complete snapshot.
pub struct SnapshotPublisher {
    sort_key: SortKey,
    min_volume: Option<f64>,
    max_volume: Option<f64>,
    tx: watch::Sender<Arc<ScreenerSnapshot>>,
}

impl SnapshotPublisher {
    pub fn new(sort_key: SortKey, min_volume: Option<f64>, max_volume: Option<f64>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(ScreenerSnapshot::default()));
        Self {
            sort_key,
            min_volume,
            max_volume,
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ScreenerSnapshot>> {
        self.tx.subscribe()
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    pub fn publish(&self, mut rows: Vec<IndicatorSnapshot>, now_ms: u64) -> Arc<ScreenerSnapshot> {
        rows.retain(|row| self.volume_in_band(row.volume));
        sort_rows(&mut rows, self.sort_key);
        let snapshot = Arc::new(ScreenerSnapshot {
            generated_at_ms: now_ms,
            rows,
        });
        let _ = self.tx.send(snapshot.clone());
        snapshot
    }

    fn volume_in_band(&self, volume: f64) -> bool {
        self.min_volume.map_or(true, |min| volume >= min)
            && self.max_volume.map_or(true, |max| volume <= max)
    }
}

pub fn sort_rows(rows: &mut [IndicatorSnapshot], key: SortKey) {
    match key {
        SortKey::Price => rows.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::Volume => rows.sort_by(|a, b| b.volume.total_cmp(&a.volume)),
        SortKey::SignalVolume => rows.sort_by(|a, b| {
            a.signal
                .sort_rank()
                .cmp(&b.signal.sort_rank())
                .then_with(|| b.volume.total_cmp(&a.volume))
        }),
    }
}
