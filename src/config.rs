use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::model::snapshot::SortKey;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    pub screener: ScreenerConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

/// Which transport supplies ticker rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedTransport {
    /// Periodic REST polling of the full SWAP ticker table.
    Poll,
    /// Push subscription for the configured instruments.
    Websocket,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub rest_base_url: String,
    pub ws_url: String,
    pub transport: FeedTransport,
    pub poll_interval: String,
    pub request_timeout: String,
    /// Instruments to subscribe in websocket mode. Poll mode screens the
    /// whole SWAP table and ignores this list.
    #[serde(default)]
    pub instruments: Vec<String>,
    /// Only instruments ending with this suffix are ingested.
    #[serde(default = "default_quote_filter")]
    pub quote_filter: String,
}

fn default_quote_filter() -> String {
    "-USDT-SWAP".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenerConfig {
    pub retention_horizon: String,
    pub lookbacks: Vec<String>,
    /// Lookback pair feeding the classifier; must appear in `lookbacks`.
    pub signal_lookback: String,
    pub eval_interval: String,
    pub ema_span: usize,
    pub volume_ma_span: String,
    pub spike_threshold: f64,
    pub price_threshold_pct: f64,
    pub volume_threshold_pct: f64,
    pub candle_interval: String,
    #[serde(default)]
    pub min_volume: Option<f64>,
    #[serde(default)]
    pub max_volume: Option<f64>,
    #[serde(default = "default_sort_key")]
    pub sort_key: SortKey,
}

fn default_sort_key() -> SortKey {
    SortKey::Price
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub stale_after: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Parse a duration string (e.g. "30s", "5m", "2h", "1d") into milliseconds.
pub fn parse_duration_ms(s: &str) -> Result<u64> {
    if s.len() < 2 {
        bail!("invalid duration '{}': expected format like '5m'", s);
    }

    let (num_str, suffix) = s.split_at(s.len() - 1);
    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid duration '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid duration '{}': quantity must be > 0", s);
    }

    let unit_ms = match suffix {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        _ => bail!(
            "invalid duration '{}': unsupported suffix '{}', expected one of s/m/h/d",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid duration '{}': value is too large", s))
}

impl FeedConfig {
    pub fn poll_interval_ms(&self) -> Result<u64> {
        parse_duration_ms(&self.poll_interval)
    }

    pub fn request_timeout_ms(&self) -> Result<u64> {
        parse_duration_ms(&self.request_timeout)
    }

    pub fn tracked_instruments(&self) -> Vec<String> {
        let mut out = Vec::new();
        for inst in &self.instruments {
            let s = inst.trim().to_ascii_uppercase();
            if !s.is_empty() && !out.iter().any(|v| v == &s) {
                out.push(s);
            }
        }
        out
    }
}

impl ScreenerConfig {
    pub fn retention_horizon_ms(&self) -> Result<u64> {
        parse_duration_ms(&self.retention_horizon)
    }

    pub fn lookbacks_ms(&self) -> Result<Vec<u64>> {
        let mut out = Vec::new();
        for lb in &self.lookbacks {
            let ms = parse_duration_ms(lb)
                .with_context(|| format!("screener.lookbacks entry '{}' is invalid", lb))?;
            if !out.contains(&ms) {
                out.push(ms);
            }
        }
        out.sort_unstable();
        Ok(out)
    }

    pub fn signal_lookback_ms(&self) -> Result<u64> {
        parse_duration_ms(&self.signal_lookback)
    }

    pub fn eval_interval_ms(&self) -> Result<u64> {
        parse_duration_ms(&self.eval_interval)
    }

    pub fn volume_ma_span_ms(&self) -> Result<u64> {
        parse_duration_ms(&self.volume_ma_span)
    }

    pub fn candle_interval_ms(&self) -> Result<u64> {
        parse_duration_ms(&self.candle_interval)
    }

    /// Invalid thresholds or inconsistent durations are fatal at startup.
    pub fn validate(&self) -> Result<()> {
        if self.ema_span == 0 {
            bail!("screener.ema_span must be > 0");
        }
        if self.spike_threshold <= 0.0 {
            bail!("screener.spike_threshold must be > 0");
        }
        if self.price_threshold_pct <= 0.0 || self.volume_threshold_pct <= 0.0 {
            bail!("screener thresholds must be > 0");
        }
        let lookbacks = self.lookbacks_ms()?;
        if lookbacks.is_empty() {
            bail!("screener.lookbacks must not be empty");
        }
        let signal_lb = self.signal_lookback_ms()?;
        if !lookbacks.contains(&signal_lb) {
            bail!(
                "screener.signal_lookback '{}' must be one of screener.lookbacks",
                self.signal_lookback
            );
        }
        let horizon = self.retention_horizon_ms()?;
        let longest = *lookbacks.last().unwrap_or(&0);
        if horizon < longest {
            bail!(
                "screener.retention_horizon '{}' is shorter than the longest lookback",
                self.retention_horizon
            );
        }
        self.eval_interval_ms()
            .context("screener.eval_interval is invalid")?;
        self.volume_ma_span_ms()
            .context("screener.volume_ma_span is invalid")?;
        self.candle_interval_ms()
            .context("screener.candle_interval is invalid")?;
        if let (Some(min), Some(max)) = (self.min_volume, self.max_volume) {
            if min > max {
                bail!("screener.min_volume must be <= screener.max_volume");
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config/default.toml"))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        config.screener.validate()?;
        config
            .feed
            .poll_interval_ms()
            .context("feed.poll_interval is invalid")?;
        config
            .feed
            .request_timeout_ms()
            .context("feed.request_timeout is invalid")?;
        parse_duration_ms(&config.ui.stale_after).context("ui.stale_after is invalid")?;
        url::Url::parse(&config.feed.rest_base_url).context("feed.rest_base_url is invalid")?;
        url::Url::parse(&config.feed.ws_url).context("feed.ws_url is invalid")?;
        if config.feed.transport == FeedTransport::Websocket
            && config.feed.tracked_instruments().is_empty()
        {
            bail!("feed.instruments must not be empty in websocket mode");
        }

        Ok(config)
    }
}
