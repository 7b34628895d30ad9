use serde::Deserialize;

/// One raw ticker row as OKX v5 serves it: every numeric field is a string
/// and any of them may be missing. Validation happens in the ingest path,
/// not here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxTickerRow {
    #[serde(default)]
    pub inst_id: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub vol24h: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

/// REST envelope for `/api/v5/market/tickers`.
#[derive(Debug, Deserialize)]
pub struct OkxRestResponse {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Vec<OkxTickerRow>,
}

/// Public WebSocket frame: either an event ack/error or a data push for a
/// subscribed channel.
#[derive(Debug, Deserialize)]
pub struct OkxWsFrame {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Vec<OkxTickerRow>,
}
