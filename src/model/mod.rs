pub mod candle;
pub mod snapshot;
pub mod tick;
