pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod feed;
pub mod indicator;
pub mod ingest;
pub mod input;
pub mod model;
pub mod publish;
pub mod ui;
pub mod window;
