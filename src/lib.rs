//! Sweepscan - liquidity sweep scanner for forex pairs
//!
//! Scans a fixed instrument universe for liquidity sweeps of reference
//! price levels, grades the resulting trade candidates, and serves them
//! over HTTP while pushing alerts to subscribed Telegram recipients.

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use config::Config;
use notify::RecipientStore;
use services::Scanner;
use sources::OandaClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scanner: Arc<Scanner<OandaClient>>,
    pub candle_source: Arc<OandaClient>,
    pub recipients: Arc<RecipientStore>,
}
