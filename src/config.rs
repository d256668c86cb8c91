use crate::error::{AppError, Result};
use crate::types::AssetSpec;

/// EMA periods used by the trend rule (fast above slow = uptrend).
pub const EMA_FAST_PERIOD: usize = 8;
pub const EMA_SLOW_PERIOD: usize = 20;

/// Daily candles fetched per series.
pub const CANDLE_LIMIT: usize = 50;

/// HTTP timeout for a single exchange request (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Overall deadline for one full snapshot rebuild (seconds).
/// A /update call that exceeds this fails and keeps the old snapshot.
pub const REFRESH_DEADLINE_SECS: u64 = 120;

/// Default asset lists — the original tracked set.
pub const DEFAULT_PORTFOLIO: &str = "BTC,ETH,SOL,BANANA:ethereum";
pub const DEFAULT_WATCHLIST: &str = "NATIX:solana,TIG:base,FAI:base";

/// What to do with a record whose analysis failed on every quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingDataPolicy {
    /// Drop the record from the rendered section and log a warning.
    Skip,
    /// Render an error card in the record's place.
    Placeholder,
}

impl MissingDataPolicy {
    fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(MissingDataPolicy::Skip),
            "placeholder" => Ok(MissingDataPolicy::Placeholder),
            other => Err(AppError::Config(format!(
                "MISSING_DATA_POLICY must be 'skip' or 'placeholder', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// Assets rendered under the "Portfolio" heading, in order (PORTFOLIO_ASSETS).
    pub portfolio: Vec<AssetSpec>,
    /// Assets rendered under the "Watch List" heading, in order (WATCHLIST_ASSETS).
    pub watchlist: Vec<AssetSpec>,
    /// Policy for records with no usable analysis (MISSING_DATA_POLICY).
    pub missing_data_policy: MissingDataPolicy,
    /// Background refresh interval in seconds, 0 = manual refresh only
    /// (REFRESH_INTERVAL_SECS).
    pub refresh_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            portfolio: parse_asset_list(
                &std::env::var("PORTFOLIO_ASSETS").unwrap_or_else(|_| DEFAULT_PORTFOLIO.to_string()),
            )?,
            watchlist: parse_asset_list(
                &std::env::var("WATCHLIST_ASSETS").unwrap_or_else(|_| DEFAULT_WATCHLIST.to_string()),
            )?,
            missing_data_policy: MissingDataPolicy::parse(
                &std::env::var("MISSING_DATA_POLICY").unwrap_or_else(|_| "skip".to_string()),
            )?,
            refresh_interval_secs: std::env::var("REFRESH_INTERVAL_SECS")
                .unwrap_or_else(|_| "0".to_string())
                .parse::<u64>()
                .unwrap_or(0),
        })
    }
}

/// Parse a comma-separated `SYMBOL[:chain]` list. Empty segments are skipped;
/// a malformed segment (empty symbol or dangling colon) is a config error.
fn parse_asset_list(raw: &str) -> Result<Vec<AssetSpec>> {
    let mut specs = Vec::new();
    for entry in raw.split(',') {
        if entry.trim().is_empty() {
            continue;
        }
        match AssetSpec::parse(entry) {
            Some(spec) => specs.push(spec),
            None => {
                return Err(AppError::Config(format!(
                    "malformed asset entry '{}' (expected SYMBOL or SYMBOL:chain)",
                    entry.trim()
                )))
            }
        }
    }
    Ok(specs)
}
