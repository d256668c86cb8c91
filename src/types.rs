use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Asset specification — one configured entry per tracked asset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub symbol: String,
    /// Chain the token lives on (None for majors like BTC/ETH).
    pub chain: Option<String>,
}

impl AssetSpec {
    /// Parse a `SYMBOL[:chain]` config entry, e.g. `NATIX:solana` or `BTC`.
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        match entry.split_once(':') {
            Some((sym, chain)) if !sym.is_empty() && !chain.is_empty() => Some(Self {
                symbol: sym.to_uppercase(),
                chain: Some(chain.to_lowercase()),
            }),
            Some(_) => None,
            None => Some(Self {
                symbol: entry.to_uppercase(),
                chain: None,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Quote currency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quote {
    Usdt,
    Btc,
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quote::Usdt => write!(f, "USDT"),
            Quote::Btc => write!(f, "BTC"),
        }
    }
}

// ---------------------------------------------------------------------------
// Trend classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Uptrend,
    Downtrend,
}

impl Trend {
    /// Uptrend iff the fast EMA sits above the slow EMA.
    pub fn from_emas(ema_fast: f64, ema_slow: f64) -> Self {
        if ema_fast > ema_slow {
            Trend::Uptrend
        } else {
            Trend::Downtrend
        }
    }

    /// CSS hook used by the dashboard card markup.
    pub fn css_class(self) -> &'static str {
        match self {
            Trend::Uptrend => "uptrend",
            Trend::Downtrend => "downtrend",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Uptrend => write!(f, "Uptrend"),
            Trend::Downtrend => write!(f, "Downtrend"),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-quote analysis outcome
// ---------------------------------------------------------------------------

/// One successful trend computation for an asset against a quote currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendStats {
    /// e.g. "SOL/USDT"
    pub pair: String,
    pub quote: Quote,
    pub current_price: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub trend: Trend,
    /// Exchange the closes came from ("binance", "kucoin", ...).
    pub exchange: String,
    /// True when the series was derived by dividing two USDT series
    /// (tokens with no native BTC pair).
    pub is_derived: bool,
}

/// A per-quote analysis either produced stats or failed with a reason.
/// Failure of one quote never aborts the other quote or other assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TrendOutcome {
    Ok(TrendStats),
    Failed {
        pair: String,
        reason: String,
        exchange: Option<String>,
    },
}

impl TrendOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, TrendOutcome::Ok(_))
    }

    pub fn failed(pair: impl Into<String>, reason: impl Into<String>) -> Self {
        TrendOutcome::Failed {
            pair: pair.into(),
            reason: reason.into(),
            exchange: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot — what a render pass reads
// ---------------------------------------------------------------------------

/// One asset's full analysis: USDT always, BTC for everything except BTC itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetAnalysis {
    pub symbol: String,
    pub chain: Option<String>,
    pub usdt: TrendOutcome,
    /// None for BTC (an asset has no trend against itself).
    pub btc: Option<TrendOutcome>,
}

impl AssetAnalysis {
    /// True when neither quote produced usable stats — the skip policy
    /// drops such records from the rendered section.
    pub fn is_empty_failure(&self) -> bool {
        !self.usdt.is_ok() && !self.btc.as_ref().map_or(false, TrendOutcome::is_ok)
    }
}

/// The full dashboard input: two ordered collections plus the refresh stamp.
/// Collection order is render order. `last_update` stays None until the
/// first successful /update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub portfolio: Vec<AssetAnalysis>,
    pub watchlist: Vec<AssetAnalysis>,
    pub last_update: Option<DateTime<Utc>>,
}

impl AnalysisSnapshot {
    pub fn asset_count(&self) -> usize {
        self.portfolio.len() + self.watchlist.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
