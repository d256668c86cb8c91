//! Trend analysis: turns close series into per-asset EMA-8/EMA-20
//! classifications. Failures are isolated per quote — one bad series never
//! takes down the rest of the snapshot.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::{Config, EMA_FAST_PERIOD, EMA_SLOW_PERIOD};
use crate::fetcher::{exchanges_for, fetch_closes_routed, Exchange};
use crate::indicators::ema_last;
use crate::types::{
    AnalysisSnapshot, AssetAnalysis, AssetSpec, Quote, Trend, TrendOutcome, TrendStats,
};

/// Minimum closes for a meaningful crossover reading.
const MIN_CLOSES: usize = 2;

/// Assets listed only against USDT get their BTC series derived by dividing
/// the USDT series by BTC/USDT (the asset's routing chain tells us whether a
/// native BTC pair exists — only Binance-listed majors have one).
fn needs_derived_btc(symbol: &str) -> bool {
    exchanges_for(symbol) != [Exchange::Binance]
}

/// Element-wise ratio of two close series over their shared window.
fn derive_relative_closes(asset_usdt: &[f64], btc_usdt: &[f64]) -> Vec<f64> {
    asset_usdt
        .iter()
        .zip(btc_usdt.iter())
        .filter(|&(_, &b)| b > 0.0)
        .map(|(&a, &b)| a / b)
        .collect()
}

/// EMA pass over a chronological close series.
fn compute_stats(
    pair: String,
    quote: Quote,
    exchange: &str,
    is_derived: bool,
    closes: &[f64],
) -> TrendOutcome {
    if closes.len() < MIN_CLOSES {
        return TrendOutcome::Failed {
            pair,
            reason: format!("insufficient history ({} closes)", closes.len()),
            exchange: Some(exchange.to_string()),
        };
    }
    // len >= MIN_CLOSES, so both EMAs and the last close exist
    let ema_fast = ema_last(closes, EMA_FAST_PERIOD).unwrap_or(0.0);
    let ema_slow = ema_last(closes, EMA_SLOW_PERIOD).unwrap_or(0.0);
    let current_price = *closes.last().unwrap_or(&0.0);

    TrendOutcome::Ok(TrendStats {
        pair,
        quote,
        current_price,
        ema_fast,
        ema_slow,
        trend: Trend::from_emas(ema_fast, ema_slow),
        exchange: exchange.to_string(),
        is_derived,
    })
}

/// Analyze one asset against one quote currency.
pub async fn analyze_quote(
    client: &reqwest::Client,
    symbol: &str,
    quote: Quote,
) -> TrendOutcome {
    let pair = format!("{symbol}/{quote}");

    if quote == Quote::Btc && needs_derived_btc(symbol) {
        // No native BTC pair — derive from the USDT series.
        let (asset_closes, exchange) = match fetch_closes_routed(client, symbol, "USDT").await {
            Ok(r) => r,
            Err(e) => return TrendOutcome::failed(pair, e.to_string()),
        };
        let (btc_closes, _) = match fetch_closes_routed(client, "BTC", "USDT").await {
            Ok(r) => r,
            Err(e) => return TrendOutcome::failed(pair, format!("BTC reference: {e}")),
        };
        let derived = derive_relative_closes(&asset_closes, &btc_closes);
        return compute_stats(pair, quote, exchange.id(), true, &derived);
    }

    match fetch_closes_routed(client, symbol, &quote.to_string()).await {
        Ok((closes, exchange)) => compute_stats(pair, quote, exchange.id(), false, &closes),
        Err(e) => TrendOutcome::failed(pair, e.to_string()),
    }
}

/// Full analysis for one asset: USDT always, BTC unless the asset is BTC.
pub async fn analyze_asset(client: &reqwest::Client, spec: &AssetSpec) -> AssetAnalysis {
    let usdt = analyze_quote(client, &spec.symbol, Quote::Usdt).await;
    let btc = if spec.symbol == "BTC" {
        None
    } else {
        Some(analyze_quote(client, &spec.symbol, Quote::Btc).await)
    };

    if let TrendOutcome::Failed { reason, .. } = &usdt {
        warn!(symbol = %spec.symbol, "USDT analysis failed: {reason}");
    }

    AssetAnalysis {
        symbol: spec.symbol.clone(),
        chain: spec.chain.clone(),
        usdt,
        btc,
    }
}

async fn analyze_collection(
    client: &reqwest::Client,
    specs: &[AssetSpec],
) -> Vec<AssetAnalysis> {
    let mut out = Vec::with_capacity(specs.len());
    for spec in specs {
        out.push(analyze_asset(client, spec).await);
    }
    out
}

/// Build a complete snapshot for both collections, preserving config order.
/// `last_update` is the caller's concern: None on the bootstrap pass, the
/// refresh time on /update passes.
pub async fn build_snapshot(
    cfg: &Config,
    client: &reqwest::Client,
    last_update: Option<DateTime<Utc>>,
) -> AnalysisSnapshot {
    let portfolio = analyze_collection(client, &cfg.portfolio).await;
    let watchlist = analyze_collection(client, &cfg.watchlist).await;

    let failed = portfolio
        .iter()
        .chain(watchlist.iter())
        .filter(|a| a.is_empty_failure())
        .count();
    info!(
        portfolio = portfolio.len(),
        watchlist = watchlist.len(),
        failed,
        "snapshot built"
    );

    AnalysisSnapshot {
        portfolio,
        watchlist,
        last_update,
    }
}
