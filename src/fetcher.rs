//! Exchange REST client: daily OHLCV closes per asset, with per-asset
//! exchange routing and fallback chains recovered from the reference setup
//! (majors on Binance, TIG on XT, NATIX via KuCoin→Gate→MEXC, FAI via
//! BitMart→BingX).

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{CANDLE_LIMIT, HTTP_TIMEOUT_SECS};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    Binance,
    Xt,
    Kucoin,
    Gate,
    Mexc,
    Bitmart,
    Bingx,
}

impl Exchange {
    pub fn id(self) -> &'static str {
        match self {
            Exchange::Binance => "binance",
            Exchange::Xt => "xt",
            Exchange::Kucoin => "kucoin",
            Exchange::Gate => "gate",
            Exchange::Mexc => "mexc",
            Exchange::Bitmart => "bitmart",
            Exchange::Bingx => "bingx",
        }
    }

    /// Venue-specific pair formatting, e.g. NATIX/USDT is `NATIX-USDT` on
    /// KuCoin but `NATIX_USDT` on Gate.
    fn format_pair(self, base: &str, quote: &str) -> String {
        match self {
            Exchange::Binance | Exchange::Mexc => format!("{base}{quote}"),
            Exchange::Xt => format!("{}_{}", base.to_lowercase(), quote.to_lowercase()),
            Exchange::Kucoin | Exchange::Bingx => format!("{base}-{quote}"),
            Exchange::Gate | Exchange::Bitmart => format!("{base}_{quote}"),
        }
    }

    fn kline_url(self, pair: &str) -> String {
        match self {
            Exchange::Binance => format!(
                "https://api.binance.com/api/v3/klines?symbol={pair}&interval=1d&limit={CANDLE_LIMIT}"
            ),
            Exchange::Mexc => format!(
                "https://api.mexc.com/api/v3/klines?symbol={pair}&interval=1d&limit={CANDLE_LIMIT}"
            ),
            Exchange::Xt => format!(
                "https://sapi.xt.com/v4/public/kline?symbol={pair}&interval=1d&limit={CANDLE_LIMIT}"
            ),
            Exchange::Kucoin => format!(
                "https://api.kucoin.com/api/v1/market/candles?type=1day&symbol={pair}"
            ),
            Exchange::Gate => format!(
                "https://api.gateio.ws/api/v4/spot/candlesticks?currency_pair={pair}&interval=1d&limit={CANDLE_LIMIT}"
            ),
            Exchange::Bitmart => format!(
                "https://api-cloud.bitmart.com/spot/quotation/v3/lite-klines?symbol={pair}&step=1440&limit={CANDLE_LIMIT}"
            ),
            Exchange::Bingx => format!(
                "https://open-api.bingx.com/openApi/spot/v1/market/kline?symbol={pair}&interval=1d&limit={CANDLE_LIMIT}"
            ),
        }
    }

    /// True when the venue returns candles newest-first and the series must
    /// be reversed into chronological order before the EMA pass.
    fn newest_first(self) -> bool {
        matches!(self, Exchange::Kucoin | Exchange::Bingx)
    }
}

/// Fallback chain per asset. First venue that returns a usable series wins.
pub fn exchanges_for(symbol: &str) -> &'static [Exchange] {
    match symbol {
        "TIG" => &[Exchange::Xt],
        "NATIX" => &[Exchange::Kucoin, Exchange::Gate, Exchange::Mexc],
        "FAI" => &[Exchange::Bitmart, Exchange::Bingx],
        _ => &[Exchange::Binance],
    }
}

pub fn build_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?)
}

/// Fetch daily closes for `base/quote`, walking the asset's fallback chain.
/// Returns the chronological close series and the venue that served it.
pub async fn fetch_closes_routed(
    client: &reqwest::Client,
    base: &str,
    quote: &str,
) -> Result<(Vec<f64>, Exchange)> {
    let chain = exchanges_for(base);
    let mut last_err = None;

    for &exchange in chain {
        match fetch_daily_closes(client, exchange, base, quote).await {
            Ok(closes) if !closes.is_empty() => return Ok((closes, exchange)),
            Ok(_) => {
                warn!(exchange = exchange.id(), "{base}/{quote}: empty candle series");
                last_err = Some(AppError::Exchange(format!(
                    "no data for {base}/{quote} on {}",
                    exchange.id()
                )));
            }
            Err(e) => {
                warn!(exchange = exchange.id(), "{base}/{quote}: fetch failed: {e}");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        AppError::Exchange(format!("no exchange configured for {base}/{quote}"))
    }))
}

/// Fetch up to CANDLE_LIMIT daily closes from one venue, oldest first.
pub async fn fetch_daily_closes(
    client: &reqwest::Client,
    exchange: Exchange,
    base: &str,
    quote: &str,
) -> Result<Vec<f64>> {
    let pair = exchange.format_pair(base, quote);
    let url = exchange.kline_url(&pair);
    debug!(exchange = exchange.id(), %url, "fetching candles");

    let resp: serde_json::Value = client.get(&url).send().await?.json().await?;
    let mut closes = extract_closes(exchange, &resp)?;

    if exchange.newest_first() {
        closes.reverse();
    }
    if closes.len() > CANDLE_LIMIT {
        closes.drain(..closes.len() - CANDLE_LIMIT);
    }
    Ok(closes)
}

/// Pull the close column out of a venue's kline payload. Each venue has its
/// own row shape; a row whose close fails to parse poisons the series.
fn extract_closes(exchange: Exchange, resp: &serde_json::Value) -> Result<Vec<f64>> {
    let rows = match exchange {
        // Top-level array of arrays.
        Exchange::Binance | Exchange::Mexc | Exchange::Gate => resp.as_array(),
        // {"data": [...]} envelope.
        Exchange::Kucoin | Exchange::Bitmart | Exchange::Bingx => {
            resp.get("data").and_then(|d| d.as_array())
        }
        // {"result": [...]} envelope of objects.
        Exchange::Xt => resp.get("result").and_then(|r| r.as_array()),
    };

    let rows = rows.ok_or_else(|| {
        AppError::Exchange(format!(
            "unexpected kline payload from {}: {}",
            exchange.id(),
            truncate(&resp.to_string(), 120)
        ))
    })?;

    let close_of = |row: &serde_json::Value| -> Option<f64> {
        let v = match exchange {
            // [openTime, open, high, low, close, ...]
            Exchange::Binance | Exchange::Mexc => row.get(4)?,
            // [time, open, close, high, low, ...]
            Exchange::Kucoin => row.get(2)?,
            // [time, volume, close, high, low, open, ...]
            Exchange::Gate => row.get(2)?,
            // [time, open, high, low, close, ...]
            Exchange::Bitmart | Exchange::Bingx => row.get(4)?,
            // {"c": "..."} object rows
            Exchange::Xt => row.get("c")?,
        };
        v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok()))
    };

    let mut closes = Vec::with_capacity(rows.len());
    for row in rows {
        match close_of(row) {
            Some(c) => closes.push(c),
            None => {
                return Err(AppError::Exchange(format!(
                    "unparseable candle row from {}",
                    exchange.id()
                )))
            }
        }
    }
    Ok(closes)
}

/// Byte-bounded prefix for log/error text, clamped to a char boundary so
/// multibyte payloads never panic the error path.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn routing_matches_reference_setup() {
        assert_eq!(exchanges_for("BTC"), [Exchange::Binance]);
        assert_eq!(exchanges_for("TIG"), [Exchange::Xt]);
        assert_eq!(
            exchanges_for("NATIX"),
            [Exchange::Kucoin, Exchange::Gate, Exchange::Mexc]
        );
        assert_eq!(exchanges_for("FAI"), [Exchange::Bitmart, Exchange::Bingx]);
    }

    #[test]
    fn pair_formatting_per_venue() {
        assert_eq!(Exchange::Binance.format_pair("BTC", "USDT"), "BTCUSDT");
        assert_eq!(Exchange::Kucoin.format_pair("NATIX", "USDT"), "NATIX-USDT");
        assert_eq!(Exchange::Gate.format_pair("NATIX", "USDT"), "NATIX_USDT");
        assert_eq!(Exchange::Xt.format_pair("TIG", "USDT"), "tig_usdt");
        assert_eq!(Exchange::Bitmart.format_pair("FAI", "USDT"), "FAI_USDT");
        assert_eq!(Exchange::Bingx.format_pair("FAI", "USDT"), "FAI-USDT");
    }

    #[test]
    fn binance_closes_parse_from_string_column() {
        let resp = json!([
            [1700000000000u64, "100.0", "110.0", "90.0", "105.5", "123.4"],
            [1700086400000u64, "105.5", "112.0", "101.0", "108.25", "99.1"]
        ]);
        let closes = extract_closes(Exchange::Binance, &resp).unwrap();
        assert_eq!(closes, vec![105.5, 108.25]);
    }

    #[test]
    fn kucoin_closes_use_data_envelope_and_column_two() {
        let resp = json!({
            "code": "200000",
            "data": [
                ["1700086400", "0.050", "0.052", "0.053", "0.049", "1000", "52"],
                ["1700000000", "0.048", "0.050", "0.051", "0.047", "900", "45"]
            ]
        });
        let closes = extract_closes(Exchange::Kucoin, &resp).unwrap();
        // Extraction order is payload order; caller reverses newest-first venues.
        assert_eq!(closes, vec![0.052, 0.050]);
        assert!(Exchange::Kucoin.newest_first());
    }

    #[test]
    fn xt_closes_come_from_object_rows() {
        let resp = json!({
            "rc": 0,
            "result": [
                {"t": 1700000000000u64, "o": "1.0", "c": "1.1", "h": "1.2", "l": "0.9"},
                {"t": 1700086400000u64, "o": "1.1", "c": 1.25, "h": "1.3", "l": "1.0"}
            ]
        });
        let closes = extract_closes(Exchange::Xt, &resp).unwrap();
        assert_eq!(closes, vec![1.1, 1.25]);
    }

    #[test]
    fn multibyte_payload_error_does_not_split_a_char() {
        // Serialized text longer than the 120-byte cap, all two-byte chars,
        // so the cap lands mid-char unless clamped to a boundary.
        let resp = json!({ "error": "é".repeat(200) });
        match extract_closes(Exchange::Binance, &resp) {
            Err(AppError::Exchange(msg)) => assert!(msg.contains("unexpected kline payload")),
            other => panic!("expected Exchange error, got {other:?}"),
        }
    }

    #[test]
    fn truncate_clamps_to_char_boundaries() {
        assert_eq!(truncate("abcdef", 4), "abcd");
        assert_eq!(truncate("ab", 4), "ab");
        // "éé" is 4 bytes; a 3-byte cap must back off to the first char.
        assert_eq!(truncate("éé", 3), "é");
    }

    #[test]
    fn malformed_payload_is_an_exchange_error() {
        let resp = json!({"error": "rate limited"});
        assert!(matches!(
            extract_closes(Exchange::Binance, &resp),
            Err(AppError::Exchange(_))
        ));
        let bad_row = json!([["t", "o", "h", "l", "not-a-number"]]);
        assert!(matches!(
            extract_closes(Exchange::Binance, &bad_row),
            Err(AppError::Exchange(_))
        ));
    }
}
