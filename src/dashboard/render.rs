//! Server-side page rendering. Pure functions over an AnalysisSnapshot:
//! the same snapshot always renders to byte-identical markup.
//!
//! Contract: one card per record per section, in collection order, no
//! cross-section mixing. Records with no usable analysis follow the
//! configured missing-data policy (skip, or placeholder card).

use chrono::SecondsFormat;
use tracing::warn;

use crate::config::MissingDataPolicy;
use crate::types::{AnalysisSnapshot, AssetAnalysis, TrendOutcome, TrendStats};

use super::{css, js};

/// Minimal HTML escaping for record-derived text.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Price formatting: more decimals for sub-cent tokens.
fn fmt_price(p: f64) -> String {
    if p >= 1.0 {
        format!("{p:.2}")
    } else if p >= 0.01 {
        format!("{p:.4}")
    } else {
        format!("{p:.8}")
    }
}

fn render_stats_row(stats: &TrendStats) -> String {
    let sign = if stats.current_price >= stats.ema_slow {
        "positive"
    } else {
        "negative"
    };
    let derived = if stats.is_derived {
        r#" <span class="derived-tag">derived</span>"#
    } else {
        ""
    };
    format!(
        concat!(
            r#"<div class="quote-row">"#,
            r#"<span class="pair-name">{pair}</span>"#,
            r#"<span class="trend-label {trend_class}">{trend}</span>"#,
            r#"<span class="price {sign}">{price}</span>"#,
            r#"<span class="ema-values">EMA8 {fast} / EMA20 {slow}</span>"#,
            r#"<span class="exchange-tag">{exchange}</span>{derived}"#,
            "</div>\n"
        ),
        pair = escape_html(&stats.pair),
        trend_class = stats.trend.css_class(),
        trend = stats.trend,
        sign = sign,
        price = fmt_price(stats.current_price),
        fast = fmt_price(stats.ema_fast),
        slow = fmt_price(stats.ema_slow),
        exchange = escape_html(&stats.exchange),
        derived = derived,
    )
}

fn render_quote_row(outcome: &TrendOutcome) -> String {
    match outcome {
        TrendOutcome::Ok(stats) => render_stats_row(stats),
        TrendOutcome::Failed { pair, reason, .. } => format!(
            concat!(
                r#"<div class="quote-row">"#,
                r#"<span class="pair-name">{pair}</span>"#,
                r#"<span class="quote-error">{reason}</span>"#,
                "</div>\n"
            ),
            pair = escape_html(pair),
            reason = escape_html(reason),
        ),
    }
}

/// Card-level trend class: the USDT outcome drives the border color, falling
/// back to the BTC outcome, then to the error styling.
fn card_class(record: &AssetAnalysis) -> &'static str {
    let primary = match &record.usdt {
        TrendOutcome::Ok(stats) => Some(stats.trend),
        TrendOutcome::Failed { .. } => match &record.btc {
            Some(TrendOutcome::Ok(stats)) => Some(stats.trend),
            _ => None,
        },
    };
    match primary {
        Some(trend) => trend.css_class(),
        None => "error-card",
    }
}

/// Render one asset card. Returns None only under the skip policy when the
/// record has no usable outcome on any quote.
pub fn render_card(record: &AssetAnalysis, policy: MissingDataPolicy) -> Option<String> {
    if record.is_empty_failure() && policy == MissingDataPolicy::Skip {
        warn!(symbol = %record.symbol, "skipping record with no usable analysis");
        return None;
    }

    let chain_badge = match &record.chain {
        Some(chain) => format!(r#" <span class="chain-badge">{}</span>"#, escape_html(chain)),
        None => String::new(),
    };

    let mut rows = render_quote_row(&record.usdt);
    if let Some(btc) = &record.btc {
        rows.push_str(&render_quote_row(btc));
    }

    Some(format!(
        concat!(
            r#"<div class="asset-card {class}" data-symbol="{symbol}">"#,
            "\n",
            r#"<div class="asset-header"><span class="asset-symbol">{symbol}</span>{chain}</div>"#,
            "\n{rows}</div>\n"
        ),
        class = card_class(record),
        symbol = escape_html(&record.symbol),
        chain = chain_badge,
        rows = rows,
    ))
}

/// Render one titled section: heading plus one card per record, in input
/// order. An empty collection still renders its heading.
pub fn render_section(
    heading: &str,
    records: &[AssetAnalysis],
    policy: MissingDataPolicy,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<section>\n<h2 class=\"section-title\">{}</h2>\n<div class=\"asset-grid\">\n",
        escape_html(heading)
    ));
    let mut rendered = 0usize;
    for record in records {
        if let Some(card) = render_card(record, policy) {
            out.push_str(&card);
            rendered += 1;
        }
    }
    if rendered == 0 {
        out.push_str("<p class=\"empty-section\">No assets</p>\n");
    }
    out.push_str("</div>\n</section>\n");
    out
}

fn render_control_bar(snapshot: &AnalysisSnapshot) -> String {
    let last_update = match &snapshot.last_update {
        Some(ts) => format!(
            "Last updated: {}",
            ts.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        None => String::new(),
    };
    format!(
        concat!(
            r#"<div class="control-bar">"#,
            "\n",
            r#"<button id="refreshBtn" class="refresh-btn" onclick="refreshData()">Refresh Data</button>"#,
            "\n",
            r#"<span class="last-update" id="lastUpdate">{}</span>"#,
            "\n</div>\n"
        ),
        escape_html(&last_update)
    )
}

/// Render the full document. Pure: identical snapshots give identical bytes.
pub fn render_page(snapshot: &AnalysisSnapshot, policy: MissingDataPolicy) -> String {
    let portfolio = render_section("Portfolio", &snapshot.portfolio, policy);
    let watchlist = render_section("Watch List", &snapshot.watchlist, policy);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Crypto Trend Analysis</title>
<style>
{css}
</style>
</head>
<body>
<div class="container">
<h1>Crypto Trend Analysis</h1>
{portfolio}<hr class="section-divider">
{watchlist}</div>
{control_bar}<script>
{js}
</script>
</body>
</html>
"#,
        css = css::STYLES,
        portfolio = portfolio,
        watchlist = watchlist,
        control_bar = render_control_bar(snapshot),
        js = js::SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Quote, Trend};
    use chrono::{TimeZone, Utc};

    fn ok_record(symbol: &str, trend: Trend) -> AssetAnalysis {
        let (fast, slow) = match trend {
            Trend::Uptrend => (10.0, 9.0),
            Trend::Downtrend => (9.0, 10.0),
        };
        AssetAnalysis {
            symbol: symbol.to_string(),
            chain: Some("base".to_string()),
            usdt: TrendOutcome::Ok(TrendStats {
                pair: format!("{symbol}/USDT"),
                quote: Quote::Usdt,
                current_price: 9.5,
                ema_fast: fast,
                ema_slow: slow,
                trend,
                exchange: "binance".to_string(),
                is_derived: false,
            }),
            btc: None,
        }
    }

    fn failed_record(symbol: &str) -> AssetAnalysis {
        AssetAnalysis {
            symbol: symbol.to_string(),
            chain: None,
            usdt: TrendOutcome::failed(format!("{symbol}/USDT"), "no data"),
            btc: Some(TrendOutcome::failed(format!("{symbol}/BTC"), "no data")),
        }
    }

    fn card_count(markup: &str) -> usize {
        markup.matches("class=\"asset-card").count()
    }

    #[test]
    fn one_card_per_record_in_input_order() {
        let records = vec![
            ok_record("BTC", Trend::Uptrend),
            ok_record("ETH", Trend::Downtrend),
            ok_record("SOL", Trend::Uptrend),
        ];
        let out = render_section("Portfolio", &records, MissingDataPolicy::Skip);
        assert_eq!(card_count(&out), 3);

        let btc = out.find("data-symbol=\"BTC\"").unwrap();
        let eth = out.find("data-symbol=\"ETH\"").unwrap();
        let sol = out.find("data-symbol=\"SOL\"").unwrap();
        assert!(btc < eth && eth < sol);
    }

    #[test]
    fn empty_section_renders_heading_with_zero_cards() {
        let out = render_section("Portfolio", &[], MissingDataPolicy::Skip);
        assert!(out.contains("Portfolio"));
        assert_eq!(card_count(&out), 0);
    }

    #[test]
    fn empty_portfolio_nonempty_watchlist() {
        let snapshot = AnalysisSnapshot {
            portfolio: vec![],
            watchlist: vec![ok_record("TIG", Trend::Uptrend)],
            last_update: None,
        };
        let out = render_page(&snapshot, MissingDataPolicy::Skip);
        assert!(out.contains("Portfolio"));
        assert!(out.contains("Watch List"));
        assert_eq!(card_count(&out), 1);
        assert!(out.contains("data-symbol=\"TIG\""));
    }

    #[test]
    fn rendering_is_deterministic() {
        let snapshot = AnalysisSnapshot {
            portfolio: vec![ok_record("BTC", Trend::Uptrend), failed_record("ETH")],
            watchlist: vec![ok_record("FAI", Trend::Downtrend)],
            last_update: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        };
        let a = render_page(&snapshot, MissingDataPolicy::Placeholder);
        let b = render_page(&snapshot, MissingDataPolicy::Placeholder);
        assert_eq!(a, b);
    }

    #[test]
    fn last_update_text_exact_when_present_absent_when_not() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let with = render_page(
            &AnalysisSnapshot {
                portfolio: vec![],
                watchlist: vec![],
                last_update: Some(ts),
            },
            MissingDataPolicy::Skip,
        );
        assert!(with.contains("Last updated: 2024-01-01T00:00:00Z"));

        let without = render_page(&AnalysisSnapshot::default(), MissingDataPolicy::Skip);
        assert!(!without.contains("Last updated"));
        assert!(without.contains(r#"<span class="last-update" id="lastUpdate"></span>"#));
    }

    #[test]
    fn skip_policy_drops_dead_records_placeholder_keeps_them() {
        let records = vec![ok_record("BTC", Trend::Uptrend), failed_record("XYZ")];

        let skipped = render_section("Watch List", &records, MissingDataPolicy::Skip);
        assert_eq!(card_count(&skipped), 1);
        assert!(!skipped.contains("data-symbol=\"XYZ\""));

        let kept = render_section("Watch List", &records, MissingDataPolicy::Placeholder);
        assert_eq!(card_count(&kept), 2);
        assert!(kept.contains("error-card"));
        assert!(kept.contains("no data"));
    }

    #[test]
    fn partial_failure_still_renders_the_good_quote() {
        let mut record = ok_record("SOL", Trend::Uptrend);
        record.btc = Some(TrendOutcome::failed("SOL/BTC", "venue down"));
        let card = render_card(&record, MissingDataPolicy::Skip).unwrap();
        assert!(card.contains("SOL/USDT"));
        assert!(card.contains("Uptrend"));
        assert!(card.contains("venue down"));
    }

    #[test]
    fn trend_and_sign_css_hooks() {
        let up = render_card(&ok_record("BTC", Trend::Uptrend), MissingDataPolicy::Skip).unwrap();
        assert!(up.contains("asset-card uptrend"));
        // price 9.5 above slow EMA 9.0 → positive
        assert!(up.contains("price positive"));

        let down =
            render_card(&ok_record("ETH", Trend::Downtrend), MissingDataPolicy::Skip).unwrap();
        assert!(down.contains("asset-card downtrend"));
        // price 9.5 below slow EMA 10.0 → negative
        assert!(down.contains("price negative"));
    }

    #[test]
    fn record_text_is_escaped() {
        let mut record = failed_record("<script>");
        record.chain = Some("<img onerror=x>".to_string());
        let card = render_card(&record, MissingDataPolicy::Placeholder).unwrap();
        assert!(!card.contains("<script>"));
        assert!(!card.contains("<img"));
        assert!(card.contains("&lt;script&gt;"));
    }

    #[test]
    fn price_formatting_scales_with_magnitude() {
        assert_eq!(fmt_price(65123.4), "65123.40");
        assert_eq!(fmt_price(1.5), "1.50");
        assert_eq!(fmt_price(0.0512), "0.0512");
        assert_eq!(fmt_price(0.00001234), "0.00001234");
    }
}
