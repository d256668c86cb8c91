//! Dashboard stylesheet, inlined into the rendered page.

pub const STYLES: &str = r"
* { box-sizing: border-box; margin: 0; padding: 0; }

:root {
    --bg: #0d1117;
    --card: #161b22;
    --border: #30363d;
    --text: #c9d1d9;
    --text-dim: #8b949e;
    --green: #3fb950;
    --red: #f85149;
    --blue: #58a6ff;
    --yellow: #d29922;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: var(--bg);
    color: var(--text);
    padding: 20px 20px 80px;
    min-height: 100vh;
}

.container { max-width: 1100px; margin: 0 auto; }

h1 { font-size: 24px; font-weight: 600; margin-bottom: 24px; }

.section-title {
    font-size: 18px;
    font-weight: 600;
    margin: 24px 0 12px;
    color: var(--blue);
}

.section-divider {
    border: none;
    border-top: 1px solid var(--border);
    margin: 32px 0;
}

.asset-grid {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(320px, 1fr));
    gap: 16px;
}

.asset-card {
    background: var(--card);
    border: 1px solid var(--border);
    border-radius: 8px;
    padding: 16px;
}

.asset-card.uptrend { border-left: 3px solid var(--green); }
.asset-card.downtrend { border-left: 3px solid var(--red); }
.asset-card.error-card { border-left: 3px solid var(--yellow); }

.asset-header {
    display: flex;
    align-items: center;
    gap: 8px;
    margin-bottom: 12px;
}

.asset-symbol { font-size: 16px; font-weight: 600; }

.chain-badge {
    font-size: 11px;
    padding: 2px 8px;
    border-radius: 10px;
    background: var(--border);
    color: var(--text-dim);
    text-transform: lowercase;
}

.quote-row {
    display: flex;
    justify-content: space-between;
    align-items: baseline;
    padding: 6px 0;
    border-top: 1px solid var(--border);
    font-size: 13px;
}

.quote-row:first-of-type { border-top: none; }

.pair-name { color: var(--text-dim); }

.trend-label { font-weight: 600; }
.trend-label.uptrend { color: var(--green); }
.trend-label.downtrend { color: var(--red); }

.price { font-variant-numeric: tabular-nums; }
.price.positive { color: var(--green); }
.price.negative { color: var(--red); }

.ema-values { font-size: 11px; color: var(--text-dim); }

.exchange-tag { font-size: 11px; color: var(--text-dim); }

.derived-tag { font-size: 11px; color: var(--yellow); }

.quote-error { font-size: 12px; color: var(--yellow); }

.empty-section { color: var(--text-dim); font-size: 13px; padding: 8px 0; }

/* Fixed control bar */
.control-bar {
    position: fixed;
    bottom: 0;
    left: 0;
    right: 0;
    background: var(--card);
    border-top: 1px solid var(--border);
    padding: 12px 20px;
    display: flex;
    align-items: center;
    gap: 16px;
}

.refresh-btn {
    background: var(--blue);
    color: #fff;
    border: none;
    padding: 8px 16px;
    border-radius: 6px;
    cursor: pointer;
    font-size: 13px;
    font-weight: 500;
}

.refresh-btn:hover { opacity: 0.9; }
.refresh-btn:disabled { opacity: 0.5; cursor: wait; }

.last-update { font-size: 12px; color: var(--text-dim); }
";
