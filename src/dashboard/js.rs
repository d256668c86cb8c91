//! Client-side refresh control.
//!
//! Two states: Idle and Refreshing. Activation disables the button and calls
//! /update with caching bypassed; a 2xx response navigates to a cache-busted
//! page URL, anything else alerts and returns the control to Idle. A second
//! click while refreshing is prevented by the disabled state.

pub const SCRIPT: &str = r#"
const REFRESH_TIMEOUT_MS = 30000;
const IDLE_LABEL = 'Refresh Data';
const BUSY_LABEL = 'Refreshing...';

async function refreshData() {
    const btn = document.getElementById('refreshBtn');
    if (btn.disabled) return;

    btn.disabled = true;
    btn.textContent = BUSY_LABEL;

    const controller = new AbortController();
    const deadline = setTimeout(() => controller.abort(), REFRESH_TIMEOUT_MS);

    try {
        const res = await fetch('/update', {
            cache: 'no-store',
            signal: controller.signal
        });
        if (!res.ok) {
            throw new Error('refresh failed with status ' + res.status);
        }
        // Full reload with a cache-busting timestamp; this page is discarded.
        window.location.href = '/?refresh=true&t=' + Date.now();
    } catch (e) {
        alert('Refresh failed: ' + (e && e.message ? e.message : e));
        btn.textContent = IDLE_LABEL;
        btn.disabled = false;
    } finally {
        clearTimeout(deadline);
    }
}
"#;
