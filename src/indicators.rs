//! Exponential moving average over daily close series.

/// Incremental EMA with alpha = 2/(period+1), seeded with the first sample.
/// This is the standard recursive form (`adjust=False` in pandas terms), so
/// the final value over a series matches the original analysis exactly.
#[derive(Debug, Clone)]
pub struct Ema {
    value: f64,
    alpha: f64,
    initialized: bool,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            value: 0.0,
            alpha: 2.0 / (period as f64 + 1.0),
            initialized: false,
        }
    }

    pub fn update(&mut self, price: f64) -> f64 {
        if !self.initialized {
            self.value = price;
            self.initialized = true;
        } else {
            self.value = self.value * (1.0 - self.alpha) + price * self.alpha;
        }
        self.value
    }

    pub fn get(&self) -> f64 {
        self.value
    }
}

/// Final EMA value over a close series. Returns None for an empty series.
pub fn ema_last(closes: &[f64], period: usize) -> Option<f64> {
    if closes.is_empty() {
        return None;
    }
    let mut ema = Ema::new(period);
    for &c in closes {
        ema.update(c);
    }
    Some(ema.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_with_first_sample() {
        let mut ema = Ema::new(8);
        assert_eq!(ema.update(42.0), 42.0);
    }

    #[test]
    fn matches_hand_computed_recurrence() {
        // period=3 → alpha=0.5: [2, 4, 8] → 2, 3, 5.5
        let mut ema = Ema::new(3);
        ema.update(2.0);
        assert!((ema.update(4.0) - 3.0).abs() < 1e-12);
        assert!((ema.update(8.0) - 5.5).abs() < 1e-12);
        assert_eq!(ema_last(&[2.0, 4.0, 8.0], 3), Some(5.5));
    }

    #[test]
    fn empty_series_yields_none() {
        assert_eq!(ema_last(&[], 8), None);
    }

    #[test]
    fn fast_ema_tracks_rising_series_more_closely() {
        let closes: Vec<f64> = (1..=50).map(|i| i as f64).collect();
        let fast = ema_last(&closes, 8).unwrap();
        let slow = ema_last(&closes, 20).unwrap();
        assert!(fast > slow, "fast={fast} slow={slow}");
        assert!(fast < 50.0);
    }
}
