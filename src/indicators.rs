//! Technical indicators over close-price series
//!
//! Pure functions; each output is aligned to its input, with `None`
//! filling the positions where the window has not yet filled.

use crate::types::OhlcCandle;

/// Extracts the close series from candles
pub fn closes(candles: &[OhlcCandle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Simple moving average over `window` samples
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut result = vec![None; values.len()];
    let mut sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            result[i] = Some(sum / window as f64);
        }
    }

    result
}

/// Exponential moving average, seeded with the SMA of the first window
pub fn ema(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || values.len() < window {
        return vec![None; values.len()];
    }

    let mut result = vec![None; values.len()];
    let alpha = 2.0 / (window as f64 + 1.0);

    let seed: f64 = values[..window].iter().sum::<f64>() / window as f64;
    result[window - 1] = Some(seed);

    let mut prev = seed;
    for i in window..values.len() {
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = Some(prev);
    }

    result
}

/// Relative Strength Index over `period` price changes.
///
/// Uses rolling-mean gains and losses; a window with no losses reads
/// as 100, no gains as 0.
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() <= period {
        return result;
    }

    let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    for i in period..values.len() {
        let window = &deltas[i - period..i];
        let avg_gain: f64 =
            window.iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
        let avg_loss: f64 =
            -window.iter().filter(|d| **d < 0.0).sum::<f64>() / period as f64;

        let value = if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                50.0
            } else {
                100.0
            }
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };
        result[i] = Some(value);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_fills_after_the_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = sma(&values, 3);

        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(2.0));
        assert_eq!(out[4], Some(4.0));
    }

    #[test]
    fn sma_window_longer_than_series_is_all_none() {
        let out = sma(&[1.0, 2.0], 20);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn ema_tracks_recent_values_more_closely_than_sma() {
        let values = [1.0, 1.0, 1.0, 1.0, 10.0];
        let e = ema(&values, 3);
        let s = sma(&values, 3);

        let last_ema = e[4].unwrap();
        let last_sma = s[4].unwrap();
        assert!(last_ema > last_sma);
    }

    #[test]
    fn rsi_of_a_rising_series_is_maximal() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&values, 14);

        assert_eq!(out[13], None);
        assert_eq!(out[14], Some(100.0));
        assert_eq!(*out.last().unwrap(), Some(100.0));
    }

    #[test]
    fn rsi_of_a_falling_series_is_minimal() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let out = rsi(&values, 14);
        assert_eq!(*out.last().unwrap(), Some(0.0));
    }

    #[test]
    fn rsi_of_a_flat_series_is_neutral() {
        let values = vec![100.0; 20];
        let out = rsi(&values, 14);
        assert_eq!(*out.last().unwrap(), Some(50.0));
    }
}
