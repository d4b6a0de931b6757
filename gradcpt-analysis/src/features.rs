//! Per-window features of a single EEG band-power channel.
//!
//! Windows are one trial long (0.8 s at 256 Hz by default) so that feature
//! rows line up with zone labels.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FeatureError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub sample_rate_hz: f64,
    pub window_secs: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 256.0,
            window_secs: 0.8,
        }
    }
}

impl FeatureConfig {
    pub fn window_samples(&self) -> Result<usize, FeatureError> {
        for (name, value) in [
            ("sample_rate_hz", self.sample_rate_hz),
            ("window_secs", self.window_secs),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FeatureError::InvalidConfig {
                    reason: format!("{name} must be positive, got {value}"),
                });
            }
        }
        let samples = (self.window_secs * self.sample_rate_hz) as usize;
        if samples < 2 {
            return Err(FeatureError::WindowTooShort { samples });
        }
        Ok(samples)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowFeatures {
    pub approx_entropy: f64,
    pub total_variation: f64,
    pub std_dev: f64,
    pub energy: f64,
    pub skewness: f64,
}

impl WindowFeatures {
    pub const COUNT: usize = 5;

    pub fn to_array(&self) -> [f64; Self::COUNT] {
        [
            self.approx_entropy,
            self.total_variation,
            self.std_dev,
            self.energy,
            self.skewness,
        ]
    }

    fn compute(window: &[f64]) -> Self {
        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let m2 = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let m3 = window.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / n;
        Self {
            approx_entropy: approx_entropy(window),
            total_variation: gradient(window).iter().sum(),
            std_dev: m2.sqrt(),
            energy: window.iter().map(|x| x * x).sum(),
            skewness: if m2 > 0.0 { m3 / m2.powf(1.5) } else { 0.0 },
        }
    }
}

/// Log of the mean exponentiated absolute lag difference over lags 0 and 1.
fn approx_entropy(window: &[f64]) -> f64 {
    let phi: f64 = (0..2usize)
        .map(|lag| {
            let terms = window.len() - lag;
            (0..terms)
                .map(|j| (window[j] - window[j + lag]).abs().exp())
                .sum::<f64>()
                / terms as f64
        })
        .sum::<f64>()
        / 2.0;
    phi.ln()
}

/// Central differences inside, one-sided differences at the ends.
fn gradient(window: &[f64]) -> Vec<f64> {
    let n = window.len();
    (0..n)
        .map(|i| match i {
            0 => window[1] - window[0],
            i if i == n - 1 => window[n - 1] - window[n - 2],
            i => (window[i + 1] - window[i - 1]) / 2.0,
        })
        .collect()
}

/// Splits `samples` into consecutive windows and computes features for each.
///
/// A trailing window shorter than the configured length is dropped.
pub fn extract_features(samples: &[f64], config: &FeatureConfig) -> Result<Vec<WindowFeatures>, FeatureError> {
    let size = config.window_samples()?;
    let rows: Vec<WindowFeatures> = samples.chunks_exact(size).map(WindowFeatures::compute).collect();
    debug!(
        samples = samples.len(),
        window = size,
        windows = rows.len(),
        "features extracted"
    );
    Ok(rows)
}

/// Appends the previous `lags` windows to each row.
///
/// Each output row is the current window's features followed, feature by
/// feature, by that feature's values in the `lags` preceding windows (oldest
/// first). Windows before the start of the recording count as zeros.
pub fn stack_windows(rows: &[WindowFeatures], lags: usize) -> Vec<Vec<f64>> {
    let zero = [0.0; WindowFeatures::COUNT];
    (0..rows.len())
        .map(|i| {
            let history: Vec<[f64; WindowFeatures::COUNT]> = (0..lags)
                .map(|back| {
                    let offset = lags - back;
                    i.checked_sub(offset).map_or(zero, |j| rows[j].to_array())
                })
                .collect();
            let mut stacked = Vec::with_capacity(WindowFeatures::COUNT * (lags + 1));
            stacked.extend(rows[i].to_array());
            for feature in 0..WindowFeatures::COUNT {
                stacked.extend(history.iter().map(|h| h[feature]));
            }
            stacked
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_window_is_one_trial() {
        assert_eq!(FeatureConfig::default().window_samples().unwrap(), 204);
    }

    #[test]
    fn degenerate_windows_are_rejected() {
        let short = FeatureConfig {
            sample_rate_hz: 1.0,
            window_secs: 1.5,
        };
        assert_eq!(
            short.window_samples(),
            Err(FeatureError::WindowTooShort { samples: 1 })
        );
        let negative = FeatureConfig {
            sample_rate_hz: -256.0,
            window_secs: 0.8,
        };
        assert!(matches!(
            negative.window_samples(),
            Err(FeatureError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn trailing_partial_window_is_dropped() {
        let config = FeatureConfig {
            sample_rate_hz: 4.0,
            window_secs: 1.0,
        };
        let samples: Vec<f64> = (0..10).map(f64::from).collect();
        assert_eq!(extract_features(&samples, &config).unwrap().len(), 2);
    }

    #[test]
    fn window_features_match_hand_computation() {
        let f = WindowFeatures::compute(&[1.0, 2.0, 4.0, 7.0]);
        // gradient: [1, 1.5, 2.5, 3]
        assert!(close(f.total_variation, 8.0));
        assert!(close(f.energy, 70.0));
        // mean 3.5, deviations -2.5 -1.5 0.5 3.5
        assert!(close(f.std_dev, (21.0f64 / 4.0).sqrt()));
        let m3 = (-15.625 - 3.375 + 0.125 + 42.875) / 4.0;
        assert!(close(f.skewness, m3 / (21.0f64 / 4.0).powf(1.5)));
        // lag 0 contributes exp(0) = 1; lag 1 diffs are 1, 2, 3
        let lag1 = (1f64.exp() + 2f64.exp() + 3f64.exp()) / 3.0;
        assert!(close(f.approx_entropy, ((1.0 + lag1) / 2.0).ln()));
    }

    #[test]
    fn flat_window_has_zero_skew_and_entropy() {
        let f = WindowFeatures::compute(&[2.0; 8]);
        assert_eq!(f.skewness, 0.0);
        assert!(close(f.approx_entropy, 0.0));
        assert!(close(f.total_variation, 0.0));
    }

    #[test]
    fn stacked_rows_are_feature_major_and_zero_padded() {
        let row = |v: f64| WindowFeatures {
            approx_entropy: v,
            total_variation: v + 0.1,
            std_dev: v + 0.2,
            energy: v + 0.3,
            skewness: v + 0.4,
        };
        let rows = vec![row(1.0), row(2.0), row(3.0)];
        let stacked = stack_windows(&rows, 2);
        assert_eq!(stacked.len(), 3);
        assert!(stacked.iter().all(|r| r.len() == 15));

        // Row 0 has only padding behind it.
        assert!(stacked[0][5..].iter().all(|v| *v == 0.0));
        // Row 2 carries windows 0 and 1, one feature at a time.
        assert_eq!(stacked[2][..5], row(3.0).to_array());
        assert_eq!(stacked[2][5..7], [1.0, 2.0]);
        assert_eq!(
            stacked[2][7..9],
            [rows[0].total_variation, rows[1].total_variation]
        );
        // Row 1: one padded window, then window 0.
        assert_eq!(stacked[1][5..7], [0.0, 1.0]);
    }
}
