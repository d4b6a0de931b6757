//! Zone labelling from the response-time variance time course (VTC).

use gradcpt_core::{ResponseTime, ZoneLabel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::signal::{fwhm_to_sigma, gaussian_filter, interpolate_gaps, median, nan_mean, nan_std};

/// Relative tolerance under which the response-time spread counts as zero.
const ZERO_SPREAD_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Full width at half maximum of the smoothing kernel, in trials.
    pub fwhm: f64,
    /// Kernel half-width in standard deviations.
    pub truncate: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            fwhm: 9.0,
            truncate: 4.0,
        }
    }
}

impl LabelConfig {
    pub fn sigma(&self) -> f64 {
        fwhm_to_sigma(self.fwhm)
    }

    /// Both kernel parameters must be finite and positive.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("fwhm", self.fwhm), ("truncate", self.truncate)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::invalid_config(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Absolute deviation of each z-scored response time from the z-score mean,
/// with missing trials filled by linear interpolation.
pub fn deviation_course(response_times: &[ResponseTime]) -> Result<Vec<f64>> {
    let values: Vec<Option<f64>> = response_times.iter().map(ResponseTime::value).collect();

    let mean = nan_mean(&values)
        .ok_or_else(|| AnalysisError::insufficient_data("every response time is missing"))?;
    let std = nan_std(&values, mean).unwrap_or(0.0);
    if !std.is_finite() || std <= ZERO_SPREAD_TOLERANCE * mean.abs().max(1.0) {
        return Err(AnalysisError::insufficient_data(format!(
            "response times have no spread (mean {mean:.3} ms, std {std:.3e})"
        )));
    }

    let z: Vec<Option<f64>> = values
        .iter()
        .map(|v| v.map(|v| (v - mean) / std))
        .collect();
    let z_mean = nan_mean(&z).unwrap_or(0.0);
    let deviation: Vec<Option<f64>> = z.iter().map(|v| v.map(|v| (v - z_mean).abs())).collect();

    let filled = interpolate_gaps(&deviation)
        .ok_or_else(|| AnalysisError::insufficient_data("deviation course has no defined entries"))?;
    debug!(
        trials = filled.len(),
        filled = values.iter().filter(|v| v.is_none()).count(),
        mean,
        std,
        "deviation course computed"
    );
    Ok(filled)
}

/// Deviation course after Gaussian smoothing.
pub fn smoothed_course(response_times: &[ResponseTime], config: &LabelConfig) -> Result<Vec<f64>> {
    config.validate()?;
    let deviation = deviation_course(response_times)?;
    Ok(gaussian_filter(&deviation, config.sigma(), config.truncate))
}

/// Labels each trial in the zone when its smoothed deviation is at or below the median.
pub fn label(response_times: &[ResponseTime], config: &LabelConfig) -> Result<Vec<ZoneLabel>> {
    let smoothed = smoothed_course(response_times, config)?;
    let threshold = median(&smoothed)
        .ok_or_else(|| AnalysisError::insufficient_data("no trials to label"))?;

    let labels: Vec<ZoneLabel> = smoothed
        .iter()
        .map(|&v| {
            if v <= threshold {
                ZoneLabel::InZone
            } else {
                ZoneLabel::OutOfZone
            }
        })
        .collect();
    info!(
        trials = labels.len(),
        in_zone = labels.iter().filter(|l| **l == ZoneLabel::InZone).count(),
        threshold,
        "zone labels assigned"
    );
    Ok(labels)
}
