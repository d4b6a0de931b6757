//! Response reconciliation.
//!
//! Each trial's capture window overlaps its neighbours in behavioural terms:
//! a slow response to trial `i-1` lands early in trial `i`'s window, and a
//! fast response to trial `i` lands late in it. Reconciliation assigns every
//! captured press to at most one trial and keeps one response time per trial.

use gradcpt_core::{ResponseTime, Trial};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Nominal display duration of one trial.
    pub trial_window_ms: f64,
    /// Presses earlier than this in a window belong to the previous trial.
    pub early_threshold_ms: f64,
    /// Presses later than this in a window belong to the current trial.
    pub late_threshold_ms: f64,
    /// Split point for ambiguous presses between two go trials.
    pub ambiguous_split_ms: f64,
    /// Largest raw offset accepted as a plausible capture.
    pub max_offset_ms: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            trial_window_ms: 800.0,
            early_threshold_ms: 320.0,
            late_threshold_ms: 560.0,
            ambiguous_split_ms: 400.0,
            max_offset_ms: 1600.0,
        }
    }
}

impl ReconcileConfig {
    /// Checks that every duration is finite and non-negative, the window is
    /// non-empty, and the early threshold sits below the late one.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("trial_window_ms", self.trial_window_ms),
            ("early_threshold_ms", self.early_threshold_ms),
            ("late_threshold_ms", self.late_threshold_ms),
            ("ambiguous_split_ms", self.ambiguous_split_ms),
            ("max_offset_ms", self.max_offset_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::invalid_config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.trial_window_ms == 0.0 {
            return Err(AnalysisError::invalid_config("trial_window_ms must be positive"));
        }
        if self.early_threshold_ms >= self.late_threshold_ms {
            return Err(AnalysisError::invalid_config(format!(
                "early_threshold_ms ({}) must be below late_threshold_ms ({})",
                self.early_threshold_ms, self.late_threshold_ms
            )));
        }
        Ok(())
    }
}

/// Pairs per-trial flags with per-trial press lists.
pub fn trials_from_parts(is_target_absent: &[bool], raw_responses: Vec<Vec<f64>>) -> Result<Vec<Trial>> {
    if is_target_absent.len() != raw_responses.len() {
        return Err(AnalysisError::invalid_trial_data(format!(
            "{} target flags but {} response lists",
            is_target_absent.len(),
            raw_responses.len()
        )));
    }
    Ok(is_target_absent
        .iter()
        .zip(raw_responses)
        .map(|(&flag, responses)| Trial::new(flag, responses))
        .collect())
}

fn validate_trials(trials: &[Trial], config: &ReconcileConfig) -> Result<()> {
    if trials.is_empty() {
        return Err(AnalysisError::invalid_trial_data("no trials to reconcile"));
    }
    for (i, trial) in trials.iter().enumerate() {
        for &rt in &trial.raw_responses {
            if !rt.is_finite() {
                return Err(AnalysisError::invalid_trial_data(format!(
                    "trial {i}: non-finite response offset {rt}"
                )));
            }
            if rt < 0.0 {
                return Err(AnalysisError::invalid_trial_data(format!(
                    "trial {i}: negative response offset {rt} ms"
                )));
            }
            if rt > config.max_offset_ms {
                return Err(AnalysisError::invalid_trial_data(format!(
                    "trial {i}: response offset {rt} ms exceeds {} ms",
                    config.max_offset_ms
                )));
            }
        }
    }
    Ok(())
}

fn keep_earliest(slot: &mut Option<f64>, candidate: f64) {
    *slot = Some(slot.map_or(candidate, |current| current.min(candidate)));
}

/// Resolves the raw presses of a complete session into one response time per trial.
///
/// The input is only read; the presses left over after the unambiguous pass
/// live in a private remainder.
pub fn reconcile(trials: &[Trial], config: &ReconcileConfig) -> Result<Vec<ResponseTime>> {
    config.validate()?;
    validate_trials(trials, config)?;

    let window = config.trial_window_ms;
    let mut resolved: Vec<Option<f64>> = vec![None; trials.len()];

    // Nothing precedes the first trial, so its first press stands as is.
    if let Some(&first) = trials[0].raw_responses.first() {
        resolved[0] = Some(first);
    }

    let mut remainder: Vec<Vec<f64>> = vec![Vec::new(); trials.len()];
    for i in 1..trials.len() {
        let previous_is_go = !trials[i - 1].is_target_absent;
        let current_is_go = !trials[i].is_target_absent;
        for &rt in &trials[i].raw_responses {
            if rt < config.early_threshold_ms && previous_is_go {
                keep_earliest(&mut resolved[i - 1], window + rt);
                debug!(trial = i - 1, rt, "early press attributed to previous trial");
            } else if rt > config.late_threshold_ms && current_is_go {
                keep_earliest(&mut resolved[i], rt);
                debug!(trial = i, rt, "late press attributed to current trial");
            } else {
                remainder[i].push(rt);
            }
        }
    }

    let mut dropped = 0usize;
    for i in 1..trials.len() {
        for &rt in &remainder[i] {
            let target = match (resolved[i - 1].is_some(), resolved[i].is_some()) {
                (false, true) => Some((i - 1, window + rt)),
                (true, false) => Some((i, rt)),
                (false, false) => {
                    if trials[i - 1].is_target_absent {
                        Some((i, rt))
                    } else if trials[i].is_target_absent || rt < config.ambiguous_split_ms {
                        Some((i - 1, window + rt))
                    } else {
                        Some((i, rt))
                    }
                }
                (true, true) => None,
            };
            match target {
                Some((trial, value)) => {
                    resolved[trial] = Some(value);
                    debug!(trial, rt, value, "ambiguous press attributed");
                }
                None => {
                    dropped += 1;
                    debug!(trial = i, rt, "press dropped, both neighbours resolved");
                }
            }
        }
    }

    let response_times: Vec<ResponseTime> = resolved.into_iter().map(ResponseTime::from).collect();
    info!(
        trials = response_times.len(),
        resolved = response_times.iter().filter(|rt| rt.is_resolved()).count(),
        dropped,
        "responses reconciled"
    );
    Ok(response_times)
}
