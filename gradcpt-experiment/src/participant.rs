use super::config::SessionConfig;
use super::error::ExperimentError;
use super::recorder::SessionRecorder;
use gradcpt_core::{ImageCategory, SessionRecord};
use gradcpt_timing::{ManualTimer, Timer};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Synthetic responder for running sessions without a display.
///
/// Response times are measured from the start of the trial's window, so a
/// slow response to one trial shows up early in the next window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedParticipant {
    pub mean_rt_ms: f64,
    /// Half-width of the uniform spread around `mean_rt_ms`.
    pub rt_jitter_ms: f64,
    /// Chance of not pressing for a city image.
    pub omission_rate: f64,
    /// Chance of pressing for a mountain image.
    pub commission_rate: f64,
}

impl Default for SimulatedParticipant {
    fn default() -> Self {
        Self {
            mean_rt_ms: 700.0,
            rt_jitter_ms: 250.0,
            omission_rate: 0.05,
            commission_rate: 0.1,
        }
    }
}

impl SimulatedParticipant {
    fn validate(&self) -> Result<(), ExperimentError> {
        for (name, rate) in [
            ("omission_rate", self.omission_rate),
            ("commission_rate", self.commission_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ExperimentError::InvalidParticipant(format!(
                    "{name} must lie in [0, 1], got {rate}"
                )));
            }
        }
        if !self.mean_rt_ms.is_finite() || !(self.rt_jitter_ms.is_finite() && self.rt_jitter_ms >= 0.0) {
            return Err(ExperimentError::InvalidParticipant(format!(
                "response time {} ms +/- {} ms is not usable",
                self.mean_rt_ms, self.rt_jitter_ms
            )));
        }
        Ok(())
    }

    /// Response time for one trial, or `None` when the participant holds back.
    pub fn respond<R: Rng + ?Sized>(&self, category: ImageCategory, rng: &mut R) -> Option<f64> {
        let presses = match category {
            ImageCategory::City => !rng.random_bool(self.omission_rate),
            ImageCategory::Mountain => rng.random_bool(self.commission_rate),
        };
        presses.then(|| {
            let jitter = rng.random_range(-self.rt_jitter_ms..=self.rt_jitter_ms);
            (self.mean_rt_ms + jitter).max(0.0)
        })
    }

    /// Runs a full session against a manual clock.
    ///
    /// `schedule_rng` drives the image sequence and `rng` the responses.
    /// Presses that would fall after the final window are lost, as they
    /// would be when the display closes.
    pub fn run_session<S: Rng, R: Rng + ?Sized>(
        &self,
        config: &SessionConfig,
        schedule_rng: S,
        rng: &mut R,
    ) -> Result<SessionRecord, ExperimentError> {
        self.run_session_with(ManualTimer::new(), config, schedule_rng, rng)
    }

    /// Runs a full session on `timer`, sleeping until each press is due.
    ///
    /// With a wall-clock timer the session takes as long as a real one.
    pub fn run_session_with<T: Timer, S: Rng, R: Rng + ?Sized>(
        &self,
        timer: T,
        config: &SessionConfig,
        schedule_rng: S,
        rng: &mut R,
    ) -> Result<SessionRecord, ExperimentError> {
        self.validate()?;
        let mut recorder = SessionRecorder::new(config.clone(), timer.clone(), schedule_rng)?;
        let window_ns = config.trial_window().as_nanos() as u64;

        recorder.start()?;
        let mut pending: Vec<u64> = Vec::new();
        for _ in 0..config.trial_count {
            let cue = recorder.begin_trial()?;
            let window_start = timer.now();
            if let Some(rt_ms) = self.respond(cue.to.category, rng) {
                pending.push(window_start + Duration::from_secs_f64(rt_ms / 1000.0).as_nanos() as u64);
                pending.sort_unstable();
            }

            let window_end = window_start + window_ns;
            while let Some(&at) = pending.first() {
                if at >= window_end {
                    break;
                }
                let now = timer.now();
                if at > now {
                    timer.sleep(Duration::from_nanos(at - now));
                }
                recorder.record_press()?;
                pending.remove(0);
            }
            recorder.wait_out_window()?;
            recorder.end_trial()?;
        }
        recorder.finish()
    }
}
