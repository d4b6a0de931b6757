use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub trial_count: usize,
    /// Cross-fade duration of one trial.
    pub trial_window_ms: u64,
    /// Probability of drawing a city image when the previous image was not a mountain.
    pub target_freq: f64,
    pub city_images: usize,
    pub mountain_images: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            trial_count: 50,
            trial_window_ms: 800,
            target_freq: 0.9,
            city_images: 10,
            mountain_images: 10,
        }
    }
}

impl SessionConfig {
    /// Short run used while developing the presentation loop.
    pub fn development() -> Self {
        Self {
            trial_count: 10,
            ..Self::default()
        }
    }

    pub fn trial_window(&self) -> Duration {
        Duration::from_millis(self.trial_window_ms)
    }
}
