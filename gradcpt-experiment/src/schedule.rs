use gradcpt_core::{ImageCategory, StimulusImage};
use rand::Rng;

use crate::config::SessionConfig;
use crate::error::ExperimentError;

/// Draws the city/mountain image sequence.
///
/// Mountains never follow mountains, and the same image never shows twice
/// in a row.
#[derive(Debug, Clone)]
pub struct ImageSchedule {
    city_pool: usize,
    mountain_pool: usize,
    target_freq: f64,
    last: Option<StimulusImage>,
}

impl ImageSchedule {
    pub fn new(city_pool: usize, mountain_pool: usize, target_freq: f64) -> Result<Self, ExperimentError> {
        if !(0.0..=1.0).contains(&target_freq) {
            return Err(ExperimentError::InvalidTargetFrequency(target_freq));
        }
        for (category, size) in [
            (ImageCategory::City, city_pool),
            (ImageCategory::Mountain, mountain_pool),
        ] {
            if size < 2 {
                return Err(ExperimentError::PoolTooSmall { category, size });
            }
        }
        Ok(Self {
            city_pool,
            mountain_pool,
            target_freq,
            last: None,
        })
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self, ExperimentError> {
        Self::new(config.city_images, config.mountain_images, config.target_freq)
    }

    pub fn last(&self) -> Option<StimulusImage> {
        self.last
    }

    pub fn next_image<R: Rng + ?Sized>(&mut self, rng: &mut R) -> StimulusImage {
        let after_mountain = self
            .last
            .is_some_and(|image| image.category == ImageCategory::Mountain);
        let category = if rng.random::<f64>() < self.target_freq || after_mountain {
            ImageCategory::City
        } else {
            ImageCategory::Mountain
        };
        let pool = match category {
            ImageCategory::City => self.city_pool,
            ImageCategory::Mountain => self.mountain_pool,
        };

        let mut image = StimulusImage::new(category, rng.random_range(0..pool));
        while Some(image) == self.last {
            image.index = rng.random_range(0..pool);
        }
        self.last = Some(image);
        image
    }
}
