use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Image categories shown during a gradCPT session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageCategory {
    /// Frequent go category; the participant presses for these.
    City,
    /// Rare no-go category.
    Mountain,
}

impl ImageCategory {
    pub fn is_target_absent(&self) -> bool {
        matches!(self, ImageCategory::Mountain)
    }

    fn dir_name(&self) -> &'static str {
        match self {
            ImageCategory::City => "city",
            ImageCategory::Mountain => "mountains",
        }
    }

    fn file_stem(&self) -> &'static str {
        match self {
            ImageCategory::City => "city",
            ImageCategory::Mountain => "mountain",
        }
    }
}

impl fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// One image out of a category pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StimulusImage {
    pub category: ImageCategory,
    pub index: usize,
}

impl StimulusImage {
    pub fn new(category: ImageCategory, index: usize) -> Self {
        Self { category, index }
    }

    /// Location of the image relative to the stimulus root, e.g. `city/city_3.jpg`.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(self.category.dir_name());
        path.push(format!("{}_{}.jpg", self.category.file_stem(), self.index));
        path
    }
}
