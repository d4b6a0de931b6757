pub mod stimulus;
pub mod trial;

pub use stimulus::{ImageCategory, StimulusImage};
pub use trial::{ResponseTime, SessionRecord, Trial, ZoneLabel};
