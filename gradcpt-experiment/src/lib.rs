pub mod config;
pub mod error;
pub mod participant;
pub mod recorder;
pub mod schedule;
pub use config::SessionConfig;
pub use error::ExperimentError;
pub use participant::SimulatedParticipant;
pub use recorder::{RecorderState, SessionRecorder, TrialCue};
pub use schedule::ImageSchedule;
