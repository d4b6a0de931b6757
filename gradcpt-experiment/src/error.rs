use gradcpt_core::ImageCategory;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExperimentError {
    #[error("{category} pool has {size} images, need at least 2 to avoid repeats")]
    PoolTooSmall { category: ImageCategory, size: usize },

    #[error("target frequency must lie in [0, 1], got {0}")]
    InvalidTargetFrequency(f64),

    #[error("session has not been started")]
    NotStarted,

    #[error("session was already started")]
    AlreadyStarted,

    #[error("session is finished")]
    Finished,

    #[error("trial {0} is still open")]
    TrialOpen(usize),

    #[error("no trial is open")]
    NoOpenTrial,

    #[error("all {0} trials have been recorded")]
    TrialLimitReached(usize),

    #[error("session incomplete: {recorded} of {expected} trials recorded")]
    Incomplete { recorded: usize, expected: usize },

    #[error("invalid participant parameter: {0}")]
    InvalidParticipant(String),
}
