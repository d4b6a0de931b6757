//! Error types for reconciliation, labelling and feature extraction.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Trial input violates a precondition of reconciliation
    #[error("Invalid trial data: {reason}")]
    InvalidTrialData {
        /// What was wrong with the input
        reason: String,
    },

    /// Response times carry no usable spread for a zone split
    #[error("Insufficient data for zone labelling: {reason}")]
    InsufficientData {
        /// Why the statistics are undefined
        reason: String,
    },

    /// Reconciliation or labelling parameters are out of range
    #[error("Invalid analysis configuration: {reason}")]
    InvalidConfig {
        /// Offending parameter
        reason: String,
    },
}

impl AnalysisError {
    pub(crate) fn invalid_trial_data(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidTrialData {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn insufficient_data(reason: impl Into<String>) -> Self {
        AnalysisError::InsufficientData {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// Window length in samples is too short for gradient and lag features
    #[error("Feature window too short: {samples} samples, need at least 2")]
    WindowTooShort {
        /// Samples per window after rounding down
        samples: usize,
    },

    /// Sample rate or window length is not a positive finite number
    #[error("Invalid feature configuration: {reason}")]
    InvalidConfig {
        /// Offending parameter
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
