//! Response-time reconciliation and zone labelling for gradCPT sessions.
//!
//! [`reconcile`] turns raw per-window keypresses into one [`ResponseTime`]
//! per trial; [`label`] turns those into per-trial [`ZoneLabel`]s.
//!
//! [`ResponseTime`]: gradcpt_core::ResponseTime
//! [`ZoneLabel`]: gradcpt_core::ZoneLabel

pub mod error;
pub mod features;
pub mod label;
pub mod reconcile;
pub mod signal;

pub use error::{AnalysisError, FeatureError};
pub use features::{FeatureConfig, WindowFeatures, extract_features, stack_windows};
pub use label::{LabelConfig, deviation_course, label, smoothed_course};
pub use reconcile::{ReconcileConfig, reconcile, trials_from_parts};
