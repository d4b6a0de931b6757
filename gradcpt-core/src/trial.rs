use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw capture for one trial window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// True when the trial's image is the no-go category (mountain).
    #[serde(alias = "is_mountain")]
    pub is_target_absent: bool,
    /// Keypress offsets in ms from the start of this trial's window, in capture order.
    #[serde(default, alias = "responses")]
    pub raw_responses: Vec<f64>,
}

impl Trial {
    pub fn new(is_target_absent: bool, raw_responses: Vec<f64>) -> Self {
        Self {
            is_target_absent,
            raw_responses,
        }
    }

    /// A go trial with the given presses.
    pub fn go(raw_responses: Vec<f64>) -> Self {
        Self::new(false, raw_responses)
    }

    /// A no-go trial with the given presses.
    pub fn no_go(raw_responses: Vec<f64>) -> Self {
        Self::new(true, raw_responses)
    }
}

/// Reconciled response for one trial
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum ResponseTime {
    #[default]
    Missing,
    /// Milliseconds from the trial's window start.
    Resolved(f64),
}

impl ResponseTime {
    pub fn value(&self) -> Option<f64> {
        match self {
            ResponseTime::Missing => None,
            ResponseTime::Resolved(ms) => Some(*ms),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ResponseTime::Missing)
    }

    pub fn is_resolved(&self) -> bool {
        !self.is_missing()
    }
}

impl From<Option<f64>> for ResponseTime {
    fn from(value: Option<f64>) -> Self {
        value.map_or(ResponseTime::Missing, ResponseTime::Resolved)
    }
}

impl From<ResponseTime> for Option<f64> {
    fn from(value: ResponseTime) -> Self {
        value.value()
    }
}

impl fmt::Display for ResponseTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseTime::Missing => f.write_str("missing"),
            ResponseTime::Resolved(ms) => write!(f, "{ms:.1} ms"),
        }
    }
}

/// Attentional state of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ZoneLabel {
    OutOfZone = 0,
    InZone = 1,
}

impl ZoneLabel {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl From<ZoneLabel> for u8 {
    fn from(label: ZoneLabel) -> Self {
        label.as_u8()
    }
}

impl TryFrom<u8> for ZoneLabel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ZoneLabel::OutOfZone),
            1 => Ok(ZoneLabel::InZone),
            other => Err(format!("zone label must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for ZoneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A completed recording session, ready for analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Wall-clock session start, seconds since the Unix epoch.
    pub start_timestamp: f64,
    /// Wall-clock session end, seconds since the Unix epoch.
    pub end_timestamp: f64,
    pub trials: Vec<Trial>,
}

impl SessionRecord {
    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_timestamp - self.start_timestamp
    }
}
