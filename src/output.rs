use gradcpt_core::{ResponseTime, ZoneLabel};
use std::io::{self, Write};

/// Writes labels one per line, followed by the session timestamps.
pub fn write_results<W: Write>(
    mut writer: W,
    labels: &[ZoneLabel],
    start_timestamp: f64,
    end_timestamp: f64,
) -> io::Result<()> {
    writeln!(writer, "Labels:")?;
    for label in labels {
        writeln!(writer, "{label}")?;
    }
    writeln!(writer, "Start Timestamp: {start_timestamp}")?;
    writeln!(writer, "End Timestamp: {end_timestamp}")?;
    writer.flush()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSummary {
    pub trials: usize,
    pub response_rate: f64,
    pub mean_ms: Option<f64>,
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
}

impl ResponseSummary {
    pub fn from_response_times(response_times: &[ResponseTime]) -> Self {
        let times: Vec<f64> = response_times.iter().filter_map(ResponseTime::value).collect();
        let rate = if response_times.is_empty() {
            0.0
        } else {
            times.len() as f64 / response_times.len() as f64 * 100.0
        };
        let (mean, min, max) = if times.is_empty() {
            (None, None, None)
        } else {
            (
                Some(times.iter().sum::<f64>() / times.len() as f64),
                Some(times.iter().cloned().fold(f64::INFINITY, f64::min)),
                Some(times.iter().cloned().fold(f64::NEG_INFINITY, f64::max)),
            )
        };
        Self {
            trials: response_times.len(),
            response_rate: rate,
            mean_ms: mean,
            min_ms: min,
            max_ms: max,
        }
    }
}
