use super::config::SessionConfig;
use super::error::ExperimentError;
use super::schedule::ImageSchedule;
use gradcpt_core::{SessionRecord, StimulusImage, Trial};
use gradcpt_timing::Timer;
use rand::Rng;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecorderState {
    Idle,
    Running,
    Finished,
}

/// What the presentation loop should cross-fade for one trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialCue {
    pub trial: usize,
    pub from: StimulusImage,
    pub to: StimulusImage,
}

impl TrialCue {
    pub fn is_target_absent(&self) -> bool {
        self.to.category.is_target_absent()
    }
}

#[derive(Debug, Clone)]
struct OpenTrial {
    id: usize,
    image: StimulusImage,
    window_start_ns: u64,
    responses: Vec<f64>,
}

/// Collects per-trial keypress offsets for one gradCPT session.
///
/// The presentation loop owns the display; it tells the recorder when a trial
/// window opens and closes and when the response key goes down. Time comes
/// from the injected timer, never from global state. The trial list is only
/// handed out once the session is complete.
pub struct SessionRecorder<T, R>
where
    T: Timer,
    R: Rng,
{
    timer: T,
    rng: R,
    config: SessionConfig,
    schedule: ImageSchedule,
    state: RecorderState,
    current_image: Option<StimulusImage>,
    open: Option<OpenTrial>,
    trials: Vec<Trial>,
    start_timestamp: f64,
}

fn wall_clock_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

impl<T, R> SessionRecorder<T, R>
where
    T: Timer,
    R: Rng,
{
    pub fn new(config: SessionConfig, timer: T, rng: R) -> Result<Self, ExperimentError> {
        let schedule = ImageSchedule::from_config(&config)?;
        Ok(Self {
            timer,
            rng,
            trials: Vec::with_capacity(config.trial_count),
            config,
            schedule,
            state: RecorderState::Idle,
            current_image: None,
            open: None,
            start_timestamp: 0.0,
        })
    }

    /// Marks the session start and draws the image the first trial fades out of.
    pub fn start(&mut self) -> Result<StimulusImage, ExperimentError> {
        match self.state {
            RecorderState::Idle => {}
            RecorderState::Running => return Err(ExperimentError::AlreadyStarted),
            RecorderState::Finished => return Err(ExperimentError::Finished),
        }
        let first = self.schedule.next_image(&mut self.rng);
        self.current_image = Some(first);
        self.start_timestamp = wall_clock_secs();
        self.state = RecorderState::Running;
        info!(
            trials = self.config.trial_count,
            window_ms = self.config.trial_window_ms,
            "session started"
        );
        Ok(first)
    }

    fn ensure_running(&self) -> Result<(), ExperimentError> {
        match self.state {
            RecorderState::Running => Ok(()),
            RecorderState::Idle => Err(ExperimentError::NotStarted),
            RecorderState::Finished => Err(ExperimentError::Finished),
        }
    }

    /// Opens the next trial window; its category is that of the incoming image.
    pub fn begin_trial(&mut self) -> Result<TrialCue, ExperimentError> {
        self.ensure_running()?;
        if let Some(open) = &self.open {
            return Err(ExperimentError::TrialOpen(open.id));
        }
        if self.trials.len() >= self.config.trial_count {
            return Err(ExperimentError::TrialLimitReached(self.config.trial_count));
        }
        let from = self.current_image.ok_or(ExperimentError::NotStarted)?;
        let to = self.schedule.next_image(&mut self.rng);
        let cue = TrialCue {
            trial: self.trials.len(),
            from,
            to,
        };
        let now_ns = self.timer.now();
        self.open = Some(OpenTrial {
            id: cue.trial,
            image: to,
            window_start_ns: now_ns,
            responses: Vec::new(),
        });
        debug!(
            trial = cue.trial,
            image = %to.relative_path().display(),
            at_ns = now_ns,
            "trial started"
        );
        Ok(cue)
    }

    /// Stores a keypress against the open window; returns its offset in ms.
    pub fn record_press(&mut self) -> Result<f64, ExperimentError> {
        self.ensure_running()?;
        let now_ns = self.timer.now();
        let open = self.open.as_mut().ok_or(ExperimentError::NoOpenTrial)?;
        let offset_ms = now_ns.saturating_sub(open.window_start_ns) as f64 / 1_000_000.0;
        open.responses.push(offset_ms);
        debug!(trial = open.id, offset_ms, "press recorded");
        Ok(offset_ms)
    }

    /// Sleeps out whatever is left of the open trial's window.
    pub fn wait_out_window(&self) -> Result<(), ExperimentError> {
        let open = self.open.as_ref().ok_or(ExperimentError::NoOpenTrial)?;
        let elapsed = self.timer.elapsed(open.window_start_ns);
        let window = self.config.trial_window();
        if elapsed < window {
            self.timer.sleep(window - elapsed);
        }
        Ok(())
    }

    /// Closes the open trial window.
    pub fn end_trial(&mut self) -> Result<(), ExperimentError> {
        self.ensure_running()?;
        let open = self.open.take().ok_or(ExperimentError::NoOpenTrial)?;
        let duration = self.timer.elapsed(open.window_start_ns);
        debug!(
            trial = open.id,
            presses = open.responses.len(),
            duration_ms = duration.as_secs_f64() * 1000.0,
            "trial ended"
        );
        self.current_image = Some(open.image);
        self.trials.push(Trial::new(
            open.image.category.is_target_absent(),
            open.responses,
        ));
        Ok(())
    }

    /// Ends the session and hands over the complete trial list.
    pub fn finish(&mut self) -> Result<SessionRecord, ExperimentError> {
        self.ensure_running()?;
        if let Some(open) = &self.open {
            return Err(ExperimentError::TrialOpen(open.id));
        }
        if self.trials.len() != self.config.trial_count {
            return Err(ExperimentError::Incomplete {
                recorded: self.trials.len(),
                expected: self.config.trial_count,
            });
        }
        self.state = RecorderState::Finished;
        let record = SessionRecord {
            start_timestamp: self.start_timestamp,
            end_timestamp: wall_clock_secs(),
            trials: std::mem::take(&mut self.trials),
        };
        info!(
            trials = record.trial_count(),
            presses = record.trials.iter().map(|t| t.raw_responses.len()).sum::<usize>(),
            "session finished"
        );
        Ok(record)
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// (current trial number, total), 1-based, while the session runs
    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        (self.state == RecorderState::Running)
            .then(|| (self.trials.len() + 1, self.config.trial_count))
    }

    pub fn window_elapsed(&self) -> Option<Duration> {
        self.open
            .as_ref()
            .map(|open| self.timer.elapsed(open.window_start_ns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradcpt_core::ImageCategory;
    use gradcpt_timing::ManualTimer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn recorder(trials: usize) -> (SessionRecorder<ManualTimer, StdRng>, ManualTimer) {
        let config = SessionConfig {
            trial_count: trials,
            ..SessionConfig::default()
        };
        let timer = ManualTimer::new();
        let recorder = SessionRecorder::new(config, timer.clone(), StdRng::seed_from_u64(1)).unwrap();
        (recorder, timer)
    }

    #[test]
    fn presses_are_timed_from_window_start() {
        let (mut rec, timer) = recorder(2);
        rec.start().unwrap();

        let cue = rec.begin_trial().unwrap();
        assert_eq!(cue.trial, 0);
        timer.advance(Duration::from_micros(312_500));
        assert_eq!(rec.record_press().unwrap(), 312.5);
        rec.wait_out_window().unwrap();
        assert_eq!(timer.now(), 800_000_000);
        rec.end_trial().unwrap();

        let second = rec.begin_trial().unwrap();
        assert_eq!(second.from, cue.to);
        timer.advance(Duration::from_millis(90));
        rec.record_press().unwrap();
        timer.advance(Duration::from_millis(600));
        rec.record_press().unwrap();
        rec.wait_out_window().unwrap();
        rec.end_trial().unwrap();

        let record = rec.finish().unwrap();
        assert_eq!(record.trials.len(), 2);
        assert_eq!(record.trials[0].raw_responses, vec![312.5]);
        assert_eq!(record.trials[1].raw_responses, vec![90.0, 690.0]);
        assert_eq!(
            record.trials[0].is_target_absent,
            cue.to.category == ImageCategory::Mountain
        );
        assert!(record.end_timestamp >= record.start_timestamp);
        assert_eq!(rec.state(), RecorderState::Finished);
    }

    #[test]
    fn window_clock_runs_only_while_a_trial_is_open() {
        let (mut rec, _timer) = recorder(1);
        assert_eq!(rec.config().trial_count, 1);
        rec.start().unwrap();
        assert_eq!(rec.window_elapsed(), None);

        rec.begin_trial().unwrap();
        rec.timer().advance(Duration::from_millis(250));
        assert_eq!(rec.window_elapsed(), Some(Duration::from_millis(250)));
        rec.wait_out_window().unwrap();
        assert_eq!(rec.window_elapsed(), Some(rec.config().trial_window()));
        rec.end_trial().unwrap();
        assert_eq!(rec.window_elapsed(), None);
    }

    #[test]
    fn misuse_is_reported() {
        let (mut rec, _timer) = recorder(1);
        assert_eq!(rec.begin_trial().unwrap_err(), ExperimentError::NotStarted);
        rec.start().unwrap();
        assert_eq!(rec.start().unwrap_err(), ExperimentError::AlreadyStarted);
        assert_eq!(rec.record_press().unwrap_err(), ExperimentError::NoOpenTrial);
        assert_eq!(rec.end_trial().unwrap_err(), ExperimentError::NoOpenTrial);

        rec.begin_trial().unwrap();
        assert_eq!(rec.begin_trial().unwrap_err(), ExperimentError::TrialOpen(0));
        assert_eq!(rec.finish().unwrap_err(), ExperimentError::TrialOpen(0));
        rec.end_trial().unwrap();
        assert_eq!(
            rec.begin_trial().unwrap_err(),
            ExperimentError::TrialLimitReached(1)
        );
        rec.finish().unwrap();
        assert_eq!(rec.record_press().unwrap_err(), ExperimentError::Finished);
    }

    #[test]
    fn early_finish_is_incomplete() {
        let (mut rec, _timer) = recorder(3);
        rec.start().unwrap();
        rec.begin_trial().unwrap();
        rec.end_trial().unwrap();
        assert_eq!(
            rec.finish().unwrap_err(),
            ExperimentError::Incomplete {
                recorded: 1,
                expected: 3
            }
        );
        assert_eq!(rec.trial_progress(), Some((2, 3)));
    }
}
