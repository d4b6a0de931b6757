use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Clock capability handed to the session loop
pub trait Timer: Clone + Send + Sync {
    /// Nanoseconds since the timer's zero point.
    fn now(&self) -> u64;
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration);
}

#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{CLOCK_MONOTONIC, clock_nanosleep};

        sleep_through_interrupts(to_timespec(duration), |req, rem| unsafe {
            clock_nanosleep(CLOCK_MONOTONIC, 0, req, rem)
        });
    }
}

#[cfg(target_os = "linux")]
fn to_timespec(duration: Duration) -> libc::timespec {
    libc::timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    }
}

/// Re-issues a relative sleep with the remaining time until it is not
/// interrupted by a signal. Returns the final status.
#[cfg(target_os = "linux")]
fn sleep_through_interrupts<F>(mut req: libc::timespec, mut sleep: F) -> libc::c_int
where
    F: FnMut(&libc::timespec, &mut libc::timespec) -> libc::c_int,
{
    loop {
        let mut rem = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        let rc = sleep(&req, &mut rem);
        if rc != libc::EINTR {
            return rc;
        }
        req = rem;
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Timer whose clock only moves when told to.
///
/// Clones share the same clock, so a driver can advance time while a
/// recorder holds its own handle. `sleep` advances the clock instead of
/// blocking, which lets simulated sessions run instantly.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns
            .fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, ns: u64) {
        self.now_ns.store(ns, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn sleep(&self, d: Duration) {
        self.advance(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_timer_clones_share_a_clock() {
        let timer = ManualTimer::new();
        let handle = timer.clone();
        timer.advance(Duration::from_millis(250));
        assert_eq!(handle.now(), 250_000_000);

        handle.sleep(Duration::from_millis(50));
        assert_eq!(timer.now(), 300_000_000);
        assert_eq!(timer.elapsed(100_000_000), Duration::from_millis(200));
    }

    #[test]
    fn elapsed_saturates_for_future_timestamps() {
        let timer = ManualTimer::new();
        timer.set(10);
        assert_eq!(timer.elapsed(1_000), Duration::ZERO);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn interrupted_sleep_resumes_with_the_remainder() {
        let mut requests = Vec::new();
        let rc = sleep_through_interrupts(to_timespec(Duration::from_millis(800)), |req, rem| {
            requests.push((req.tv_sec, req.tv_nsec));
            if requests.len() < 3 {
                *rem = to_timespec(Duration::from_millis(300 / requests.len() as u64));
                libc::EINTR
            } else {
                0
            }
        });
        assert_eq!(rc, 0);
        assert_eq!(
            requests,
            vec![(0, 800_000_000), (0, 300_000_000), (0, 150_000_000)]
        );
    }

    #[test]
    fn high_precision_timer_is_monotonic() {
        let timer = HighPrecisionTimer::new();
        let a = timer.now();
        timer.sleep(Duration::from_millis(2));
        let b = timer.now();
        assert!(b >= a + 1_000_000);
    }
}
