use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// FrameClock provides the frame timestamps (ms) the race loop runs on.
pub trait FrameClock {
    /// now_ms returns the current clock time without waiting.
    fn now_ms(&self) -> f64;
    /// next_frame waits until the next frame is due and returns its timestamp.
    fn next_frame(&mut self) -> f64;
}

/// RealtimeClock paces the frames in wall clock time.
#[derive(Debug)]
pub struct RealtimeClock {
    t_origin: Instant,
    frame_duration_ms: f64,
    t_last_frame: Option<Instant>,
}

impl RealtimeClock {
    pub fn new(frame_duration_ms: f64) -> RealtimeClock {
        RealtimeClock {
            t_origin: Instant::now(),
            frame_duration_ms,
            t_last_frame: None,
        }
    }
}

impl FrameClock for RealtimeClock {
    fn now_ms(&self) -> f64 {
        self.t_origin.elapsed().as_secs_f64() * 1000.0
    }

    fn next_frame(&mut self) -> f64 {
        if let Some(t_last) = self.t_last_frame {
            // sleep until the frame is finished in real time as well
            let t_sleep = self.frame_duration_ms - t_last.elapsed().as_secs_f64() * 1000.0;

            if t_sleep > 0.0 {
                sleep(Duration::from_secs_f64(t_sleep / 1000.0));
            } else {
                log::warn!("Could not keep up with real-time!");
            }
        }

        self.t_last_frame = Some(Instant::now());
        self.now_ms()
    }
}

/// FixedStepClock advances by a constant step on every frame and never sleeps. Used for instant
/// simulation and in tests.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    t_now: f64,
    step_ms: f64,
}

impl FixedStepClock {
    pub fn new(step_ms: f64) -> FixedStepClock {
        FixedStepClock {
            t_now: 0.0,
            step_ms,
        }
    }
}

impl FrameClock for FixedStepClock {
    fn now_ms(&self) -> f64 {
        self.t_now
    }

    fn next_frame(&mut self) -> f64 {
        self.t_now += self.step_ms;
        self.t_now
    }
}

/// CancelToken is a shared flag to stop a running race loop from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
