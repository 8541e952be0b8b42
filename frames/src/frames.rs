use std::time::{Duration, Instant};

use anyhow::Result;
use log::info;

use crate::{FrameCallback, FrameClock, FrameHandle, RefreshScheduler, TimerFrames};

/// The refresh source of a host: vsync aligned if available, a fixed interval timer otherwise.
#[derive(Debug)]
pub enum Frames {
    Vsync(FrameClock),
    Timer(TimerFrames),
}

impl Frames {
    pub fn new(vsync_available: bool) -> Self {
        if vsync_available {
            Self::Vsync(FrameClock::new())
        } else {
            info!("No vsync available, falling back to timer driven frames");
            Self::Timer(TimerFrames::new())
        }
    }

    pub fn timer(interval: Duration) -> Self {
        Self::Timer(TimerFrames::with_interval(interval))
    }

    /// Run the callbacks that are due at `now`.
    ///
    /// For vsync, the host calls this when a frame is presented. For the timer, it should be called
    /// when [`Self::next_deadline`] passed.
    pub fn run(&self, now: Instant) -> Result<usize> {
        match self {
            Frames::Vsync(clock) => clock.frame(now),
            Frames::Timer(timer) => timer.fire_due(now),
        }
    }

    /// The time the timer fallback wants to be woken up at. Always `None` for vsync.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self {
            Frames::Vsync(_) => None,
            Frames::Timer(timer) => timer.next_deadline(),
        }
    }

    /// `true` if no callback is waiting.
    pub fn is_idle(&self) -> bool {
        match self {
            Frames::Vsync(clock) => !clock.wants_frame(),
            Frames::Timer(timer) => timer.next_deadline().is_none(),
        }
    }
}

impl RefreshScheduler for Frames {
    fn schedule(&self, callback: FrameCallback) -> FrameHandle {
        match self {
            Frames::Vsync(clock) => clock.schedule(callback),
            Frames::Timer(timer) => timer.schedule(callback),
        }
    }

    fn cancel(&self, handle: FrameHandle) -> bool {
        match self {
            Frames::Vsync(clock) => clock.cancel(handle),
            Frames::Timer(timer) => timer.cancel(handle),
        }
    }
}
