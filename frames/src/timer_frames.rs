//! Timer based refresh for hosts that can not deliver display refresh callbacks.

use std::{
    cell::RefCell,
    collections::VecDeque,
    fmt,
    time::{Duration, Instant},
};

use anyhow::Result;

use crate::{FrameCallback, FrameHandle, Handles, RefreshScheduler, run_callback};

/// The refresh interval used when no vsync aligned callbacks are available.
pub const FALLBACK_FRAME_INTERVAL: Duration = Duration::from_millis(25);

/// A deadline queue that emulates display refreshes with a fixed interval.
///
/// It does not own a thread or a runtime. The event loop asks for [`TimerFrames::next_deadline`],
/// waits until then, and calls [`TimerFrames::fire_due`].
pub struct TimerFrames {
    interval: Duration,
    timers: RefCell<Timers>,
}

#[derive(Default)]
struct Timers {
    handles: Handles,
    pending: Vec<Timer>,
    /// Due timers of the current [`TimerFrames::fire_due`] call, earliest first.
    firing: VecDeque<Timer>,
}

struct Timer {
    handle: FrameHandle,
    deadline: Instant,
    callback: FrameCallback,
}

impl fmt::Debug for TimerFrames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerFrames")
            .field("interval", &self.interval)
            .field("pending", &self.timers.borrow().pending.len())
            .finish()
    }
}

impl Default for TimerFrames {
    fn default() -> Self {
        Self::with_interval(FALLBACK_FRAME_INTERVAL)
    }
}

impl TimerFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            timers: Default::default(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The earliest deadline of all pending callbacks.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.borrow().pending.iter().map(|t| t.deadline).min()
    }

    /// Fire all callbacks whose deadline is at or before `now`, earliest first.
    ///
    /// Callbacks scheduled while firing are not considered before the next call.
    pub fn fire_due(&self, now: Instant) -> Result<usize> {
        {
            let mut timers = self.timers.borrow_mut();
            let (mut due, pending) = timers
                .pending
                .drain(..)
                .partition::<Vec<_>, _>(|t| t.deadline <= now);
            timers.pending = pending;
            due.sort_by_key(|t| t.deadline);
            timers.firing.extend(due);
        }

        let mut fired = 0;
        let mut result = Ok(());
        loop {
            // Popped one at a time, a callback may cancel the ones that follow.
            let next = self.timers.borrow_mut().firing.pop_front();
            let Some(timer) = next else {
                break;
            };
            fired += 1;
            run_callback(timer.handle, timer.callback, now, &mut result);
        }
        result.map(|()| fired)
    }
}

impl RefreshScheduler for TimerFrames {
    fn schedule(&self, callback: FrameCallback) -> FrameHandle {
        let mut timers = self.timers.borrow_mut();
        let handle = timers.handles.next();
        timers.pending.push(Timer {
            handle,
            deadline: Instant::now() + self.interval,
            callback,
        });
        handle
    }

    fn cancel(&self, handle: FrameHandle) -> bool {
        let mut timers = self.timers.borrow_mut();
        let before = timers.pending.len() + timers.firing.len();
        timers.pending.retain(|t| t.handle != handle);
        timers.firing.retain(|t| t.handle != handle);
        timers.pending.len() + timers.firing.len() != before
    }
}
