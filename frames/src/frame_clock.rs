use std::{cell::RefCell, collections::VecDeque, fmt, mem, time::Instant};

use anyhow::Result;

use crate::{FrameCallback, FrameHandle, Handles, RefreshScheduler, run_callback};

/// Refresh callbacks driven by the host's presentation cadence (vsync).
///
/// The host calls [`FrameClock::frame`] once per presented frame, for example when winit reports
/// `RedrawRequested`. Callbacks that get scheduled while a frame runs are deferred to the next
/// one.
#[derive(Default)]
pub struct FrameClock {
    queue: RefCell<Queue>,
}

#[derive(Default)]
struct Queue {
    handles: Handles,
    /// Waiting for the next frame.
    scheduled: Vec<(FrameHandle, FrameCallback)>,
    /// Taken from `scheduled` at the beginning of the current frame.
    firing: VecDeque<(FrameHandle, FrameCallback)>,
}

impl fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("FrameClock")
            .field("scheduled", &queue.scheduled.len())
            .field("firing", &queue.firing.len())
            .finish()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if callbacks are waiting for the next frame. Hosts use this to decide if a redraw
    /// must be requested.
    pub fn wants_frame(&self) -> bool {
        !self.queue.borrow().scheduled.is_empty()
    }

    /// Run all callbacks that were scheduled before this call.
    ///
    /// Returns the number of callbacks invoked, or the first error a callback returned. All
    /// callbacks run even if one of them fails.
    pub fn frame(&self, instant: Instant) -> Result<usize> {
        {
            let mut queue = self.queue.borrow_mut();
            let scheduled = mem::take(&mut queue.scheduled);
            queue.firing.extend(scheduled);
        }

        let mut fired = 0;
        let mut result = Ok(());
        loop {
            // The borrow must end before the callback runs, it may schedule again.
            let next = self.queue.borrow_mut().firing.pop_front();
            let Some((handle, callback)) = next else {
                break;
            };
            fired += 1;
            run_callback(handle, callback, instant, &mut result);
        }

        result.map(|()| fired)
    }
}

impl RefreshScheduler for FrameClock {
    fn schedule(&self, callback: FrameCallback) -> FrameHandle {
        let mut queue = self.queue.borrow_mut();
        let handle = queue.handles.next();
        queue.scheduled.push((handle, callback));
        handle
    }

    fn cancel(&self, handle: FrameHandle) -> bool {
        let mut queue = self.queue.borrow_mut();
        let before = queue.scheduled.len() + queue.firing.len();
        queue.scheduled.retain(|(h, _)| *h != handle);
        queue.firing.retain(|(h, _)| *h != handle);
        queue.scheduled.len() + queue.firing.len() != before
    }
}
