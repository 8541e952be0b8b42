//! Rate limits a callback to the display refresh.
//!
//! [`FrameThrottle::kick`] marks work as pending and makes sure a tick is scheduled. A tick that
//! finds pending work invokes the callback and schedules the next tick. A tick that finds nothing
//! to do ends the chain, so there is no polling once the input stops.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
    time::Instant,
};

use anyhow::Result;

use glide_frames::{FrameHandle, RefreshScheduler};

type Emit = Box<dyn FnMut(Instant) -> Result<()>>;

pub struct FrameThrottle {
    state: Rc<RefCell<ThrottleState>>,
    frames: Rc<dyn RefreshScheduler>,
}

struct ThrottleState {
    pending: bool,
    scheduled: Option<FrameHandle>,
    /// `None` while it runs.
    emit: Option<Emit>,
}

impl fmt::Debug for FrameThrottle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FrameThrottle")
            .field("pending", &state.pending)
            .field("scheduled", &state.scheduled)
            .finish()
    }
}

impl FrameThrottle {
    pub fn new(
        frames: Rc<dyn RefreshScheduler>,
        emit: impl FnMut(Instant) -> Result<()> + 'static,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(ThrottleState {
                pending: false,
                scheduled: None,
                emit: Some(Box::new(emit)),
            })),
            frames,
        }
    }

    /// Mark work as pending. Schedules a tick if there is none.
    pub fn kick(&self) {
        let mut state = self.state.borrow_mut();
        state.pending = true;
        if state.scheduled.is_none() {
            state.scheduled = Some(schedule_tick(&self.state, &self.frames));
        }
    }

    /// Drop pending work. A tick that is still scheduled does nothing and ends the chain.
    pub fn stop(&self) {
        self.state.borrow_mut().pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending
    }

    pub fn is_scheduled(&self) -> bool {
        self.state.borrow().scheduled.is_some()
    }
}

impl Drop for FrameThrottle {
    fn drop(&mut self) {
        let scheduled = self.state.borrow_mut().scheduled.take();
        if let Some(handle) = scheduled {
            self.frames.cancel(handle);
        }
    }
}

fn schedule_tick(
    state: &Rc<RefCell<ThrottleState>>,
    frames: &Rc<dyn RefreshScheduler>,
) -> FrameHandle {
    let state = Rc::downgrade(state);
    let weak_frames = Rc::downgrade(frames);
    frames.schedule(Box::new(move |instant| {
        tick(&state, &weak_frames, instant)
    }))
}

fn tick(
    state: &Weak<RefCell<ThrottleState>>,
    frames: &Weak<dyn RefreshScheduler>,
    instant: Instant,
) -> Result<()> {
    // The throttle was dropped.
    let Some(state) = state.upgrade() else {
        return Ok(());
    };

    let emit = {
        let mut state = state.borrow_mut();
        state.scheduled = None;
        if !state.pending {
            return Ok(());
        }
        state.pending = false;
        state.emit.take()
    };

    // Re-arm first, a failing callback must not end the chain.
    if let Some(frames) = frames.upgrade() {
        let handle = schedule_tick(&state, &frames);
        state.borrow_mut().scheduled = Some(handle);
    }

    let Some(mut emit) = emit else {
        return Ok(());
    };
    let result = emit(instant);
    state.borrow_mut().emit.get_or_insert(emit);
    result
}
