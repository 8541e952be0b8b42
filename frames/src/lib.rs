//! Display refresh scheduling.
//!
//! Everything here is meant to be used from the host's interaction thread only.
mod frame_clock;
mod frames;
mod timer_frames;

use std::{rc::Rc, time::Instant};

use anyhow::Result;
use derive_more::Display;
use log::error;

pub use frame_clock::*;
pub use frames::*;
pub use timer_frames::*;

/// A callback that runs once at a display refresh.
pub type FrameCallback = Box<dyn FnOnce(Instant) -> Result<()>>;

/// Identifies a scheduled [`FrameCallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("frame#{_0}")]
pub struct FrameHandle(u64);

pub trait RefreshScheduler {
    /// Schedule `callback` to be invoked once at the next refresh.
    fn schedule(&self, callback: FrameCallback) -> FrameHandle;

    /// Cancel a callback that has not fired yet.
    ///
    /// `false` if it already fired or was cancelled before.
    fn cancel(&self, handle: FrameHandle) -> bool;
}

impl<T: RefreshScheduler + ?Sized> RefreshScheduler for Rc<T> {
    fn schedule(&self, callback: FrameCallback) -> FrameHandle {
        (**self).schedule(callback)
    }

    fn cancel(&self, handle: FrameHandle) -> bool {
        (**self).cancel(handle)
    }
}

/// Monotonic handle generator, one per scheduler.
#[derive(Debug, Default)]
struct Handles(u64);

impl Handles {
    fn next(&mut self) -> FrameHandle {
        self.0 += 1;
        FrameHandle(self.0)
    }
}

/// Runs one callback and keeps the first error.
///
/// A failing callback must not prevent the remaining callbacks of the same refresh from running,
/// so later errors are only logged.
fn run_callback(
    handle: FrameHandle,
    callback: FrameCallback,
    instant: Instant,
    result: &mut Result<()>,
) {
    if let Err(e) = callback(instant) {
        if result.is_ok() {
            *result = Err(e);
        } else {
            error!("Frame callback {handle} failed: {e:?}");
        }
    }
}
