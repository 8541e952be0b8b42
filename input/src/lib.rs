//! Synthesizes `movestart`, `move` and `moveend` events from pointer input.
//!
//! Moves start once the pointer moved a threshold distance away from where it went down, and are
//! then reported at most once per display refresh. `moveend` is always computed from the
//! pointer-up position itself.
mod config;
mod frame_throttle;
mod move_event;
mod move_events;
mod recognizer;
mod session;
#[cfg(test)]
mod tests;

pub use config::*;
pub use frame_throttle::*;
pub use move_event::*;
pub use move_events::*;
pub use recognizer::*;
pub use session::*;
