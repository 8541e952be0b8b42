//! A minimal host event system: an element tree, listeners, bubbling dispatch and synchronous
//! triggering of custom events.
mod document;
mod event;
mod host;
mod pointer_translator;

pub use document::*;
pub use event::*;
pub use host::*;
pub use pointer_translator::*;

pub struct PageSpace;
/// Page coordinates in logical pixels.
pub type PagePoint = euclid::Point2D<f64, PageSpace>;
pub type PageVector = euclid::Vector2D<f64, PageSpace>;
