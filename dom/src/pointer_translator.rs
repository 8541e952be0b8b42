//! Turns winit pointer input into document events.

use std::time::Instant;

use winit::event::{ElementState, WindowEvent};

use crate::{ElementId, Event, EventKind, PagePoint};

pub trait WindowEventExtensions {
    /// The pointer event kind this window event corresponds to, if any.
    fn pointer_event_kind(&self) -> Option<EventKind>;
}

impl WindowEventExtensions for WindowEvent {
    fn pointer_event_kind(&self) -> Option<EventKind> {
        match self {
            WindowEvent::CursorMoved { .. } => Some(EventKind::PointerMove),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } => Some(EventKind::PointerDown),
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            } => Some(EventKind::PointerUp),
            _ => None,
        }
    }
}

/// Tracks the cursor position, because winit reports button changes without one.
#[derive(Debug)]
pub struct PointerTranslator {
    scale_factor: f64,
    pos: Option<PagePoint>,
}

impl PointerTranslator {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            pos: None,
        }
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    /// Translate a window event into a pointer event targeted at the element `hit_test` returns
    /// for the current position.
    ///
    /// `None` for non-pointer events and for button changes before the first cursor movement.
    pub fn translate(
        &mut self,
        event: &WindowEvent,
        time: Instant,
        hit_test: impl FnOnce(PagePoint) -> ElementId,
    ) -> Option<Event> {
        let kind = event.pointer_event_kind()?;
        if let WindowEvent::CursorMoved { position, .. } = event {
            let logical = position.to_logical::<f64>(self.scale_factor);
            self.pos = Some(PagePoint::new(logical.x, logical.y));
        }
        let pos = self.pos?;
        Some(Event::new(kind, hit_test(pos), pos, time))
    }
}
