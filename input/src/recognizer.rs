//! Move gesture recognition on one element.
//!
//! A pointer-down on the element (or one of its descendants) starts a [`Session`] and registers
//! pointer-move and pointer-up listeners on the document root for the duration of the
//! interaction. No borrow of the recognizer's state is held while move listeners run, so they may
//! cancel or uninstall the recognizer.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use anyhow::Result;
use log::debug;

use glide_dom::{ElementId, Event, EventHost, EventKind, Handler, ListenerId};
use glide_frames::RefreshScheduler;

use crate::{FrameThrottle, MoveStep, MoveTrigger, Phase, Session, Threshold};

#[derive(Clone)]
pub struct GestureRecognizer {
    inner: Rc<Recognizer>,
}

struct Recognizer {
    target: ElementId,
    threshold: Threshold,
    host: Rc<dyn EventHost>,
    frames: Rc<dyn RefreshScheduler>,
    /// Pointer-down and native drag suppression on the target.
    bindings: RefCell<Vec<ListenerId>>,
    interaction: RefCell<Option<Interaction>>,
}

struct Interaction {
    session: Session,
    moved: ListenerId,
    released: ListenerId,
}

impl fmt::Debug for GestureRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureRecognizer")
            .field("target", &self.inner.target)
            .field("threshold", &self.inner.threshold)
            .field("phase", &self.phase())
            .finish()
    }
}

impl GestureRecognizer {
    /// Start recognizing move gestures on `target`.
    pub fn install(
        target: ElementId,
        threshold: Threshold,
        host: Rc<dyn EventHost>,
        frames: Rc<dyn RefreshScheduler>,
    ) -> Self {
        let inner = Rc::new(Recognizer {
            target,
            threshold,
            host,
            frames,
            bindings: Default::default(),
            interaction: Default::default(),
        });

        let weak = Rc::downgrade(&inner);
        let host = &inner.host;
        let bindings = vec![
            host.listen(
                target,
                EventKind::PointerDown,
                handler(&weak, Recognizer::pointer_down),
            ),
            host.listen(target, EventKind::DragStart, Box::new(suppress_native_drag)),
            host.listen(target, EventKind::Drag, Box::new(suppress_native_drag)),
        ];
        *inner.bindings.borrow_mut() = bindings;

        debug!("Recognizing move gestures on {target}");
        Self { inner }
    }

    pub fn target(&self) -> ElementId {
        self.inner.target
    }

    pub fn threshold(&self) -> Threshold {
        self.inner.threshold
    }

    /// The phase of the current session, [`Phase::Idle`] if there is none.
    pub fn phase(&self) -> Phase {
        self.inner
            .interaction
            .borrow()
            .as_ref()
            .map_or(Phase::Idle, |i| i.session.phase())
    }

    /// End the current session without any further notifications.
    ///
    /// `false` if there was none.
    pub fn cancel(&self) -> bool {
        self.inner.cancel()
    }

    /// Remove all listeners this recognizer registered and cancel the current session.
    ///
    /// Calling it more than once has no effect.
    pub fn uninstall(&self) {
        self.inner.uninstall();
    }
}

impl Recognizer {
    fn pointer_down(self: &Rc<Self>, event: &Event) -> Result<()> {
        if self.interaction.borrow().is_some() {
            debug!(
                "Ignoring {} on {}, a move session is in progress",
                event.kind, self.target
            );
            return Ok(());
        }

        let root = self.host.root();
        let weak = Rc::downgrade(self);
        let moved = self.host.listen(
            root,
            EventKind::PointerMove,
            handler(&weak, Self::pointer_moved),
        );
        let released = self.host.listen(
            root,
            EventKind::PointerUp,
            handler(&weak, Self::pointer_released),
        );

        *self.interaction.borrow_mut() = Some(Interaction {
            session: Session::new(event.clone()),
            moved,
            released,
        });
        Ok(())
    }

    fn pointer_moved(self: &Rc<Self>, event: &Event) -> Result<()> {
        let step = {
            let mut slot = self.interaction.borrow_mut();
            let Some(interaction) = slot.as_mut() else {
                return Ok(());
            };
            interaction
                .session
                .track(event, self.threshold.pixels(), || self.throttle())
        };

        let MoveStep::Crossed { start, first } = step else {
            return Ok(());
        };
        debug!("Move threshold crossed on {}", self.target);
        // The first move is delivered even if a movestart listener fails, but not if one of them
        // ended the session.
        let started = self.emit(start);
        if !self.is_active() {
            debug!("Move session on {} ended by a movestart listener", self.target);
            return started;
        }
        let moved = self.emit(first);
        started.and(moved)
    }

    fn is_active(&self) -> bool {
        self.interaction
            .borrow()
            .as_ref()
            .is_some_and(|i| i.session.phase() == Phase::Active)
    }

    fn pointer_released(self: &Rc<Self>, event: &Event) -> Result<()> {
        let interaction = self.interaction.borrow_mut().take();
        let Some(mut interaction) = interaction else {
            return Ok(());
        };

        // Stops the throttle, nothing can be emitted after the moveend.
        let end = interaction.session.finish(event);
        self.release(interaction);

        match end {
            Some(end) => self.emit(end),
            None => Ok(()),
        }
    }

    /// Creates the throttle that reports the latest movement at the next frame.
    fn throttle(self: &Rc<Self>) -> FrameThrottle {
        let weak = Rc::downgrade(self);
        FrameThrottle::new(self.frames.clone(), move |_| match weak.upgrade() {
            Some(recognizer) => recognizer.emit_latest(),
            None => Ok(()),
        })
    }

    fn emit_latest(&self) -> Result<()> {
        let trigger = self
            .interaction
            .borrow()
            .as_ref()
            .and_then(|i| i.session.latest_trigger());
        match trigger {
            Some(trigger) => self.emit(trigger),
            None => Ok(()),
        }
    }

    fn emit(&self, trigger: MoveTrigger) -> Result<()> {
        self.host.trigger(trigger.to_event(self.target))
    }

    fn cancel(&self) -> bool {
        let interaction = self.interaction.borrow_mut().take();
        let Some(mut interaction) = interaction else {
            return false;
        };
        interaction.session.cancel();
        self.release(interaction);
        debug!("Cancelled move session on {}", self.target);
        true
    }

    /// Remove the listeners of an interaction.
    fn release(&self, interaction: Interaction) {
        self.host.unlisten(interaction.moved);
        self.host.unlisten(interaction.released);
    }

    fn uninstall(&self) {
        let bindings = self.bindings.take();
        if bindings.is_empty() {
            return;
        }
        for listener in bindings {
            self.host.unlisten(listener);
        }
        self.cancel();
        debug!("Stopped recognizing move gestures on {}", self.target);
    }
}

impl Drop for Recognizer {
    fn drop(&mut self) {
        self.uninstall();
    }
}

fn handler(weak: &Weak<Recognizer>, f: fn(&Rc<Recognizer>, &Event) -> Result<()>) -> Handler {
    let weak = weak.clone();
    Box::new(move |event| match weak.upgrade() {
        Some(recognizer) => f(&recognizer, event),
        None => Ok(()),
    })
}

/// Prevents the host from starting a native drag of the bound element.
///
/// Descendants that bubble their drag events through the element keep their default.
fn suppress_native_drag(event: &mut Event) -> Result<()> {
    if event.is_at_target() {
        event.prevent_default();
    }
    Ok(())
}
