mod scenarios;

use std::{cell::RefCell, rc::Rc, time::Instant};

use glide_dom::{Document, ElementId, Event, EventKind, PagePoint};
use glide_frames::{FrameClock, RefreshScheduler};

use crate::{MoveEvent, MoveEvents, MoveKind, Subscription, Threshold};

/// A document with one element that records every move event delivered for it.
struct Harness {
    doc: Rc<Document>,
    clock: Rc<FrameClock>,
    element: ElementId,
    events: Rc<MoveEvents>,
    subscriptions: Vec<Subscription>,
    log: Rc<RefCell<Vec<MoveEvent>>>,
}

impl Harness {
    fn new(threshold: f64) -> Self {
        let clock = Rc::new(FrameClock::new());
        Self::with_frames(threshold, clock.clone(), clock)
    }

    fn with_frames(
        threshold: f64,
        clock: Rc<FrameClock>,
        frames: Rc<dyn RefreshScheduler>,
    ) -> Self {
        let doc = Rc::new(Document::new());
        let element = doc.create_element(Document::ROOT).unwrap();
        let threshold = Threshold::new(threshold).unwrap();
        let events = Rc::new(MoveEvents::new(doc.clone(), frames, threshold));
        let log: Rc<RefCell<Vec<MoveEvent>>> = Rc::default();

        let subscriptions = MoveKind::ALL
            .iter()
            .map(|kind| {
                let log = log.clone();
                events.subscribe(element, *kind, move |event| {
                    log.borrow_mut().push(*event);
                    Ok(())
                })
            })
            .collect();

        Self {
            doc,
            clock,
            element,
            events,
            subscriptions,
            log,
        }
    }

    fn pointer(&self, kind: EventKind, x: f64, y: f64) -> anyhow::Result<()> {
        // Pointer-down hits the element, everything else whatever is under the pointer.
        let target = match kind {
            EventKind::PointerDown => self.element,
            _ => Document::ROOT,
        };
        let event = Event::new(kind, target, PagePoint::new(x, y), Instant::now());
        self.doc.dispatch(event).map(|_| ())
    }

    fn down(&self, x: f64, y: f64) {
        self.pointer(EventKind::PointerDown, x, y).unwrap();
    }

    fn move_to(&self, x: f64, y: f64) {
        self.pointer(EventKind::PointerMove, x, y).unwrap();
    }

    fn up(&self, x: f64, y: f64) {
        self.pointer(EventKind::PointerUp, x, y).unwrap();
    }

    fn frame(&self) {
        self.clock.frame(Instant::now()).unwrap();
    }

    /// Every event delivered since the last call.
    fn take_events(&self) -> Vec<MoveEvent> {
        self.log.borrow_mut().drain(..).collect()
    }

    /// Kind and delta of every event delivered since the last call.
    fn take(&self) -> Vec<(MoveKind, (f64, f64))> {
        self.take_events()
            .into_iter()
            .map(|e| (e.kind, (e.delta_x, e.delta_y)))
            .collect()
    }

    fn unsubscribe_all(&self) {
        for subscription in &self.subscriptions {
            self.events.unsubscribe(*subscription);
        }
    }
}
