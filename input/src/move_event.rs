use std::time::Instant;

use derive_more::Display;

use glide_dom::{ElementId, Event, EventKind, PagePoint, PageVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum MoveKind {
    #[display("movestart")]
    Start,
    #[display("move")]
    Move,
    #[display("moveend")]
    End,
}

impl MoveKind {
    pub const ALL: [MoveKind; 3] = [MoveKind::Start, MoveKind::Move, MoveKind::End];

    pub fn event_kind(self) -> EventKind {
        match self {
            MoveKind::Start => EventKind::MoveStart,
            MoveKind::Move => EventKind::Move,
            MoveKind::End => EventKind::MoveEnd,
        }
    }
}

impl From<MoveKind> for EventKind {
    fn from(kind: MoveKind) -> Self {
        kind.event_kind()
    }
}

/// The detail a recognizer attaches to the move events it triggers.
#[derive(Debug, Clone)]
pub struct MoveTrigger {
    pub kind: MoveKind,
    /// The pointer event the notification was derived from.
    pub source: Event,
    /// Where the pointer went down.
    pub start: PagePoint,
    pub delta: PageVector,
}

impl MoveTrigger {
    pub fn new(kind: MoveKind, source: Event, start: PagePoint, delta: PageVector) -> Self {
        Self {
            kind,
            source,
            start,
            delta,
        }
    }

    /// The envelope to trigger on `target`.
    pub fn to_event(&self, target: ElementId) -> Event {
        Event::new(
            self.kind.event_kind(),
            target,
            self.source.page,
            self.source.time,
        )
        .with_detail(self.clone())
    }
}

/// What move listeners receive.
///
/// For `movestart`, `page` is where the threshold got crossed while `delta` is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveEvent {
    pub kind: MoveKind,
    pub target: ElementId,
    pub time: Instant,
    pub page_x: f64,
    pub page_y: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
}

impl MoveEvent {
    pub fn from_trigger(target: ElementId, trigger: &MoveTrigger) -> Self {
        let page = trigger.source.page;
        Self {
            kind: trigger.kind,
            target,
            time: trigger.source.time,
            page_x: page.x,
            page_y: page.y,
            start_x: trigger.start.x,
            start_y: trigger.start.y,
            delta_x: trigger.delta.x,
            delta_y: trigger.delta.y,
        }
    }

    pub fn page(&self) -> PagePoint {
        PagePoint::new(self.page_x, self.page_y)
    }

    pub fn start(&self) -> PagePoint {
        PagePoint::new(self.start_x, self.start_y)
    }

    pub fn delta(&self) -> PageVector {
        PageVector::new(self.delta_x, self.delta_y)
    }
}
