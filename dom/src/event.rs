use std::{any::Any, rc::Rc, time::Instant};

use anyhow::Result;
use derive_more::Display;

use crate::PagePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EventKind {
    #[display("pointerdown")]
    PointerDown,
    #[display("pointermove")]
    PointerMove,
    #[display("pointerup")]
    PointerUp,
    /// The host is about to begin a native drag of the element.
    #[display("dragstart")]
    DragStart,
    #[display("drag")]
    Drag,
    #[display("movestart")]
    MoveStart,
    #[display("move")]
    Move,
    #[display("moveend")]
    MoveEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("element#{_0}")]
pub struct ElementId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("listener#{_0}")]
pub struct ListenerId(pub(crate) u64);

pub type Handler = Box<dyn FnMut(&mut Event) -> Result<()>>;

/// The event envelope delivered to listeners.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    /// The element the event was dispatched to.
    pub target: ElementId,
    /// The element whose listeners are currently invoked.
    pub current_target: ElementId,
    pub page: PagePoint,
    pub time: Instant,
    /// Additional data passed along by whoever triggered the event.
    detail: Option<Rc<dyn Any>>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    pub fn new(kind: EventKind, target: ElementId, page: PagePoint, time: Instant) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            page,
            time,
            detail: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn with_detail<T: Any>(mut self, detail: T) -> Self {
        self.detail = Some(Rc::new(detail));
        self
    }

    pub fn detail<T: Any>(&self) -> Option<&T> {
        self.detail.as_deref()?.downcast_ref()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// `true` while the listeners of the target itself run, `false` while bubbling.
    pub fn is_at_target(&self) -> bool {
        self.target == self.current_target
    }
}
