use anyhow::Result;

use crate::{ElementId, Event, EventKind, Handler, ListenerId};

/// The primitives a gesture recognizer needs from the host's event system.
pub trait EventHost {
    /// The document itself, where listeners for events of the whole page are registered.
    fn root(&self) -> ElementId;

    fn listen(&self, target: ElementId, kind: EventKind, handler: Handler) -> ListenerId;

    /// `false` if the listener was already removed.
    fn unlisten(&self, listener: ListenerId) -> bool;

    /// Synchronously invoke the listeners registered for `event.kind` on `event.target`.
    ///
    /// The event does not bubble and has no default action.
    fn trigger(&self, event: Event) -> Result<()>;
}
