use std::{cell::RefCell, fmt, iter, rc::Rc};

use anyhow::{Result, bail};
use itertools::Itertools;
use log::{error, warn};

use crate::{ElementId, Event, EventHost, EventKind, Handler, ListenerId};

/// An element tree with listeners.
///
/// All methods take `&self`, listeners may register and remove listeners or trigger events while
/// they are invoked.
pub struct Document {
    /// Parents by element index. The root is at index 0 and has none.
    parents: RefCell<Vec<Option<ElementId>>>,
    listeners: RefCell<Listeners>,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    /// In registration order.
    entries: Vec<Listener>,
}

struct Listener {
    id: ListenerId,
    target: ElementId,
    kind: EventKind,
    // Shared, so that dispatch can invoke it without keeping `listeners` borrowed.
    handler: Rc<RefCell<Handler>>,
}

/// The outcome of [`Document::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    /// A listener asked the host to skip its default action.
    pub default_prevented: bool,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.parents.borrow().len())
            .field("listeners", &self.listeners.borrow().entries.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub const ROOT: ElementId = ElementId(0);

    pub fn new() -> Self {
        Self {
            parents: RefCell::new(vec![None]),
            listeners: Default::default(),
        }
    }

    pub fn create_element(&self, parent: ElementId) -> Result<ElementId> {
        if !self.contains(parent) {
            bail!("Parent {parent} does not exist");
        }
        let mut parents = self.parents.borrow_mut();
        let id = ElementId(parents.len() as u32);
        parents.push(Some(parent));
        Ok(id)
    }

    pub fn contains(&self, element: ElementId) -> bool {
        (element.0 as usize) < self.parents.borrow().len()
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.parents
            .borrow()
            .get(element.0 as usize)
            .copied()
            .flatten()
    }

    /// The number of listeners registered for `kind` on `target`.
    pub fn listener_count(&self, target: ElementId, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .entries
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .count()
    }

    /// The number of all registered listeners.
    pub fn total_listeners(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    /// Dispatch an event to its target and bubble it up to the root.
    ///
    /// All listeners on the path are invoked even if one fails. The first error is returned after
    /// the dispatch completed.
    pub fn dispatch(&self, mut event: Event) -> Result<Dispatched> {
        if !self.contains(event.target) {
            bail!("Can't dispatch {} to unknown {}", event.kind, event.target);
        }

        let mut result = Ok(());
        for element in self.propagation_path(event.target) {
            event.current_target = element;
            self.invoke(&mut event, &mut result);
            if event.is_propagation_stopped() {
                break;
            }
        }

        result.map(|()| Dispatched {
            default_prevented: event.is_default_prevented(),
        })
    }

    /// The target followed by all its ancestors.
    fn propagation_path(&self, target: ElementId) -> Vec<ElementId> {
        iter::successors(Some(target), |e| self.parent(*e)).collect()
    }

    fn invoke(&self, event: &mut Event, result: &mut Result<()>) {
        for (id, handler) in self.snapshot(event.current_target, event.kind) {
            // An earlier listener of the same dispatch removed this one.
            if !self.is_registered(id) {
                continue;
            }
            let Ok(mut handler) = handler.try_borrow_mut() else {
                warn!("Skipping re-entrant invocation of {id} for {}", event.kind);
                continue;
            };
            if let Err(e) = (*handler)(event) {
                if result.is_ok() {
                    *result = Err(e);
                } else {
                    error!("Listener {id} for {} failed: {e:?}", event.kind);
                }
            }
        }
    }

    fn snapshot(
        &self,
        target: ElementId,
        kind: EventKind,
    ) -> Vec<(ListenerId, Rc<RefCell<Handler>>)> {
        self.listeners
            .borrow()
            .entries
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .map(|l| (l.id, l.handler.clone()))
            .collect_vec()
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners.borrow().entries.iter().any(|l| l.id == id)
    }
}

impl EventHost for Document {
    fn root(&self) -> ElementId {
        Self::ROOT
    }

    fn listen(&self, target: ElementId, kind: EventKind, handler: Handler) -> ListenerId {
        let mut listeners = self.listeners.borrow_mut();
        listeners.next_id += 1;
        let id = ListenerId(listeners.next_id);
        listeners.entries.push(Listener {
            id,
            target,
            kind,
            handler: Rc::new(RefCell::new(handler)),
        });
        id
    }

    fn unlisten(&self, listener: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.entries.len();
        listeners.entries.retain(|l| l.id != listener);
        listeners.entries.len() != before
    }

    fn trigger(&self, mut event: Event) -> Result<()> {
        event.current_target = event.target;
        let mut result = Ok(());
        self.invoke(&mut event, &mut result);
        result
    }
}
