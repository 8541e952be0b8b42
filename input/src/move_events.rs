//! Subscribing to move events.
//!
//! All subscriptions for one element share a single [`GestureRecognizer`]. It is installed with
//! the first subscription and uninstalled when the last one is removed, no matter which of the
//! three kinds they are for.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use anyhow::Result;
use log::debug;

use glide_dom::{ElementId, EventHost, ListenerId};
use glide_frames::RefreshScheduler;

use crate::{GestureRecognizer, MoveConfig, MoveEvent, MoveKind, MoveTrigger, Threshold};

/// A handler registered with [`MoveEvents::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub target: ElementId,
    pub kind: MoveKind,
    listener: ListenerId,
}

pub struct MoveEvents {
    host: Rc<dyn EventHost>,
    frames: Rc<dyn RefreshScheduler>,
    threshold: Threshold,
    bindings: RefCell<HashMap<ElementId, Binding>>,
}

struct Binding {
    /// Live subscriptions across all three kinds.
    subscriptions: usize,
    recognizer: GestureRecognizer,
}

impl fmt::Debug for MoveEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveEvents")
            .field("threshold", &self.threshold)
            .field("bindings", &self.bindings.borrow().len())
            .finish()
    }
}

impl MoveEvents {
    pub fn new(
        host: Rc<dyn EventHost>,
        frames: Rc<dyn RefreshScheduler>,
        threshold: Threshold,
    ) -> Self {
        Self {
            host,
            frames,
            threshold,
            bindings: Default::default(),
        }
    }

    pub fn with_config(
        host: Rc<dyn EventHost>,
        frames: Rc<dyn RefreshScheduler>,
        config: &MoveConfig,
    ) -> Result<Self> {
        Ok(Self::new(host, frames, config.threshold()?))
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Invoke `handler` for every `kind` move event on `target`.
    pub fn subscribe(
        &self,
        target: ElementId,
        kind: MoveKind,
        mut handler: impl FnMut(&MoveEvent) -> Result<()> + 'static,
    ) -> Subscription {
        let listener = self.host.listen(
            target,
            kind.event_kind(),
            Box::new(move |event| {
                // Events of the same kind that were not triggered by a recognizer.
                let Some(trigger) = event.detail::<MoveTrigger>() else {
                    return Ok(());
                };
                handler(&MoveEvent::from_trigger(event.current_target, trigger))
            }),
        );

        self.bindings
            .borrow_mut()
            .entry(target)
            .or_insert_with(|| Binding {
                subscriptions: 0,
                recognizer: GestureRecognizer::install(
                    target,
                    self.threshold,
                    self.host.clone(),
                    self.frames.clone(),
                ),
            })
            .subscriptions += 1;

        Subscription {
            target,
            kind,
            listener,
        }
    }

    /// Remove a subscription. The recognizer of the target is uninstalled with the last one.
    ///
    /// Returns `false` if the subscription was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        if !self.host.unlisten(subscription.listener) {
            return false;
        }

        let target = subscription.target;
        let released = {
            let mut bindings = self.bindings.borrow_mut();
            let Some(binding) = bindings.get_mut(&target) else {
                return true;
            };
            binding.subscriptions -= 1;
            if binding.subscriptions > 0 {
                return true;
            }
            bindings.remove(&target)
        };

        if let Some(binding) = released {
            binding.recognizer.uninstall();
            debug!("Last move subscription on {target} removed");
        }
        true
    }

    /// `true` if a recognizer is installed on `target`.
    pub fn is_bound(&self, target: ElementId) -> bool {
        self.bindings.borrow().contains_key(&target)
    }

    /// The number of elements with a recognizer.
    pub fn binding_count(&self) -> usize {
        self.bindings.borrow().len()
    }

    /// The number of live subscriptions on `target`.
    pub fn subscription_count(&self, target: ElementId) -> usize {
        self.bindings
            .borrow()
            .get(&target)
            .map_or(0, |b| b.subscriptions)
    }

    pub fn recognizer(&self, target: ElementId) -> Option<GestureRecognizer> {
        self.bindings
            .borrow()
            .get(&target)
            .map(|b| b.recognizer.clone())
    }
}
