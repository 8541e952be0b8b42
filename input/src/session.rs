use glide_dom::{Event, PagePoint, PageVector};

use crate::{FrameThrottle, MoveKind, MoveTrigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No session, or the session ended.
    #[default]
    Idle,
    /// The pointer is down but did not move far enough yet.
    ArmedBelowThreshold,
    /// Moves are reported, rate limited by the throttle.
    Active,
}

/// How a pointer movement affected a [`Session`].
#[derive(Debug, Clone)]
pub enum MoveStep {
    /// The session ended already.
    Ignored,
    /// Still below the threshold.
    Below,
    /// The threshold got crossed with this movement. Both must be emitted right away, in order.
    Crossed {
        start: MoveTrigger,
        first: MoveTrigger,
    },
    /// Stored, the throttle delivers it with the next frame.
    Coalesced,
}

/// The state of one pointer-down to pointer-up interaction.
#[derive(Debug)]
pub struct Session {
    origin: PagePoint,
    latest_delta: PageVector,
    latest_event: Event,
    phase: Phase,
    /// Created when the session becomes active.
    throttle: Option<FrameThrottle>,
}

impl Session {
    pub fn new(down: Event) -> Self {
        Self {
            origin: down.page,
            latest_delta: PageVector::zero(),
            latest_event: down,
            phase: Phase::ArmedBelowThreshold,
            throttle: None,
        }
    }

    pub fn origin(&self) -> PagePoint {
        self.origin
    }

    pub fn latest_delta(&self) -> PageVector {
        self.latest_delta
    }

    pub fn latest_event(&self) -> &Event {
        &self.latest_event
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_throttled(&self) -> bool {
        self.throttle.is_some()
    }

    /// Track a pointer movement.
    ///
    /// The threshold is inclusive: a distance equal to it counts as crossed. `throttle` is invoked
    /// once, at the moment the threshold gets crossed.
    pub fn track(
        &mut self,
        event: &Event,
        threshold: f64,
        throttle: impl FnOnce() -> FrameThrottle,
    ) -> MoveStep {
        if self.phase == Phase::Idle {
            return MoveStep::Ignored;
        }

        let delta = event.page - self.origin;
        self.latest_delta = delta;
        self.latest_event = event.clone();

        match self.phase {
            Phase::ArmedBelowThreshold if delta.square_length() < threshold * threshold => {
                MoveStep::Below
            }
            Phase::ArmedBelowThreshold => {
                self.phase = Phase::Active;
                self.throttle = Some(throttle());
                MoveStep::Crossed {
                    start: self.trigger(MoveKind::Start, PageVector::zero()),
                    first: self.trigger(MoveKind::Move, delta),
                }
            }
            Phase::Active => {
                if let Some(throttle) = &self.throttle {
                    throttle.kick();
                }
                MoveStep::Coalesced
            }
            Phase::Idle => MoveStep::Ignored,
        }
    }

    /// The move to report at the next frame, `None` if the session is not active.
    pub fn latest_trigger(&self) -> Option<MoveTrigger> {
        (self.phase == Phase::Active).then(|| self.trigger(MoveKind::Move, self.latest_delta))
    }

    /// End the session with the pointer-up `event`.
    ///
    /// The throttle is stopped before the final delta is computed, so no move can follow the
    /// returned `moveend`. `None` if the session never became active.
    pub fn finish(&mut self, event: &Event) -> Option<MoveTrigger> {
        let was_active = self.phase == Phase::Active;
        self.cancel();
        if !was_active {
            return None;
        }

        self.latest_delta = event.page - self.origin;
        self.latest_event = event.clone();
        Some(self.trigger(MoveKind::End, self.latest_delta))
    }

    /// End the session without reporting anything.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        if let Some(throttle) = self.throttle.take() {
            throttle.stop();
        }
    }

    fn trigger(&self, kind: MoveKind, delta: PageVector) -> MoveTrigger {
        MoveTrigger::new(kind, self.latest_event.clone(), self.origin, delta)
    }
}
