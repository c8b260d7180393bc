mod queue;
mod repetitive;
mod routing;

use std::fmt;

use rand::RngCore;
use thiserror::Error;

use crate::actor::{Actor, EntityId};

pub use queue::ActionQueue;
pub use repetitive::{
    repeat_callback, RepeatCallback, RepeatLimit, RepeatMode, RepeatOptions, RepeatTick,
    RepetitiveAction,
};
pub use routing::{
    RouteTarget, RoutingAction, RoutingPhase, Targetable, DEFAULT_SPEED_SECONDS_PER_UNIT,
};

/// Time handed to every action on a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick.
    pub delta_seconds: f64,
    /// Seconds since the simulation started.
    pub total_seconds: f64,
}

impl FrameTime {
    pub fn new(delta_seconds: f64, total_seconds: f64) -> Self {
        Self {
            delta_seconds,
            total_seconds,
        }
    }

    pub fn advance(self, delta_seconds: f64) -> Self {
        Self {
            delta_seconds,
            total_seconds: self.total_seconds + delta_seconds,
        }
    }
}

pub struct TickContext<'a> {
    pub time: FrameTime,
    pub rng: &'a mut dyn RngCore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    Completed,
}

impl ActionStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Routing,
    Repetitive,
    Custom(&'static str),
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Routing => write!(f, "routing"),
            Self::Repetitive => write!(f, "repetitive"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Payload delivered to completion observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionCompleted {
    pub actor_id: EntityId,
    pub kind: ActionKind,
    /// Target a routing action was heading for, when it was routed to one.
    pub destination: Option<EntityId>,
}

pub type CompletionObserver<A> = Box<dyn FnMut(&mut A, &ActionCompleted)>;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ActionConfigError {
    #[error("repeat interval must be finite and non-negative, got {value}")]
    InvalidInterval { value: f64 },
    #[error("repeat time limit must be finite and non-negative, got {value}")]
    InvalidTimeLimit { value: f64 },
    #[error("cascade mode needs at least one callback")]
    EmptyCascade,
    #[error("routing speed must be finite and non-negative seconds per unit, got {value}")]
    InvalidSpeed { value: f64 },
}

/// State shared by every action: the bound actor, the completion flag and the observers
/// that fire once when completion is first reported.
pub struct ActionCore<A> {
    subject: Option<EntityId>,
    complete: bool,
    notified: bool,
    observers: Vec<CompletionObserver<A>>,
}

impl<A> Default for ActionCore<A> {
    fn default() -> Self {
        Self {
            subject: None,
            complete: false,
            notified: false,
            observers: Vec::new(),
        }
    }
}

impl<A> fmt::Debug for ActionCore<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCore")
            .field("subject", &self.subject)
            .field("complete", &self.complete)
            .field("notified", &self.notified)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<A> ActionCore<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(&self) -> Option<EntityId> {
        self.subject
    }

    pub(crate) fn bind(&mut self, subject: EntityId) {
        self.subject = Some(subject);
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn has_notified(&self) -> bool {
        self.notified
    }

    pub fn end(&mut self) {
        self.complete = true;
    }

    pub fn on_completed(&mut self, observer: impl FnMut(&mut A, &ActionCompleted) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self, actor: &mut A, event: &ActionCompleted) {
        if self.notified {
            return;
        }
        self.complete = true;
        self.notified = true;
        for mut observer in std::mem::take(&mut self.observers) {
            observer(actor, event);
        }
    }
}

/// A unit of timed behaviour bound to one actor.
///
/// Implementors provide `step`; `run` wraps it with the binding check and the one-shot
/// completion notification. `end` only marks the action complete: the next `run` lets the
/// variant decide how to wrap up (a routing action snaps to its end point) before observers
/// fire.
pub trait Action<A: Actor>: 'static {
    fn core(&self) -> &ActionCore<A>;
    fn core_mut(&mut self) -> &mut ActionCore<A>;
    fn kind(&self) -> ActionKind;

    /// Advances one tick. Only called while bound to `actor` and before completion has been
    /// reported. Must return `Completed` once `core().is_complete()` is set.
    fn step(&mut self, actor: &mut A, ctx: &mut TickContext<'_>) -> ActionStatus;

    /// Configuration-only copy: no binding, no timers, no completion state, no observers.
    fn duplicate(&self) -> Self
    where
        Self: Sized;

    /// Hook for queue cancellation. Most actions have nothing to release.
    fn force_end(&mut self) {}

    fn destination(&self) -> Option<EntityId> {
        None
    }

    fn as_routing(&self) -> Option<&RoutingAction<A>> {
        None
    }

    fn as_routing_mut(&mut self) -> Option<&mut RoutingAction<A>> {
        None
    }

    fn run(&mut self, actor: &mut A, ctx: &mut TickContext<'_>) -> ActionStatus {
        if self.core().has_notified() {
            return ActionStatus::Completed;
        }
        if self.core().subject() != Some(actor.id()) {
            return ActionStatus::Running;
        }
        match self.step(actor, ctx) {
            ActionStatus::Running => ActionStatus::Running,
            ActionStatus::Completed => {
                let event = ActionCompleted {
                    actor_id: actor.id(),
                    kind: self.kind(),
                    destination: self.destination(),
                };
                self.core_mut().notify(actor, &event);
                ActionStatus::Completed
            }
        }
    }

    fn subject(&self) -> Option<EntityId> {
        self.core().subject()
    }

    fn is_complete(&self) -> bool {
        self.core().is_complete()
    }

    fn end(&mut self) {
        self.core_mut().end();
    }

    fn on_completed(&mut self, observer: impl FnMut(&mut A, &ActionCompleted) + 'static)
    where
        Self: Sized,
    {
        self.core_mut().on_completed(observer);
    }
}

/// Actions that can postpone their start, used to stagger group members.
pub trait Delayable {
    fn seconds_delay(&self) -> f64;
    fn delay(&mut self, seconds: f64);
}
