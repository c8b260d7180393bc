use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use super::{Action, ActionKind, ActionStatus, TickContext};
use crate::actor::{Actor, EntityId};

/// Per-actor FIFO of pending actions. Only the head runs; a completed head is dropped.
pub struct ActionQueue<A: Actor> {
    actions: VecDeque<Box<dyn Action<A>>>,
    generation: u64,
}

impl<A: Actor> Default for ActionQueue<A> {
    fn default() -> Self {
        Self {
            actions: VecDeque::new(),
            generation: 0,
        }
    }
}

impl<A: Actor> fmt::Debug for ActionQueue<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

impl<A: Actor> ActionQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `action` to `subject` and appends it.
    pub fn enqueue(&mut self, subject: EntityId, mut action: Box<dyn Action<A>>) {
        action.core_mut().bind(subject);
        self.actions.push_back(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn head(&self) -> Option<&dyn Action<A>> {
        self.actions.front().map(|action| action.as_ref())
    }

    pub fn head_mut(&mut self) -> Option<&mut (dyn Action<A> + 'static)> {
        self.actions.front_mut().map(|action| action.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Action<A>> + '_ {
        self.actions.iter().map(|action| action.as_ref())
    }

    pub fn kinds(&self) -> Vec<ActionKind> {
        self.actions.iter().map(|action| action.kind()).collect()
    }

    /// Drops every pending action without running completion logic. Returns how many were
    /// removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.actions.len();
        self.actions.clear();
        self.generation = self.generation.wrapping_add(1);
        removed
    }

    /// Like [`clear`](Self::clear), but gives each action its `force_end` hook first.
    pub fn cancel_all(&mut self) -> usize {
        for action in self.actions.iter_mut() {
            action.force_end();
        }
        self.clear()
    }

    /// Runs the head action of `actor`'s queue for one tick.
    ///
    /// The head is taken out of the queue while it runs so it can borrow the actor mutably.
    /// If the action (or one of its callbacks) clears the queue meanwhile, the in-flight
    /// action is discarded instead of being put back.
    pub fn run_head(actor: &mut A, ctx: &mut TickContext<'_>) -> Option<ActionStatus> {
        let actor_id = actor.id();
        let queue = actor.action_queue_mut();
        let generation = queue.generation;
        let mut action = queue.actions.pop_front()?;

        let status = action.run(actor, ctx);
        let queue = actor.action_queue_mut();
        match status {
            ActionStatus::Completed => {
                debug!(
                    actor = actor_id.0,
                    kind = %action.kind(),
                    remaining = queue.len(),
                    "action_dequeued"
                );
            }
            ActionStatus::Running => {
                if queue.generation == generation {
                    queue.actions.push_front(action);
                } else {
                    debug!(actor = actor_id.0, "in_flight_action_discarded");
                }
            }
        }
        Some(status)
    }
}
