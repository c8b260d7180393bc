use std::collections::{BTreeMap, HashMap};

use crate::actions::{Action, ActionQueue, ActionStatus, TickContext};
use crate::geometry::{Direction, Vec2};
use crate::groups::GroupId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// An entity that owns an action queue and can belong to groups.
///
/// Only the head of the queue runs on a tick, so actions for one actor are strictly
/// sequential. The group back-reference is last-writer-wins: adding an actor to a second
/// group overwrites the first.
pub trait Actor: Sized + 'static {
    fn id(&self) -> EntityId;
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
    fn action_queue(&self) -> &ActionQueue<Self>;
    fn action_queue_mut(&mut self) -> &mut ActionQueue<Self>;
    fn parent_group(&self) -> Option<GroupId>;
    fn set_parent_group(&mut self, group: Option<GroupId>);

    /// Called when a routing action starts moving this actor.
    fn face(&mut self, _direction: Direction) {}

    fn enqueue_action<T: Action<Self>>(&mut self, action: T) {
        self.enqueue_boxed_action(Box::new(action));
    }

    fn enqueue_boxed_action(&mut self, action: Box<dyn Action<Self>>) {
        let id = self.id();
        self.action_queue_mut().enqueue(id, action);
    }

    /// Per-tick hook: runs the queue head, if any.
    fn run_actions(&mut self, ctx: &mut TickContext<'_>) -> Option<ActionStatus> {
        ActionQueue::run_head(self, ctx)
    }

    fn is_idle(&self) -> bool {
        self.action_queue().is_empty()
    }
}

/// Lookup used by group operations to reach member actors.
pub trait ActorStore<A: Actor> {
    fn actor(&self, id: EntityId) -> Option<&A>;
    fn actor_mut(&mut self, id: EntityId) -> Option<&mut A>;
}

impl<A: Actor> ActorStore<A> for BTreeMap<EntityId, A> {
    fn actor(&self, id: EntityId) -> Option<&A> {
        self.get(&id)
    }

    fn actor_mut(&mut self, id: EntityId) -> Option<&mut A> {
        self.get_mut(&id)
    }
}

impl<A: Actor> ActorStore<A> for HashMap<EntityId, A> {
    fn actor(&self, id: EntityId) -> Option<&A> {
        self.get(&id)
    }

    fn actor_mut(&mut self, id: EntityId) -> Option<&mut A> {
        self.get_mut(&id)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;

    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::actions::FrameTime;

    #[derive(Debug)]
    pub(crate) struct TestActor {
        pub(crate) id: EntityId,
        pub(crate) position: Vec2,
        pub(crate) queue: ActionQueue<TestActor>,
        pub(crate) group: Option<GroupId>,
        pub(crate) facing: Option<Direction>,
        pub(crate) log: Vec<String>,
    }

    impl TestActor {
        pub(crate) fn new(id: u64, position: Vec2) -> Self {
            Self {
                id: EntityId(id),
                position,
                queue: ActionQueue::new(),
                group: None,
                facing: None,
                log: Vec::new(),
            }
        }
    }

    impl Actor for TestActor {
        fn id(&self) -> EntityId {
            self.id
        }

        fn position(&self) -> Vec2 {
            self.position
        }

        fn set_position(&mut self, position: Vec2) {
            self.position = position;
        }

        fn action_queue(&self) -> &ActionQueue<Self> {
            &self.queue
        }

        fn action_queue_mut(&mut self) -> &mut ActionQueue<Self> {
            &mut self.queue
        }

        fn parent_group(&self) -> Option<GroupId> {
            self.group
        }

        fn set_parent_group(&mut self, group: Option<GroupId>) {
            self.group = group;
        }

        fn face(&mut self, direction: Direction) {
            self.facing = Some(direction);
        }
    }

    pub(crate) fn actors(count: u64) -> BTreeMap<EntityId, TestActor> {
        (0..count)
            .map(|id| (EntityId(id), TestActor::new(id, Vec2::ZERO)))
            .collect()
    }

    /// Drives a closure with a tick context carrying `delta_seconds` and a seeded rng.
    pub(crate) struct Ticker {
        pub(crate) time: FrameTime,
        pub(crate) rng: SmallRng,
    }

    impl Ticker {
        pub(crate) fn new() -> Self {
            Self {
                time: FrameTime::default(),
                rng: SmallRng::seed_from_u64(42),
            }
        }

        pub(crate) fn tick<R>(
            &mut self,
            delta_seconds: f64,
            f: impl FnOnce(&mut TickContext<'_>) -> R,
        ) -> R {
            self.time = self.time.advance(delta_seconds);
            let mut ctx = TickContext {
                time: self.time,
                rng: &mut self.rng,
            };
            f(&mut ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn allocator_hands_out_sequential_ids() {
        let mut allocator = EntityIdAllocator::default();
        assert_eq!(allocator.allocate(), EntityId(0));
        assert_eq!(allocator.allocate(), EntityId(1));
    }

    #[test]
    fn btree_store_resolves_members() {
        let mut store = actors(3);
        assert!(store.actor(EntityId(2)).is_some());
        assert!(store.actor(EntityId(9)).is_none());
        store
            .actor_mut(EntityId(1))
            .expect("actor")
            .set_position(Vec2::new(1.0, 2.0));
        assert_eq!(store[&EntityId(1)].position(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn idle_until_something_is_enqueued() {
        let mut actor = TestActor::new(0, Vec2::ZERO);
        assert!(actor.is_idle());
        actor.enqueue_action(crate::actions::RoutingAction::between(
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
        ));
        assert!(!actor.is_idle());
    }
}
