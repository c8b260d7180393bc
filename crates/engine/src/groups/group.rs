use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use super::{GroupId, GroupRegistry};
use crate::actions::{Action, Delayable};
use crate::actor::{Actor, ActorStore, EntityId};

/// A deduplicated set of actors that receive broadcast actions together.
///
/// Members are enumerated in ascending id order; that order drives both staggering and
/// splitting. Each member's back-reference points at the last group that added it.
pub struct ActionGroup<A> {
    id: GroupId,
    members: BTreeSet<EntityId>,
    _actor: PhantomData<fn() -> A>,
}

impl<A> fmt::Debug for ActionGroup<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionGroup")
            .field("id", &self.id)
            .field("members", &self.members)
            .finish()
    }
}

impl<A: Actor> Default for ActionGroup<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Actor> ActionGroup<A> {
    pub fn new() -> Self {
        Self::with_id(GroupId::allocate())
    }

    pub(crate) fn with_id(id: GroupId) -> Self {
        Self {
            id,
            members: BTreeSet::new(),
            _actor: PhantomData,
        }
    }

    /// Builds a group and adds every id that resolves in `actors`.
    pub fn with_members<S: ActorStore<A>>(
        actors: &mut S,
        members: impl IntoIterator<Item = EntityId>,
    ) -> Self {
        let mut group = Self::new();
        for id in members {
            group.add(actors, id);
        }
        group
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    pub fn members(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }

    /// Adds `id` and points its back-reference here. Returns false when the actor is unknown
    /// or already a member; a known actor's back-reference is updated either way.
    pub fn add<S: ActorStore<A>>(&mut self, actors: &mut S, id: EntityId) -> bool {
        let Some(actor) = actors.actor_mut(id) else {
            return false;
        };
        actor.set_parent_group(Some(self.id));
        self.members.insert(id)
    }

    /// Drops `id` from the group and clears its back-reference. In-flight actions keep
    /// running.
    pub fn remove<S: ActorStore<A>>(&mut self, actors: &mut S, id: EntityId) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        if let Some(actor) = actors.actor_mut(id) {
            actor.set_parent_group(None);
        }
        true
    }

    pub fn is_active_in(&self, registry: &GroupRegistry<A>) -> bool {
        registry.current_group_id() == Some(self.id)
    }

    /// Enqueues a fresh copy of `template` on every member and hands the template back
    /// unbound.
    pub fn enqueue_action<T, S>(&self, actors: &mut S, template: T) -> T
    where
        T: Action<A>,
        S: ActorStore<A>,
    {
        let mut delivered = 0usize;
        for id in &self.members {
            if let Some(actor) = actors.actor_mut(*id) {
                actor.enqueue_action(template.duplicate());
                delivered += 1;
            }
        }
        debug!(
            group = self.id.0,
            kind = %template.kind(),
            delivered,
            "group_broadcast"
        );
        template
    }

    /// Like [`enqueue_action`](Self::enqueue_action), but the member at enumeration index
    /// `k` starts `interval_seconds * k` later. Routing endpoints of the template are copied
    /// onto every copy.
    pub fn enqueue_action_sequentially<T, S>(
        &self,
        actors: &mut S,
        template: T,
        interval_seconds: f64,
    ) -> T
    where
        T: Action<A> + Delayable,
        S: ActorStore<A>,
    {
        for (index, id) in self.members.iter().enumerate() {
            let Some(actor) = actors.actor_mut(*id) else {
                continue;
            };
            let mut copy = template.duplicate();
            if let (Some(source), Some(route)) = (template.as_routing(), copy.as_routing_mut()) {
                route.adopt_route_from(source);
            }
            copy.delay(interval_seconds * index as f64);
            actor.enqueue_action(copy);
        }
        debug!(
            group = self.id.0,
            kind = %template.kind(),
            members = self.members.len(),
            interval_seconds,
            "group_broadcast_staggered"
        );
        template
    }

    /// Empties every member's queue without completion logic. Returns the number of actions
    /// dropped.
    pub fn clear_all_queues<S: ActorStore<A>>(&self, actors: &mut S) -> usize {
        let mut dropped = 0;
        for id in &self.members {
            if let Some(actor) = actors.actor_mut(*id) {
                dropped += actor.action_queue_mut().clear();
            }
        }
        dropped
    }

    /// Moves the first `len / divisor` members (enumeration order) into a new group.
    /// A divisor of zero is treated as one.
    pub fn split_off<S: ActorStore<A>>(&mut self, actors: &mut S, divisor: usize) -> Self {
        let moving = self.members.len() / divisor.max(1);
        let moved: Vec<EntityId> = self.members.iter().take(moving).copied().collect();
        let mut other = Self::new();
        for id in moved {
            self.members.remove(&id);
            other.members.insert(id);
            if let Some(actor) = actors.actor_mut(id) {
                actor.set_parent_group(Some(other.id));
            }
        }
        other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{
        repeat_callback, ActionStatus, RepeatMode, RepeatTick, RepetitiveAction, RoutingAction,
    };
    use crate::actor::test_support::{actors, TestActor, Ticker};
    use crate::geometry::Vec2;

    #[test]
    fn membership_is_deduplicated_and_sets_back_reference() {
        let mut store = actors(3);
        let mut group = ActionGroup::new();

        assert!(group.add(&mut store, EntityId(1)));
        assert!(!group.add(&mut store, EntityId(1)));
        assert!(!group.add(&mut store, EntityId(42)));

        assert_eq!(group.len(), 1);
        assert_eq!(store[&EntityId(1)].parent_group(), Some(group.id()));
        assert_eq!(store[&EntityId(0)].parent_group(), None);
    }

    #[test]
    fn last_group_to_add_wins_back_reference() {
        let mut store = actors(1);
        let mut first = ActionGroup::new();
        let mut second = ActionGroup::new();

        first.add(&mut store, EntityId(0));
        second.add(&mut store, EntityId(0));

        assert!(first.contains(EntityId(0)));
        assert_eq!(store[&EntityId(0)].parent_group(), Some(second.id()));

        assert!(first.remove(&mut store, EntityId(0)));
        assert_eq!(store[&EntityId(0)].parent_group(), None);
        assert!(!first.remove(&mut store, EntityId(0)));
    }

    #[test]
    fn broadcast_enqueues_unbound_copies_and_returns_template() {
        let mut store = actors(3);
        let group = ActionGroup::with_members(&mut store, [EntityId(0), EntityId(2)]);

        let template = group.enqueue_action(
            &mut store,
            RoutingAction::between(Vec2::ZERO, Vec2::new(1.0, 0.0)),
        );

        assert_eq!(template.subject(), None);
        assert_eq!(store[&EntityId(0)].action_queue().len(), 1);
        assert_eq!(store[&EntityId(1)].action_queue().len(), 0);
        assert_eq!(
            store[&EntityId(2)]
                .action_queue()
                .head()
                .and_then(|head| head.subject()),
            Some(EntityId(2))
        );
    }

    #[test]
    fn sequential_broadcast_staggers_by_enumeration_index() {
        let mut store = actors(3);
        let group =
            ActionGroup::with_members(&mut store, [EntityId(2), EntityId(0), EntityId(1)]);

        let template = group.enqueue_action_sequentially(
            &mut store,
            RoutingAction::between(Vec2::ZERO, Vec2::new(5.0, 0.0)),
            0.5,
        );

        assert_eq!(template.seconds_delay(), 0.0);
        let delays: Vec<f64> = (0..3)
            .map(|id| {
                store[&EntityId(id)]
                    .action_queue()
                    .head()
                    .and_then(|head| head.as_routing())
                    .map(|route| route.seconds_delay())
                    .expect("routing head")
            })
            .collect();
        assert_eq!(delays, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn sequential_broadcast_propagates_route_endpoints() {
        let mut store = actors(2);
        let group = ActionGroup::with_members(&mut store, [EntityId(0), EntityId(1)]);
        let end = Vec2::new(3.0, 4.0);

        group.enqueue_action_sequentially(
            &mut store,
            RoutingAction::between(Vec2::new(1.0, 1.0), end),
            0.25,
        );

        for actor in store.values() {
            let route = actor
                .action_queue()
                .head()
                .and_then(|head| head.as_routing())
                .expect("routing head");
            assert_eq!(route.starting_point(), Some(Vec2::new(1.0, 1.0)));
            assert_eq!(route.end_point(), Some(end));
        }
    }

    #[test]
    fn staggered_members_start_moving_in_line() {
        let mut store = actors(3);
        let ids: Vec<EntityId> = store.keys().copied().collect();
        let group = ActionGroup::with_members(&mut store, ids);
        group.enqueue_action_sequentially(
            &mut store,
            RoutingAction::between(Vec2::ZERO, Vec2::new(8.0, 0.0)),
            1.0,
        );
        let mut ticker = Ticker::new();

        for _ in 0..3 {
            ticker.tick(0.5, |ctx| {
                for actor in store.values_mut() {
                    actor.run_actions(ctx);
                }
            });
        }

        let xs: Vec<f32> = store.values().map(|actor| actor.position.x).collect();
        assert_eq!(xs, vec![1.5, 0.5, 0.0]);
    }

    #[test]
    fn clear_all_queues_drops_everything_without_observers() {
        let mut store = actors(2);
        let group = ActionGroup::with_members(&mut store, [EntityId(0), EntityId(1)]);
        let mut template =
            RepetitiveAction::repeat_times(1, 0.0, RepeatMode::Iterative, Vec::new())
                .expect("valid options");
        template.on_completed(|actor: &mut TestActor, _| actor.log.push("completed".to_string()));
        let template = group.enqueue_action(&mut store, template);
        group.enqueue_action(&mut store, template);

        assert_eq!(group.clear_all_queues(&mut store), 4);

        let mut ticker = Ticker::new();
        ticker.tick(1.0, |ctx| {
            for actor in store.values_mut() {
                assert_eq!(actor.run_actions(ctx), None);
                assert!(actor.log.is_empty());
            }
        });
    }

    #[test]
    fn copies_do_not_inherit_template_observers() {
        let mut store = actors(1);
        let group = ActionGroup::with_members(&mut store, [EntityId(0)]);
        let mut template = RepetitiveAction::repeat_times(
            1,
            0.0,
            RepeatMode::Iterative,
            vec![repeat_callback(|actor: &mut TestActor, _: &RepeatTick| {
                actor.log.push("repeat".to_string());
            })],
        )
        .expect("valid options");
        template.on_completed(|actor: &mut TestActor, _| {
            actor.log.push("template observer".to_string());
        });
        group.enqueue_action(&mut store, template);
        let mut ticker = Ticker::new();

        let status = ticker.tick(0.1, |ctx| {
            store
                .get_mut(&EntityId(0))
                .and_then(|actor| actor.run_actions(ctx))
        });

        assert_eq!(status, Some(ActionStatus::Completed));
        assert_eq!(store[&EntityId(0)].log, vec!["repeat"]);
    }

    #[test]
    fn split_partitions_without_loss_or_duplication() {
        for count in [0u64, 1, 2, 5, 8] {
            let mut store = actors(count);
            let ids: Vec<EntityId> = store.keys().copied().collect();
            let mut group = ActionGroup::with_members(&mut store, ids);

            let other = group.split_off(&mut store, 2);

            assert_eq!(other.len(), (count / 2) as usize);
            assert_eq!(group.len() + other.len(), count as usize);
            for id in store.keys() {
                assert!(group.contains(*id) ^ other.contains(*id), "id={id:?}");
                let expected = if other.contains(*id) {
                    other.id()
                } else {
                    group.id()
                };
                assert_eq!(store[id].parent_group(), Some(expected));
            }
        }
    }

    #[test]
    fn split_by_zero_moves_everyone() {
        let mut store = actors(3);
        let ids = [EntityId(0), EntityId(1), EntityId(2)];
        let mut group = ActionGroup::with_members(&mut store, ids);

        let other = group.split_off(&mut store, 0);

        assert!(group.is_empty());
        assert_eq!(other.members().collect::<Vec<_>>(), ids.to_vec());
    }
}
