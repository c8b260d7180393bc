use tracing::info;

use super::{ActionGroup, GroupId, GroupRegistry};
use crate::actor::{Actor, ActorStore};

/// Something that scripts a multi-step action pipeline for a group when triggered.
pub trait Interactable<A: Actor> {
    fn interact<S: ActorStore<A>>(&self, group: &ActionGroup<A>, actors: &mut S);
}

/// Runs `target`'s interaction on the current group, selecting the group built by `fallback`
/// first when nothing is selected. Returns the group that received the pipeline.
pub fn trigger_interaction<A, S, I>(
    registry: &mut GroupRegistry<A>,
    actors: &mut S,
    target: &I,
    fallback: impl FnOnce(&mut S) -> ActionGroup<A>,
) -> Option<GroupId>
where
    A: Actor,
    S: ActorStore<A>,
    I: Interactable<A>,
{
    if registry.current_group().is_none() {
        let group = fallback(actors);
        registry.set_current_group(group);
    }
    let group = registry.current_group()?;
    info!(group = group.id().0, members = group.len(), "interaction_started");
    target.interact(group, actors);
    Some(group.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{
        repeat_callback, RepeatMode, RepeatTick, RepetitiveAction, RouteTarget, RoutingAction,
    };
    use crate::actor::test_support::{actors, TestActor, Ticker};
    use crate::actor::EntityId;
    use crate::geometry::Vec2;

    struct Beacon {
        position: Vec2,
    }

    impl Interactable<TestActor> for Beacon {
        fn interact<S: ActorStore<TestActor>>(
            &self,
            group: &ActionGroup<TestActor>,
            actors: &mut S,
        ) {
            group.enqueue_action_sequentially(
                actors,
                RoutingAction::to_target(&RouteTarget::at(self.position)),
                0.5,
            );
            let visit = RepetitiveAction::repeat_times(
                1,
                0.0,
                RepeatMode::Iterative,
                vec![repeat_callback(|actor: &mut TestActor, _: &RepeatTick| {
                    actor.log.push("visited".to_string());
                })],
            );
            if let Ok(visit) = visit {
                group.enqueue_action(actors, visit);
            }
        }
    }

    #[test]
    fn falls_back_when_nothing_is_selected() {
        let mut store = actors(3);
        let mut registry = GroupRegistry::new();
        let beacon = Beacon {
            position: Vec2::new(2.0, 0.0),
        };

        let id = trigger_interaction(&mut registry, &mut store, &beacon, |store| {
            ActionGroup::with_members(store, [EntityId(0), EntityId(1)])
        })
        .expect("group");

        assert_eq!(registry.current_group_id(), Some(id));
        assert_eq!(store[&EntityId(0)].action_queue().len(), 2);
        assert_eq!(store[&EntityId(1)].action_queue().len(), 2);
        assert!(store[&EntityId(2)].is_idle());
    }

    #[test]
    fn existing_selection_wins_over_fallback() {
        let mut store = actors(3);
        let mut registry = GroupRegistry::new();
        let selected = registry.create_group(&mut store, [EntityId(2)]);
        registry.select(selected);
        let beacon = Beacon {
            position: Vec2::new(1.0, 0.0),
        };

        let id = trigger_interaction(&mut registry, &mut store, &beacon, |_| {
            panic!("fallback must not run while a group is selected")
        });

        assert_eq!(id, Some(selected));
        assert!(store[&EntityId(0)].is_idle());
        assert_eq!(store[&EntityId(2)].action_queue().len(), 2);
    }

    #[test]
    fn pipeline_steps_run_in_scripted_order() {
        let mut store = actors(2);
        let mut registry = GroupRegistry::new();
        let beacon = Beacon {
            position: Vec2::new(1.0, 0.0),
        };
        trigger_interaction(&mut registry, &mut store, &beacon, |store| {
            ActionGroup::with_members(store, [EntityId(0), EntityId(1)])
        });
        let mut ticker = Ticker::new();

        for _ in 0..12 {
            ticker.tick(0.25, |ctx| {
                for actor in store.values_mut() {
                    actor.run_actions(ctx);
                }
            });
        }

        for actor in store.values() {
            assert_eq!(actor.position, Vec2::new(1.0, 0.0));
            assert_eq!(actor.log, vec!["visited"]);
            assert!(actor.is_idle());
        }
    }
}
