use std::collections::BTreeMap;

use tracing::{debug, info};

use super::{ActionGroup, GroupId};
use crate::actor::{Actor, ActorStore, EntityId};

/// Directory of live groups for one actor type, plus the current selection.
///
/// Owned by whatever context needs to resolve "the selected group"; there is one registry per
/// actor category. Removing a group from the registry disposes of it.
pub struct GroupRegistry<A> {
    groups: BTreeMap<GroupId, ActionGroup<A>>,
    current: Option<GroupId>,
}

impl<A> std::fmt::Debug for GroupRegistry<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupRegistry")
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish()
    }
}

impl<A: Actor> Default for GroupRegistry<A> {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
            current: None,
        }
    }
}

impl<A: Actor> GroupRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_group_id(&self) -> Option<GroupId> {
        self.current
    }

    pub fn current_group(&self) -> Option<&ActionGroup<A>> {
        self.current.and_then(|id| self.groups.get(&id))
    }

    pub fn current_group_mut(&mut self) -> Option<&mut ActionGroup<A>> {
        let id = self.current?;
        self.groups.get_mut(&id)
    }

    /// Makes `group` current, registering it first.
    pub fn set_current_group(&mut self, group: ActionGroup<A>) -> GroupId {
        let id = group.id();
        if !self.groups.contains_key(&id) {
            self.register(group);
        }
        self.current = Some(id);
        debug!(group = id.0, "group_selected");
        id
    }

    /// Selects an already registered group. Returns false for unknown ids.
    pub fn select(&mut self, id: GroupId) -> bool {
        if !self.groups.contains_key(&id) {
            return false;
        }
        self.current = Some(id);
        debug!(group = id.0, "group_selected");
        true
    }

    pub fn clear_selection(&mut self) {
        self.current = None;
    }

    pub fn create_group<S: ActorStore<A>>(
        &mut self,
        actors: &mut S,
        members: impl IntoIterator<Item = EntityId>,
    ) -> GroupId {
        let group = ActionGroup::with_members(actors, members);
        let id = group.id();
        self.register(group);
        id
    }

    /// Returns false, leaving the registry untouched, when the id is already registered.
    pub fn register(&mut self, group: ActionGroup<A>) -> bool {
        let id = group.id();
        if self.groups.contains_key(&id) {
            return false;
        }
        info!(group = id.0, members = group.len(), "group_created");
        self.groups.insert(id, group);
        true
    }

    /// Disposes of a group. Clears the selection when it pointed at this group; members keep
    /// their queues and back-references.
    pub fn remove_group(&mut self, id: GroupId) -> Option<ActionGroup<A>> {
        let group = self.groups.remove(&id)?;
        if self.current == Some(id) {
            self.current = None;
        }
        info!(group = id.0, members = group.len(), "group_removed");
        Some(group)
    }

    /// Splits a registered group and registers the new part. Returns the new group's id.
    pub fn split_group<S: ActorStore<A>>(
        &mut self,
        actors: &mut S,
        id: GroupId,
        divisor: usize,
    ) -> Option<GroupId> {
        let group = self.groups.get_mut(&id)?;
        let other = group.split_off(actors, divisor);
        let remaining = group.len();
        let other_id = other.id();
        info!(
            group = id.0,
            new_group = other_id.0,
            remaining,
            moved = other.len(),
            "group_split"
        );
        self.register(other);
        Some(other_id)
    }

    pub fn group(&self, id: GroupId) -> Option<&ActionGroup<A>> {
        self.groups.get(&id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut ActionGroup<A>> {
        self.groups.get_mut(&id)
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.groups.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionGroup<A>> + '_ {
        self.groups.values()
    }
}
