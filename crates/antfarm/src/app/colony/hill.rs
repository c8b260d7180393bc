use std::collections::BTreeSet;

use engine::{EntityId, Rect, RouteTarget, Targetable, Vec2};
use tracing::debug;

/// Walkable part of the hill sprite, relative to the hill position. The sprite is one unit
/// wide and two tall; ants drop food off around its entrance.
pub(crate) const HILL_SAFE_ZONE: Rect = Rect::new(0.25, 1.2, 0.5, 0.6);

#[derive(Debug, Clone)]
pub(crate) struct AntHill {
    id: EntityId,
    position: Vec2,
    safe_zone: Rect,
    /// The first ant that ever entered.
    queen: Option<EntityId>,
    inside: BTreeSet<EntityId>,
}

impl AntHill {
    pub(crate) fn new(id: EntityId, position: Vec2) -> Self {
        Self {
            id,
            position,
            safe_zone: HILL_SAFE_ZONE,
            queen: None,
            inside: BTreeSet::new(),
        }
    }

    pub(crate) fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn queen(&self) -> Option<EntityId> {
        self.queen
    }

    pub(crate) fn resting_ants(&self) -> usize {
        self.inside.len()
    }

    /// Returns false when the ant is already inside.
    pub(crate) fn enter(&mut self, ant: EntityId) -> bool {
        if !self.inside.insert(ant) {
            return false;
        }
        if self.queen.is_none() {
            self.queen = Some(ant);
            debug!(hill = self.id.0, ant = ant.0, "queen_crowned");
        }
        true
    }

    pub(crate) fn leave(&mut self, ant: EntityId) -> bool {
        self.inside.remove(&ant)
    }
}

impl Targetable for AntHill {
    fn route_target(&self) -> RouteTarget {
        RouteTarget {
            id: Some(self.id),
            position: self.position,
            safe_zone: Some(self.safe_zone),
        }
    }
}
