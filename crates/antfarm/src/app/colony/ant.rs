use engine::{
    direction_sprite_key, ActionQueue, Actor, Direction, EntityId, GroupId, RouteTarget,
    Targetable, Vec2,
};
use rand::Rng;
use tracing::{debug, warn};

use super::genetics::{Chromosome, Personality};
use super::hill::AntHill;

const ANT_SPRITE_PREFIX: &str = "ants/ant";
/// Ants leave the hill somewhere within this distance of its position, on each axis.
const HILL_EXIT_SPREAD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FoodItem {
    pub(crate) worth: u32,
}

/// Side effects an ant's actions ask the world to perform after the ant's tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AntIntent {
    Harvest { food: EntityId, amount: u32 },
}

#[derive(Debug)]
pub(crate) struct Ant {
    id: EntityId,
    position: Vec2,
    facing: Direction,
    sprite_key: String,
    genetics: Chromosome,
    queue: ActionQueue<Ant>,
    parent_group: Option<GroupId>,
    items: Vec<FoodItem>,
    hill: EntityId,
    home: RouteTarget,
    inside_hill: bool,
    intents: Vec<AntIntent>,
}

impl Ant {
    /// A new ant starts inside `hill`. The caller records it as entered.
    pub(crate) fn new(id: EntityId, hill: &AntHill, genetics: Chromosome) -> Self {
        Self {
            id,
            position: hill.position(),
            facing: Direction::SW,
            sprite_key: format!("{ANT_SPRITE_PREFIX}_sw"),
            genetics,
            queue: ActionQueue::new(),
            parent_group: None,
            items: Vec::new(),
            hill: hill.id(),
            home: hill.route_target(),
            inside_hill: true,
            intents: Vec::new(),
        }
    }

    pub(crate) fn is_inside_hill(&self) -> bool {
        self.inside_hill
    }

    /// Moves the ant out of its hill to a random spot next to it.
    pub(crate) fn exit_hill<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let dx = rng.gen_range(-HILL_EXIT_SPREAD..=HILL_EXIT_SPREAD);
        let dy = rng.gen_range(-HILL_EXIT_SPREAD..=HILL_EXIT_SPREAD);
        self.position = self.home.position.offset(dx, dy);
        self.inside_hill = false;
        debug!(
            ant = self.id.0,
            hill = self.hill.0,
            x = self.position.x,
            y = self.position.y,
            "ant_exited_hill"
        );
    }

    pub(crate) fn hill(&self) -> EntityId {
        self.hill
    }

    pub(crate) fn home(&self) -> RouteTarget {
        self.home
    }

    pub(crate) fn facing(&self) -> Direction {
        self.facing
    }

    pub(crate) fn sprite_key(&self) -> &str {
        &self.sprite_key
    }

    pub(crate) fn genetics(&self) -> Chromosome {
        self.genetics
    }

    pub(crate) fn personality(&self) -> Personality {
        self.genetics.exhibited()
    }

    pub(crate) fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub(crate) fn held_worth(&self) -> u32 {
        self.items.iter().map(|item| item.worth).sum()
    }

    pub(crate) fn equip(&mut self, item: FoodItem) {
        self.items.push(item);
    }

    pub(crate) fn drop_item(&mut self, index: usize) -> Option<FoodItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Empties the ant's hands, last item first. Returns how many items were dropped.
    pub(crate) fn drop_all(&mut self) -> usize {
        let mut dropped = 0;
        while let Some(last) = self.items.len().checked_sub(1) {
            self.drop_item(last);
            dropped += 1;
        }
        debug!(ant = self.id.0, dropped, "items_dropped");
        dropped
    }

    pub(crate) fn record_intent(&mut self, intent: AntIntent) {
        self.intents.push(intent);
    }

    pub(crate) fn take_intents(&mut self) -> Vec<AntIntent> {
        std::mem::take(&mut self.intents)
    }
}

impl Actor for Ant {
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
        self.parent_group
    }

    fn set_parent_group(&mut self, group: Option<GroupId>) {
        self.parent_group = group;
    }

    fn face(&mut self, direction: Direction) {
        self.facing = direction;
        match direction_sprite_key(ANT_SPRITE_PREFIX, direction) {
            Ok(key) => self.sprite_key = key,
            Err(error) => warn!(ant = self.id.0, error = %error, "ant_sprite_key_rejected"),
        }
    }
}
