use std::collections::{BTreeMap, VecDeque};

use engine::{
    trigger_interaction, ActionGroup, Actor, EntityId, EntityIdAllocator, FrameTime, GroupId,
    GroupRegistry, Simulation, TickContext, Vec2,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::ant::{Ant, AntIntent};
use super::config::{ClickConfig, ColonyConfig, GroupSelection};
use super::food::{Food, FoodKind, TripPace};
use super::genetics::{Chromosome, Personality};
use super::hill::AntHill;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum MouseButton {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FoodSummary {
    pub(crate) id: EntityId,
    pub(crate) kind: FoodKind,
    pub(crate) position: Vec2,
    pub(crate) value: u32,
    pub(crate) sprite_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColonySummary {
    pub(crate) simulated_seconds: f64,
    pub(crate) ants: usize,
    pub(crate) ants_inside_hill: usize,
    pub(crate) peaceful_ants: usize,
    pub(crate) queens: Vec<EntityId>,
    pub(crate) busy_ants: usize,
    pub(crate) queued_actions: usize,
    pub(crate) held_worth: u32,
    pub(crate) groups: usize,
    pub(crate) current_group: Option<GroupId>,
    pub(crate) food: Vec<FoodSummary>,
}

/// Owns every entity of the colony and the group registry, and applies what ants ask for
/// after their ticks.
#[derive(Debug)]
pub(crate) struct World {
    ids: EntityIdAllocator,
    rng: SmallRng,
    hills: BTreeMap<EntityId, AntHill>,
    ants: BTreeMap<EntityId, Ant>,
    food: BTreeMap<EntityId, Food>,
    /// Food ids in spawn order, so scripted clicks can address food by index.
    food_order: Vec<EntityId>,
    groups: GroupRegistry<Ant>,
    pace: TripPace,
    simulated_seconds: f64,
}

impl World {
    pub(crate) fn new(seed: u64, pace: TripPace) -> Self {
        Self {
            ids: EntityIdAllocator::default(),
            rng: SmallRng::seed_from_u64(seed),
            hills: BTreeMap::new(),
            ants: BTreeMap::new(),
            food: BTreeMap::new(),
            food_order: Vec::new(),
            groups: GroupRegistry::new(),
            pace,
            simulated_seconds: 0.0,
        }
    }

    pub(crate) fn from_config(config: &ColonyConfig) -> Self {
        let mut world = Self::new(config.seed, config.trip_pace());
        let hill = world.spawn_hill(config.hill.position.to_vec2());
        for _ in 0..config.ant_count {
            world.spawn_ant(hill);
        }
        for food in &config.food {
            world.spawn_food(food.position.to_vec2(), food.kind);
        }
        info!(
            seed = config.seed,
            ants = world.ants.len(),
            food = world.food.len(),
            "colony_spawned"
        );
        world
    }

    pub(crate) fn spawn_hill(&mut self, position: Vec2) -> EntityId {
        let id = self.ids.allocate();
        self.hills.insert(id, AntHill::new(id, position));
        id
    }

    /// Spawns an ant inside `hill`. The hill's first ant becomes its queen and is purely
    /// peaceful; later ants are the queen's offspring with a random drone. Returns `None` when
    /// `hill` is unknown.
    pub(crate) fn spawn_ant(&mut self, hill: EntityId) -> Option<EntityId> {
        let hill = self.hills.get_mut(&hill)?;
        let queen = hill.queen().and_then(|queen| self.ants.get(&queen));
        let genetics = match queen {
            Some(queen) => {
                let drone = Chromosome::random(&mut self.rng);
                Chromosome::procreate(queen.genetics(), drone, &mut self.rng)
            }
            None => Chromosome::new(Personality::Peaceful, Personality::Peaceful),
        };
        let id = self.ids.allocate();
        let ant = Ant::new(id, hill, genetics);
        hill.enter(id);
        self.ants.insert(id, ant);
        Some(id)
    }

    pub(crate) fn spawn_food(&mut self, position: Vec2, kind: Option<FoodKind>) -> EntityId {
        let kind =
            kind.unwrap_or_else(|| FoodKind::ALL[self.rng.gen_range(0..FoodKind::ALL.len())]);
        let id = self.ids.allocate();
        self.food
            .insert(id, Food::new(id, kind, position, self.pace));
        self.food_order.push(id);
        id
    }

    #[cfg(test)]
    pub(crate) fn ant(&self, id: EntityId) -> Option<&Ant> {
        self.ants.get(&id)
    }

    pub(crate) fn ants(&self) -> impl Iterator<Item = &Ant> + '_ {
        self.ants.values()
    }

    #[cfg(test)]
    pub(crate) fn food(&self, id: EntityId) -> Option<&Food> {
        self.food.get(&id)
    }

    pub(crate) fn food_at(&self, index: usize) -> Option<EntityId> {
        self.food_order.get(index).copied()
    }

    #[cfg(test)]
    pub(crate) fn ant_mut(&mut self, id: EntityId) -> Option<&mut Ant> {
        self.ants.get_mut(&id)
    }

    #[cfg(test)]
    pub(crate) fn groups(&self) -> &GroupRegistry<Ant> {
        &self.groups
    }

    /// One tick: ants still inside their hill come out, every other ant runs its queue head,
    /// then the ant's recorded intents are applied.
    pub(crate) fn update(&mut self, time: FrameTime) {
        self.simulated_seconds = time.total_seconds;
        let ids: Vec<EntityId> = self.ants.keys().copied().collect();
        for id in ids {
            let Some(ant) = self.ants.get_mut(&id) else {
                continue;
            };
            if ant.is_inside_hill() {
                ant.exit_hill(&mut self.rng);
                if let Some(hill) = self.hills.get_mut(&ant.hill()) {
                    hill.leave(id);
                }
                continue;
            }
            let mut ctx = TickContext {
                time,
                rng: &mut self.rng,
            };
            ant.run_actions(&mut ctx);
            for intent in ant.take_intents() {
                self.apply_intent(id, intent);
            }
        }
    }

    fn apply_intent(&mut self, ant_id: EntityId, intent: AntIntent) {
        match intent {
            AntIntent::Harvest { food, amount } => {
                let Some(ant) = self.ants.get_mut(&ant_id) else {
                    warn!(ant = ant_id.0, "intent_from_unknown_ant");
                    return;
                };
                let Some(source) = self.food.get_mut(&food) else {
                    warn!(ant = ant_id.0, food = food.0, "harvest_unknown_food");
                    return;
                };
                if !source.harvest(ant, amount) {
                    debug!(ant = ant_id.0, food = food.0, "harvest_food_exhausted");
                }
            }
        }
    }

    /// Click entry point for food. The left button does nothing; the right button sends the
    /// current group on a gather trip, selecting every idle ant first when nothing is
    /// selected. Returns the group that was sent.
    pub(crate) fn food_clicked(
        &mut self,
        food: EntityId,
        button: MouseButton,
    ) -> Option<GroupId> {
        if button == MouseButton::Left {
            return None;
        }
        let Some(target) = self.food.get(&food) else {
            warn!(food = food.0, "clicked_unknown_food");
            return None;
        };
        trigger_interaction(&mut self.groups, &mut self.ants, target, idle_ants)
    }

    /// Registers a group of every ant with an empty queue.
    pub(crate) fn available_ants_group(&mut self) -> GroupId {
        let group = idle_ants(&mut self.ants);
        let id = group.id();
        self.groups.register(group);
        id
    }

    /// Registers a group of every ant.
    pub(crate) fn roaming_ants_group(&mut self) -> GroupId {
        let ids: Vec<EntityId> = self.ants.keys().copied().collect();
        self.groups.create_group(&mut self.ants, ids)
    }

    pub(crate) fn select_group(&mut self, id: GroupId) -> bool {
        self.groups.select(id)
    }

    /// Halves the current group and selects the half that was split off.
    pub(crate) fn split_current_group(&mut self) -> Option<GroupId> {
        let current = self.groups.current_group_id()?;
        let split = self.groups.split_group(&mut self.ants, current, 2)?;
        self.groups.select(split);
        Some(split)
    }

    pub(crate) fn summary(&self) -> ColonySummary {
        ColonySummary {
            simulated_seconds: self.simulated_seconds,
            ants: self.ants.len(),
            ants_inside_hill: self.hills.values().map(AntHill::resting_ants).sum(),
            peaceful_ants: self
                .ants
                .values()
                .filter(|ant| ant.personality() == Personality::Peaceful)
                .count(),
            queens: self.hills.values().filter_map(AntHill::queen).collect(),
            busy_ants: self.ants.values().filter(|ant| !ant.is_idle()).count(),
            queued_actions: self
                .ants
                .values()
                .map(|ant| ant.action_queue().len())
                .sum(),
            held_worth: self.ants.values().map(Ant::held_worth).sum(),
            groups: self.groups.len(),
            current_group: self.groups.current_group_id(),
            food: self
                .food
                .values()
                .map(|food| FoodSummary {
                    id: food.id(),
                    kind: food.kind(),
                    position: food.position(),
                    value: food.value(),
                    sprite_key: food.sprite_key().ok(),
                })
                .collect(),
        }
    }
}

fn idle_ants(ants: &mut BTreeMap<EntityId, Ant>) -> ActionGroup<Ant> {
    let idle: Vec<EntityId> = ants
        .values()
        .filter(|ant| ant.is_idle())
        .map(Actor::id)
        .collect();
    ActionGroup::with_members(ants, idle)
}

/// Drives a [`World`] from the loop runner and plays the scripted clicks.
#[derive(Debug)]
pub(crate) struct ColonySimulation {
    config: ColonyConfig,
    world: World,
    pending_clicks: VecDeque<ClickConfig>,
}

impl ColonySimulation {
    pub(crate) fn new(config: ColonyConfig) -> Self {
        let world = World::new(config.seed, config.trip_pace());
        Self {
            config,
            world,
            pending_clicks: VecDeque::new(),
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    fn fire_due_clicks(&mut self, now_seconds: f64) {
        while self
            .pending_clicks
            .front()
            .is_some_and(|click| click.at_seconds <= now_seconds)
        {
            let Some(click) = self.pending_clicks.pop_front() else {
                break;
            };
            match click.select {
                Some(GroupSelection::Available) => {
                    let group = self.world.available_ants_group();
                    self.world.select_group(group);
                }
                Some(GroupSelection::Roaming) => {
                    let group = self.world.roaming_ants_group();
                    self.world.select_group(group);
                }
                None => {}
            }
            if click.split_before {
                self.world.split_current_group();
            }
            let Some(food) = self.world.food_at(click.food) else {
                warn!(food_index = click.food, "scripted_click_unknown_food");
                continue;
            };
            let group = self.world.food_clicked(food, click.button);
            debug!(
                at_seconds = click.at_seconds,
                food = food.0,
                group = group.map(|id| id.0),
                "scripted_click"
            );
        }
    }
}

impl Simulation for ColonySimulation {
    fn load(&mut self) {
        self.world = World::from_config(&self.config);
        let mut clicks = self.config.clicks.clone();
        clicks.sort_by(|a, b| a.at_seconds.total_cmp(&b.at_seconds));
        self.pending_clicks = clicks.into();
    }

    fn update(&mut self, time: FrameTime) {
        self.fire_due_clicks(time.total_seconds);
        self.world.update(time);
    }

    fn unload(&mut self) {
        for ant in self.world.ants() {
            let position = ant.position();
            debug!(
                ant = ant.id().0,
                hill = ant.hill().0,
                x = position.x,
                y = position.y,
                facing = ant.facing().as_token(),
                personality = ant.personality().name(),
                sprite = ant.sprite_key(),
                items = ant.items().len(),
                queued = ant.action_queue().len(),
                "ant_state"
            );
        }
        let summary = self.world.summary();
        for food in &summary.food {
            info!(
                food = food.id.0,
                kind = food.kind.name(),
                x = food.position.x,
                y = food.position.y,
                value = food.value,
                sprite = food.sprite_key.as_deref().unwrap_or("-"),
                "food_state"
            );
        }
        info!(
            simulated_seconds = summary.simulated_seconds,
            ants = summary.ants,
            inside_hill = summary.ants_inside_hill,
            peaceful = summary.peaceful_ants,
            queens = summary.queens.len(),
            busy = summary.busy_ants,
            queued_actions = summary.queued_actions,
            held_worth = summary.held_worth,
            groups = summary.groups,
            current_group = summary.current_group.map(|id| id.0),
            "colony_summary"
        );
    }
}
