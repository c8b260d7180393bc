use engine::{
    repeat_callback, validate_sprite_key, ActionConfigError, ActionGroup, Actor, ActorStore,
    EntityId, Interactable, Rect, RepeatMode, RepeatTick, RepetitiveAction, RouteTarget,
    RoutingAction, SpriteKeyError, Targetable, Vec2,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::ant::{Ant, AntIntent, FoodItem};

/// Walkable part of a food sprite, relative to the food position.
pub(crate) const FOOD_SAFE_ZONE: Rect = Rect::new(0.1, 0.15, 0.4, 0.3);
const HARVEST_AMOUNT: u32 = 1;
const STEP_INTERVAL_SECONDS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FoodKind {
    Apple,
    Watermelon,
}

impl FoodKind {
    pub(crate) const ALL: [FoodKind; 2] = [FoodKind::Apple, FoodKind::Watermelon];

    pub(crate) fn max_value(self) -> u32 {
        match self {
            Self::Apple => 50,
            Self::Watermelon => 75,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Apple => "apple",
            Self::Watermelon => "watermelon",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FoodStage {
    Full,
    ThreeQuarters,
    Half,
    Quarter,
}

impl FoodStage {
    fn sprite_suffix(self) -> &'static str {
        match self {
            Self::Full => "",
            Self::ThreeQuarters => "_34",
            Self::Half => "_half",
            Self::Quarter => "_14",
        }
    }
}

/// How a gather trip moves: one speed for every ant, and the stagger between ants walking in
/// a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TripPace {
    pub(crate) speed_seconds_per_unit: f64,
    pub(crate) line_interval_seconds: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct Food {
    id: EntityId,
    kind: FoodKind,
    value: u32,
    position: Vec2,
    pace: TripPace,
}

impl Food {
    pub(crate) fn new(id: EntityId, kind: FoodKind, position: Vec2, pace: TripPace) -> Self {
        Self {
            id,
            kind,
            value: kind.max_value(),
            position,
            pace,
        }
    }

    pub(crate) fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn kind(&self) -> FoodKind {
        self.kind
    }

    pub(crate) fn value(&self) -> u32 {
        self.value
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    /// Hands `holder` an item worth `amount`. Fails once the food is used up.
    pub(crate) fn harvest(&mut self, holder: &mut Ant, amount: u32) -> bool {
        if self.value == 0 {
            return false;
        }
        holder.equip(FoodItem { worth: amount });
        self.value = self.value.saturating_sub(amount);
        debug!(
            food = self.id.0,
            ant = holder.id().0,
            amount,
            remaining = self.value,
            "food_harvested"
        );
        true
    }

    pub(crate) fn stage(&self) -> FoodStage {
        let max = self.kind.max_value();
        if self.value > max * 3 / 4 {
            FoodStage::Full
        } else if self.value > max / 2 {
            FoodStage::ThreeQuarters
        } else if self.value > 0 {
            FoodStage::Half
        } else {
            FoodStage::Quarter
        }
    }

    pub(crate) fn sprite_key(&self) -> Result<String, SpriteKeyError> {
        let key = format!(
            "objects/{}{}",
            self.kind.name(),
            self.stage().sprite_suffix()
        );
        validate_sprite_key(&key)?;
        Ok(key)
    }

    /// Queues the full gather trip on every member of `group`: walk in line to the food,
    /// spread out over it, harvest once, walk in line back home, drop everything.
    ///
    /// Every ant starts each leg from wherever it is when the leg begins. `home` is shared by
    /// the whole group.
    fn enqueue_gather_trip<S: ActorStore<Ant>>(
        &self,
        group: &ActionGroup<Ant>,
        actors: &mut S,
        home: RouteTarget,
    ) -> Result<(), ActionConfigError> {
        let speed = self.pace.speed_seconds_per_unit;
        let interval = self.pace.line_interval_seconds;
        let food = self.route_target();

        // Everything is built before anything is queued, so a rejected step leaves queues as
        // they were.
        let line_to_food = RoutingAction::to_target(&RouteTarget::at(food.safe_zone_origin()))
            .with_speed(speed)?;
        let onto_food = RoutingAction::to_target(&food).with_speed(speed)?;
        let food_id = self.id;
        let harvest = RepetitiveAction::repeat_times(
            1,
            STEP_INTERVAL_SECONDS,
            RepeatMode::Iterative,
            vec![repeat_callback(move |ant: &mut Ant, _: &RepeatTick| {
                ant.record_intent(AntIntent::Harvest {
                    food: food_id,
                    amount: HARVEST_AMOUNT,
                });
            })],
        )?;
        let line_to_hill = RoutingAction::to_target(&RouteTarget::at(home.safe_zone_origin()))
            .with_speed(speed)?;
        let into_hill = RoutingAction::to_target(&home).with_speed(speed)?;
        let drop_off = RepetitiveAction::repeat_times(
            1,
            STEP_INTERVAL_SECONDS,
            RepeatMode::Iterative,
            vec![repeat_callback(|ant: &mut Ant, _: &RepeatTick| {
                ant.drop_all();
            })],
        )?;

        group.enqueue_action_sequentially(actors, line_to_food, interval);
        group.enqueue_action(actors, onto_food);
        group.enqueue_action(actors, harvest);
        group.enqueue_action_sequentially(actors, line_to_hill, interval);
        group.enqueue_action(actors, into_hill);
        group.enqueue_action(actors, drop_off);
        Ok(())
    }
}

impl Targetable for Food {
    fn route_target(&self) -> RouteTarget {
        RouteTarget {
            id: Some(self.id),
            position: self.position,
            safe_zone: Some(FOOD_SAFE_ZONE),
        }
    }
}

impl Interactable<Ant> for Food {
    fn interact<S: ActorStore<Ant>>(&self, group: &ActionGroup<Ant>, actors: &mut S) {
        let Some(home) = group
            .members()
            .find_map(|id| actors.actor(id))
            .map(Ant::home)
        else {
            warn!(food = self.id.0, group = group.id().0, "interaction_without_ants");
            return;
        };
        match self.enqueue_gather_trip(group, actors, home) {
            Ok(()) => info!(
                food = self.id.0,
                kind = self.kind.name(),
                group = group.id().0,
                ants = group.len(),
                "gather_trip_queued"
            ),
            Err(error) => warn!(food = self.id.0, error = %error, "gather_trip_rejected"),
        }
    }
}
