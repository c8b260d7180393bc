use rand::Rng;
use tracing::{debug, warn};

use super::{
    Action, ActionConfigError, ActionCore, ActionKind, ActionStatus, Delayable, TickContext,
};
use crate::actor::{Actor, EntityId};
use crate::geometry::{Direction, Rect, Vec2};

/// One second per world unit.
pub const DEFAULT_SPEED_SECONDS_PER_UNIT: f64 = 1.0;

/// Snapshot of something an actor can be routed to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteTarget {
    pub id: Option<EntityId>,
    pub position: Vec2,
    /// Walkable sub-rectangle, relative to `position`.
    pub safe_zone: Option<Rect>,
}

impl RouteTarget {
    pub fn at(position: Vec2) -> Self {
        Self {
            id: None,
            position,
            safe_zone: None,
        }
    }

    /// Random point inside the safe zone, or the target position when it has none.
    pub fn point_within<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        match self.safe_zone {
            Some(zone) => zone
                .random_point(rng)
                .offset(self.position.x, self.position.y),
            None => self.position,
        }
    }

    /// Corner of the safe zone in world space.
    pub fn safe_zone_origin(&self) -> Vec2 {
        match self.safe_zone {
            Some(zone) => self.position.offset(zone.x, zone.y),
            None => self.position,
        }
    }
}

pub trait Targetable {
    fn route_target(&self) -> RouteTarget;
}

impl Targetable for RouteTarget {
    fn route_target(&self) -> RouteTarget {
        *self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingPhase {
    Waiting,
    Running,
    Complete,
}

/// Moves its actor from a start point to an end point over `distance * speed` seconds.
///
/// The start point is taken from the actor on the first tick after the delay, unless the
/// route was built from two explicit points. A target route picks its end point inside the
/// target's safe zone at that same moment, so every copy of a template lands somewhere
/// different.
pub struct RoutingAction<A> {
    core: ActionCore<A>,
    target: Option<RouteTarget>,
    starting_point: Option<Vec2>,
    explicit_start: bool,
    end_point: Option<Vec2>,
    speed: f64,
    seconds_delay: f64,
    elapsed: f64,
    phase: RoutingPhase,
    direction: Option<Direction>,
}

impl<A> std::fmt::Debug for RoutingAction<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingAction")
            .field("core", &self.core)
            .field("target", &self.target)
            .field("starting_point", &self.starting_point)
            .field("end_point", &self.end_point)
            .field("speed", &self.speed)
            .field("seconds_delay", &self.seconds_delay)
            .field("phase", &self.phase)
            .finish()
    }
}

impl<A: Actor> RoutingAction<A> {
    fn blank() -> Self {
        Self {
            core: ActionCore::new(),
            target: None,
            starting_point: None,
            explicit_start: false,
            end_point: None,
            speed: DEFAULT_SPEED_SECONDS_PER_UNIT,
            seconds_delay: 0.0,
            elapsed: 0.0,
            phase: RoutingPhase::Waiting,
            direction: None,
        }
    }

    pub fn to_target(destination: &impl Targetable) -> Self {
        Self {
            target: Some(destination.route_target()),
            ..Self::blank()
        }
    }

    pub fn between(start: Vec2, end: Vec2) -> Self {
        Self {
            starting_point: Some(start),
            explicit_start: true,
            end_point: Some(end),
            ..Self::blank()
        }
    }

    pub fn with_speed(mut self, seconds_per_unit: f64) -> Result<Self, ActionConfigError> {
        self.set_speed(seconds_per_unit)?;
        Ok(self)
    }

    pub fn with_delay(mut self, seconds: f64) -> Self {
        self.delay(seconds);
        self
    }

    pub fn set_speed(&mut self, seconds_per_unit: f64) -> Result<(), ActionConfigError> {
        if !seconds_per_unit.is_finite() || seconds_per_unit < 0.0 {
            return Err(ActionConfigError::InvalidSpeed {
                value: seconds_per_unit,
            });
        }
        self.speed = seconds_per_unit;
        Ok(())
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn target(&self) -> Option<&RouteTarget> {
        self.target.as_ref()
    }

    pub fn starting_point(&self) -> Option<Vec2> {
        self.starting_point
    }

    pub fn end_point(&self) -> Option<Vec2> {
        self.end_point
    }

    pub fn set_end_point(&mut self, end_point: Option<Vec2>) {
        self.end_point = end_point;
    }

    /// Pins the start point; `None` goes back to capturing it from the actor.
    pub fn set_starting_point(&mut self, starting_point: Option<Vec2>) {
        self.starting_point = starting_point;
        self.explicit_start = starting_point.is_some();
    }

    /// Copies the template's route endpoints onto this action.
    pub fn adopt_route_from(&mut self, template: &RoutingAction<A>) {
        self.end_point = template.end_point;
        self.starting_point = template.starting_point;
        self.explicit_start = template.explicit_start;
    }

    pub fn phase(&self) -> RoutingPhase {
        self.phase
    }

    /// Travel angle in degrees, once both endpoints are known.
    pub fn travel_angle(&self) -> Option<f32> {
        Some(Direction::travel_angle(self.starting_point?, self.end_point?))
    }

    pub fn travel_direction(&self) -> Option<Direction> {
        self.direction
            .or_else(|| self.travel_angle().map(Direction::from_angle_degrees))
    }

    fn begin_motion(&mut self, actor: &mut A, ctx: &mut TickContext<'_>) -> (Vec2, Vec2) {
        let start = match self.starting_point {
            Some(point) if self.explicit_start => point,
            _ => actor.position(),
        };
        let end = match (self.end_point, self.target) {
            (Some(point), _) => point,
            (None, Some(target)) => target.point_within(&mut *ctx.rng),
            (None, None) => start,
        };
        self.starting_point = Some(start);
        self.end_point = Some(end);
        self.phase = RoutingPhase::Running;

        let direction = Direction::between(start, end);
        self.direction = Some(direction);
        actor.face(direction);
        debug!(
            actor = actor.id().0,
            start_x = start.x,
            start_y = start.y,
            end_x = end.x,
            end_y = end.y,
            direction = direction.as_token(),
            "routing_started"
        );
        (start, end)
    }

    fn arrive(&mut self, actor: &mut A, end: Vec2) -> ActionStatus {
        actor.set_position(end);
        self.phase = RoutingPhase::Complete;
        debug!(
            actor = actor.id().0,
            destination = ?self.target.and_then(|target| target.id),
            "routing_completed"
        );
        ActionStatus::Completed
    }
}

impl<A: Actor> Action<A> for RoutingAction<A> {
    fn core(&self) -> &ActionCore<A> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore<A> {
        &mut self.core
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Routing
    }

    fn step(&mut self, actor: &mut A, ctx: &mut TickContext<'_>) -> ActionStatus {
        self.elapsed += ctx.time.delta_seconds;
        if self.elapsed < self.seconds_delay {
            return ActionStatus::Running;
        }

        let (start, end) = match (self.phase, self.starting_point, self.end_point) {
            (RoutingPhase::Waiting, _, _) => self.begin_motion(actor, ctx),
            (_, Some(start), Some(end)) => (start, end),
            _ => self.begin_motion(actor, ctx),
        };

        if self.core.is_complete() {
            return self.arrive(actor, end);
        }

        let eta = f64::from(start.distance_to(end)) * self.speed;
        if eta <= 0.0 {
            if start != end {
                warn!(actor = actor.id().0, "routing_zero_eta_teleport");
            }
            return self.arrive(actor, end);
        }

        let travelled = self.elapsed - self.seconds_delay.max(0.0);
        let progress = travelled / eta;
        if progress > 1.0 {
            return self.arrive(actor, end);
        }
        actor.set_position(start.lerp(end, progress as f32));
        ActionStatus::Running
    }

    fn duplicate(&self) -> Self {
        let resolves_from_target = self.target.is_some() && !self.explicit_start;
        Self {
            core: ActionCore::new(),
            target: self.target,
            starting_point: if self.explicit_start {
                self.starting_point
            } else {
                None
            },
            explicit_start: self.explicit_start,
            end_point: if resolves_from_target {
                None
            } else {
                self.end_point
            },
            speed: self.speed,
            seconds_delay: self.seconds_delay,
            elapsed: 0.0,
            phase: RoutingPhase::Waiting,
            direction: None,
        }
    }

    fn destination(&self) -> Option<EntityId> {
        self.target.and_then(|target| target.id)
    }

    fn as_routing(&self) -> Option<&RoutingAction<A>> {
        Some(self)
    }

    fn as_routing_mut(&mut self) -> Option<&mut RoutingAction<A>> {
        Some(self)
    }
}

impl<A: Actor> Delayable for RoutingAction<A> {
    fn seconds_delay(&self) -> f64 {
        self.seconds_delay
    }

    fn delay(&mut self, seconds: f64) {
        self.seconds_delay = seconds;
    }
}
