pub mod actions;
mod actor;
pub mod app;
mod geometry;
pub mod groups;
mod sprite_keys;

pub use actions::{
    repeat_callback, Action, ActionCompleted, ActionConfigError, ActionCore, ActionKind,
    ActionQueue, ActionStatus, CompletionObserver, Delayable, FrameTime, RepeatCallback,
    RepeatLimit, RepeatMode, RepeatOptions, RepeatTick, RepetitiveAction, RouteTarget,
    RoutingAction, RoutingPhase, Targetable, TickContext, DEFAULT_SPEED_SECONDS_PER_UNIT,
};
pub use actor::{Actor, ActorStore, EntityId, EntityIdAllocator};
pub use app::{
    run_simulation, Clock, LoopConfig, LoopMetricsSnapshot, LoopReport, ManualClock,
    MetricsHandle, Simulation, SystemClock,
};
pub use geometry::{Direction, Rect, Vec2};
pub use groups::{trigger_interaction, ActionGroup, GroupId, GroupRegistry, Interactable};
pub use sprite_keys::{direction_sprite_key, validate_sprite_key, SpriteKeyError};
