use std::rc::Rc;

use tracing::trace;

use super::{Action, ActionConfigError, ActionCore, ActionKind, ActionStatus, TickContext};
use crate::actor::Actor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatMode {
    /// Every callback fires on each repeat, in registration order.
    Iterative,
    /// One callback per repeat, round-robin.
    Cascade,
}

/// Exactly one termination rule is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepeatLimit {
    Times(u32),
    /// Completes on the first tick where time since start exceeds this many seconds.
    Duration(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatOptions {
    pub mode: RepeatMode,
    pub interval_seconds: f64,
    pub limit: RepeatLimit,
}

impl RepeatOptions {
    pub fn times(count: u32, interval_seconds: f64, mode: RepeatMode) -> Self {
        Self {
            mode,
            interval_seconds,
            limit: RepeatLimit::Times(count),
        }
    }

    pub fn for_duration(seconds: f64, interval_seconds: f64, mode: RepeatMode) -> Self {
        Self {
            mode,
            interval_seconds,
            limit: RepeatLimit::Duration(seconds),
        }
    }

    /// Repeat count, or -1 when the time limit is the active rule.
    pub fn repeat_amount(&self) -> i64 {
        match self.limit {
            RepeatLimit::Times(count) => i64::from(count),
            RepeatLimit::Duration(_) => -1,
        }
    }

    /// Time limit in seconds, or -1 when the repeat count is the active rule.
    pub fn time_limit(&self) -> f64 {
        match self.limit {
            RepeatLimit::Times(_) => -1.0,
            RepeatLimit::Duration(seconds) => seconds,
        }
    }

    fn validate(&self, callback_count: usize) -> Result<(), ActionConfigError> {
        if !self.interval_seconds.is_finite() || self.interval_seconds < 0.0 {
            return Err(ActionConfigError::InvalidInterval {
                value: self.interval_seconds,
            });
        }
        if let RepeatLimit::Duration(seconds) = self.limit {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(ActionConfigError::InvalidTimeLimit { value: seconds });
            }
        }
        if self.mode == RepeatMode::Cascade && callback_count == 0 {
            return Err(ActionConfigError::EmptyCascade);
        }
        Ok(())
    }
}

/// What a callback is told about the repeat it is part of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatTick {
    /// Zero-based repeat number.
    pub repetition: u32,
    pub callback_index: usize,
    pub time: super::FrameTime,
}

pub type RepeatCallback<A> = Rc<dyn Fn(&mut A, &RepeatTick)>;

pub fn repeat_callback<A>(callback: impl Fn(&mut A, &RepeatTick) + 'static) -> RepeatCallback<A> {
    Rc::new(callback)
}

pub struct RepetitiveAction<A> {
    core: ActionCore<A>,
    options: RepeatOptions,
    callbacks: Vec<RepeatCallback<A>>,
    elapsed: f64,
    time_since_start: f64,
    repeated: u32,
    cascade_index: usize,
}

impl<A> std::fmt::Debug for RepetitiveAction<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepetitiveAction")
            .field("core", &self.core)
            .field("options", &self.options)
            .field("callbacks", &self.callbacks.len())
            .field("repeated", &self.repeated)
            .field("time_since_start", &self.time_since_start)
            .finish()
    }
}

impl<A: Actor> RepetitiveAction<A> {
    pub fn new(
        options: RepeatOptions,
        callbacks: Vec<RepeatCallback<A>>,
    ) -> Result<Self, ActionConfigError> {
        options.validate(callbacks.len())?;
        Ok(Self {
            core: ActionCore::new(),
            options,
            callbacks,
            elapsed: 0.0,
            time_since_start: 0.0,
            repeated: 0,
            cascade_index: 0,
        })
    }

    pub fn repeat_times(
        count: u32,
        interval_seconds: f64,
        mode: RepeatMode,
        callbacks: Vec<RepeatCallback<A>>,
    ) -> Result<Self, ActionConfigError> {
        Self::new(RepeatOptions::times(count, interval_seconds, mode), callbacks)
    }

    pub fn with_time_limit(
        seconds: f64,
        interval_seconds: f64,
        mode: RepeatMode,
        callbacks: Vec<RepeatCallback<A>>,
    ) -> Result<Self, ActionConfigError> {
        Self::new(
            RepeatOptions::for_duration(seconds, interval_seconds, mode),
            callbacks,
        )
    }

    pub fn options(&self) -> &RepeatOptions {
        &self.options
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    pub fn repeated(&self) -> u32 {
        self.repeated
    }

    pub fn time_since_start(&self) -> f64 {
        self.time_since_start
    }

    fn dispatch(&mut self, actor: &mut A, ctx: &TickContext<'_>) {
        let mut tick = RepeatTick {
            repetition: self.repeated,
            callback_index: 0,
            time: ctx.time,
        };
        match self.options.mode {
            RepeatMode::Iterative => {
                for (index, callback) in self.callbacks.iter().enumerate() {
                    tick.callback_index = index;
                    callback(actor, &tick);
                }
            }
            RepeatMode::Cascade => {
                if self.callbacks.is_empty() {
                    return;
                }
                let index = self.cascade_index % self.callbacks.len();
                tick.callback_index = index;
                let callback = Rc::clone(&self.callbacks[index]);
                callback(actor, &tick);
                self.cascade_index = (index + 1) % self.callbacks.len();
            }
        }
    }

    fn limit_reached(&self) -> bool {
        match self.options.limit {
            RepeatLimit::Times(count) => self.repeated >= count,
            RepeatLimit::Duration(seconds) => self.time_since_start > seconds,
        }
    }
}

impl<A: Actor> Action<A> for RepetitiveAction<A> {
    fn core(&self) -> &ActionCore<A> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore<A> {
        &mut self.core
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Repetitive
    }

    fn step(&mut self, actor: &mut A, ctx: &mut TickContext<'_>) -> ActionStatus {
        if self.core.is_complete() {
            return ActionStatus::Completed;
        }

        self.elapsed += ctx.time.delta_seconds;
        if self.elapsed > self.options.interval_seconds {
            self.elapsed = 0.0;
            self.dispatch(actor, ctx);
            self.repeated = self.repeated.saturating_add(1);
            trace!(actor = actor.id().0, repeated = self.repeated, "repeat_fired");
        }
        self.time_since_start += ctx.time.delta_seconds;

        if self.limit_reached() {
            ActionStatus::Completed
        } else {
            ActionStatus::Running
        }
    }

    fn duplicate(&self) -> Self {
        Self {
            core: ActionCore::new(),
            options: self.options,
            callbacks: self.callbacks.clone(),
            elapsed: 0.0,
            time_since_start: 0.0,
            repeated: 0,
            cascade_index: 0,
        }
    }
}
