use std::time::Duration;

use tracing::{info, warn};

use super::metrics::MetricsAccumulator;
use super::{Clock, MetricsHandle, Simulation};
use crate::actions::FrameTime;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// Stop once this much simulated time has been ticked. `None` runs until the simulation
    /// reports it is finished.
    pub run_for: Option<Duration>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            run_for: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopReport {
    pub frames: u64,
    pub ticks: u64,
    pub simulated: Duration,
    pub dropped_backlog: Duration,
}

/// Drives `simulation` with a fixed timestep until it finishes or `run_for` is reached.
///
/// Each frame reads `clock`, clamps the frame delta, and runs at most
/// `max_ticks_per_frame` ticks; any backlog beyond that is dropped.
pub fn run_simulation<S, C>(
    config: &LoopConfig,
    simulation: &mut S,
    clock: &mut C,
    metrics_handle: &MetricsHandle,
) -> LoopReport
where
    S: Simulation + ?Sized,
    C: Clock + ?Sized,
{
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f64();

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        run_for_ms = config.run_for.map(|limit| limit.as_millis() as u64),
        "loop_config"
    );

    simulation.load();
    info!("simulation_loaded");

    let mut report = LoopReport::default();
    let mut time = FrameTime::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame = clock.now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, last_frame);

    'frames: loop {
        if simulation.is_finished() {
            info!(reason = "simulation_finished", "shutdown_requested");
            break;
        }
        if run_for_reached(config.run_for, report.simulated) {
            info!(reason = "run_for_elapsed", "shutdown_requested");
            break;
        }

        let now = clock.now();
        let raw_frame_dt = now.saturating_sub(last_frame);
        last_frame = now;
        report.frames = report.frames.saturating_add(1);

        let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
        accumulator = accumulator.saturating_add(clamped_frame_dt);

        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        for _ in 0..step_plan.ticks_to_run {
            time = time.advance(fixed_dt_seconds);
            simulation.update(time);
            report.ticks = report.ticks.saturating_add(1);
            report.simulated = report.simulated.saturating_add(fixed_dt);
            metrics_accumulator.record_tick();
            if simulation.is_finished() || run_for_reached(config.run_for, report.simulated) {
                continue 'frames;
            }
        }
        accumulator = step_plan.remaining_accumulator;

        if step_plan.dropped_backlog > Duration::ZERO {
            report.dropped_backlog = report
                .dropped_backlog
                .saturating_add(step_plan.dropped_backlog);
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        metrics_accumulator.record_frame(raw_frame_dt);
        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
            metrics_handle.publish(snapshot);
            info!(
                tps = snapshot.tps,
                ticks = snapshot.ticks,
                frame_time_ms = snapshot.frame_time_ms,
                simulated_seconds = time.total_seconds,
                "loop_metrics"
            );
        }

        clock.wait(fixed_dt.saturating_sub(accumulator));
    }

    simulation.unload();
    info!(
        frames = report.frames,
        ticks = report.ticks,
        simulated_seconds = report.simulated.as_secs_f64(),
        "shutdown"
    );
    report
}

fn run_for_reached(run_for: Option<Duration>, simulated: Duration) -> bool {
    run_for.is_some_and(|limit| simulated >= limit)
}

struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ManualClock;

    #[derive(Default)]
    struct Recorder {
        loaded: bool,
        unloaded: bool,
        updates: Vec<FrameTime>,
        finish_after: Option<usize>,
    }

    impl Simulation for Recorder {
        fn load(&mut self) {
            self.loaded = true;
        }

        fn update(&mut self, time: FrameTime) {
            self.updates.push(time);
        }

        fn unload(&mut self) {
            self.unloaded = true;
        }

        fn is_finished(&self) -> bool {
            self.finish_after
                .is_some_and(|limit| self.updates.len() >= limit)
        }
    }

    fn config(run_for: Option<Duration>) -> LoopConfig {
        LoopConfig {
            target_tps: 10,
            run_for,
            ..LoopConfig::default()
        }
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn normalize_replaces_zero_durations() {
        let fallback = Duration::from_secs(1);
        assert_eq!(normalize_non_zero_duration(Duration::ZERO, fallback), fallback);
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(5), fallback),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn runs_until_simulated_limit_with_fixed_steps() {
        let mut recorder = Recorder::default();
        let mut clock = ManualClock::new(Duration::from_millis(100));

        let report = run_simulation(
            &config(Some(Duration::from_secs(2))),
            &mut recorder,
            &mut clock,
            &MetricsHandle::default(),
        );

        assert!(recorder.loaded && recorder.unloaded);
        assert_eq!(report.ticks, 20);
        assert_eq!(recorder.updates.len(), 20);
        assert!(recorder
            .updates
            .iter()
            .all(|time| (time.delta_seconds - 0.1).abs() < 1e-9));
        let last = recorder.updates.last().expect("at least one update");
        assert!((last.total_seconds - 2.0).abs() < 1e-6);
        assert_eq!(report.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn stops_when_simulation_finishes() {
        let mut recorder = Recorder {
            finish_after: Some(3),
            ..Recorder::default()
        };
        let mut clock = ManualClock::new(Duration::from_millis(100));

        let report = run_simulation(
            &config(None),
            &mut recorder,
            &mut clock,
            &MetricsHandle::default(),
        );

        assert_eq!(report.ticks, 3);
        assert!(recorder.unloaded);
    }

    #[test]
    fn slow_frames_drop_backlog_beyond_tick_cap() {
        let mut recorder = Recorder::default();
        let mut clock = ManualClock::new(Duration::from_secs(1));
        let config = LoopConfig {
            target_tps: 100,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            run_for: Some(Duration::from_millis(100)),
            ..LoopConfig::default()
        };

        let report = run_simulation(
            &config,
            &mut recorder,
            &mut clock,
            &MetricsHandle::default(),
        );

        assert_eq!(report.ticks, 10);
        assert!(report.dropped_backlog > Duration::ZERO);
    }

    #[test]
    fn metrics_are_published_per_interval() {
        let mut recorder = Recorder::default();
        let mut clock = ManualClock::new(Duration::from_millis(100));
        let metrics = MetricsHandle::default();

        run_simulation(
            &config(Some(Duration::from_secs(3))),
            &mut recorder,
            &mut clock,
            &metrics,
        );

        let snapshot = metrics.snapshot();
        assert!(snapshot.ticks > 0);
        assert!(snapshot.tps > 0.0);
    }
}
