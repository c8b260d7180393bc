use std::process::ExitCode;
use std::time::Duration;

use engine::{run_simulation, Clock, ManualClock, MetricsHandle, SystemClock};
use tracing::info;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        mut simulation,
        realtime,
    } = app;
    let metrics = MetricsHandle::default();
    // Headless runs tick as fast as possible: the manual clock advances one fixed step per
    // frame.
    let mut clock: Box<dyn Clock> = if realtime {
        Box::new(SystemClock::new())
    } else {
        Box::new(ManualClock::new(Duration::from_secs_f64(
            1.0 / f64::from(config.target_tps.max(1)),
        )))
    };

    let report = run_simulation(&config, &mut simulation, clock.as_mut(), &metrics);
    let last = metrics.snapshot();
    info!(
        frames = report.frames,
        ticks = report.ticks,
        simulated_seconds = report.simulated.as_secs_f64(),
        dropped_backlog_ms = report.dropped_backlog.as_millis() as u64,
        last_tps = last.tps,
        "run_finished"
    );

    ExitCode::SUCCESS
}
