use crate::config::RunConfig;
use crate::platform::UnsupportedPlatform;
use crate::report;
use crate::shutdown::Shutdown;
use crate::strategy::{Outcome, Strategy};
use crate::system::Launcher;
use chrono::{DateTime, Local};
use crossbeam_channel::{select, tick, Receiver};
use std::time::Instant;
use tracing::{debug, info};

/// Counters for the end-of-session summary. Never fed back into the strategy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub ticks: u32,
    pub successes: u32,
    pub failures: u32,
}

impl SessionStats {
    pub fn record(&mut self, outcome: &Outcome) {
        self.ticks += 1;
        if outcome.is_success() {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub reason: Shutdown,
    pub stats: SessionStats,
    pub started: DateTime<Local>,
    pub ended: DateTime<Local>,
}

impl Session {
    pub fn elapsed_secs(&self) -> i64 {
        (self.ended - self.started).num_seconds()
    }
}

/// Wait for the next shutdown request or tick, running `on_tick` for each tick.
///
/// A shutdown that is already pending when a tick is taken wins; that tick is dropped.
pub fn run_loop<F>(
    ticks: &Receiver<Instant>,
    shutdown: &Receiver<Shutdown>,
    mut on_tick: F,
) -> Shutdown
where
    F: FnMut(Instant),
{
    loop {
        select! {
            recv(shutdown) -> reason => return reason.unwrap_or(Shutdown::Disconnected),
            recv(ticks) -> at => {
                let Ok(at) = at else {
                    return Shutdown::Disconnected;
                };
                if let Ok(reason) = shutdown.try_recv() {
                    return reason;
                }
                on_tick(at);
            }
        }
    }
}

pub struct Activity<L: Launcher> {
    strategy: Strategy<L>,
    pub stats: SessionStats,
}

impl<L: Launcher> Activity<L> {
    pub fn new(strategy: Strategy<L>) -> Self {
        Self {
            strategy,
            stats: SessionStats::default(),
        }
    }

    /// One nudge attempt, reported on the console. Failures stay here.
    pub fn tick(&mut self, now: DateTime<Local>) -> Outcome {
        let outcome = self.strategy.simulate();
        if let Some(route) = outcome.route {
            debug!("Tick used {} route", route.label());
        }
        self.stats.record(&outcome);
        report::print_lines(&report::tick_lines(&outcome, self.strategy.hint(), &now));
        outcome
    }
}

/// Validate the platform, then nudge every `config.interval` until shutdown.
pub fn run<L: Launcher>(
    config: &RunConfig,
    launcher: L,
    shutdown: &Receiver<Shutdown>,
) -> Result<Session, UnsupportedPlatform> {
    config.platform.ensure_supported()?;

    let mut activity = Activity::new(Strategy::new(config.platform.clone(), launcher));
    let ticks = tick(config.interval);
    let started = Local::now();

    info!("Keep-alive loop started, interval {:?}", config.interval);
    let reason = run_loop(&ticks, shutdown, |_| {
        activity.tick(Local::now());
    });
    info!("Keep-alive loop stopped: {:?}", reason);

    Ok(Session {
        reason,
        stats: activity.stats,
        started,
        ended: Local::now(),
    })
}
