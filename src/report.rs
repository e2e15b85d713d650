use crate::activity::SessionStats;
use crate::config::RunConfig;
use crate::strategy::Outcome;
use crate::utils::format_clock;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::time::Duration;

pub fn banner(config: &RunConfig) -> Vec<String> {
    let mut lines = vec![
        "Keep-Alive Tool".to_string(),
        "===============".to_string(),
        format!("Version: {}", config.build.version),
        format!(
            "Build: {} ({})",
            config.build.build_time, config.build.environment
        ),
        format!("Platform: {}", config.platform),
        format!(
            "Simulating user activity every {} to prevent screen lock",
            humantime::format_duration(config.interval)
        ),
        "Press Ctrl+C to stop, or type 'q' and press Enter to quit".to_string(),
        String::new(),
    ];

    let notes = config.platform.notes();
    if !notes.is_empty() {
        lines.extend(notes.into_iter().map(str::to_string));
        lines.push(String::new());
    }
    lines
}

/// Status lines for one tick. Success and failure look the same for every route.
pub fn tick_lines<Tz: TimeZone>(
    outcome: &Outcome,
    hint: Option<&str>,
    at: &DateTime<Tz>,
) -> Vec<String>
where
    Tz::Offset: Display,
{
    let clock = format_clock(at);
    match &outcome.result {
        Ok(()) => vec![format!("[{}] Simulated mouse activity", clock)],
        Err(err) => {
            let mut lines = vec![format!(
                "[{}] Warning: Failed to simulate mouse activity: {}",
                clock, err
            )];
            if let Some(hint) = hint {
                lines.push(format!("[{}] Troubleshooting: {}", clock, hint));
            }
            lines
        }
    }
}

pub fn session_summary(stats: &SessionStats, elapsed_secs: i64) -> String {
    format!(
        "Session lasted {}: {} ticks, {} succeeded, {} failed",
        humantime::format_duration(Duration::from_secs(elapsed_secs.max(0) as u64)),
        stats.ticks,
        stats.successes,
        stats.failures
    )
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
