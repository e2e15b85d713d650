mod activity;
mod config;
mod platform;
mod report;
mod shutdown;
mod strategy;
mod system;
mod utils;

use anyhow::Result;
use clap::Parser;
use config::RunConfig;
use system::SystemLauncher;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "keepalive")]
#[command(version = config::BuildInfo::default().version)]
#[command(about = "Keeps macOS and Windows awake by nudging the mouse pointer", long_about = None)]
struct Cli {
    /// Print diagnostics to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Banner, platform gate, then the keep-alive loop until shutdown.
fn run(config: RunConfig) -> Result<()> {
    report::print_lines(&report::banner(&config));
    config.platform.ensure_supported()?;

    let (shutdown_tx, shutdown_rx) = shutdown::channel();
    shutdown::install_signal_handler(shutdown_tx.clone())?;
    shutdown::spawn_quit_watcher(shutdown_tx)?;

    println!("Starting keep-alive simulation...");
    let session = activity::run(&config, SystemLauncher::new(), &shutdown_rx)?;

    println!("\n{}", session.reason.message());
    println!(
        "{}",
        report::session_summary(&session.stats, session.elapsed_secs())
    );

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    run(RunConfig::detect()?)
}
