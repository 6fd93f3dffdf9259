//! Delicense CLI - data quality, processing and analysis for firm-year panels
//!
//! # Commands
//!
//! ```bash
//! delicense validate --file data.csv --year-col year --id-cols firm_id,year
//! delicense process --input data.csv --numeric-cols output --panel --firm-col firm_id --time-col year
//! delicense analyze --file data.csv --summary --growth --value-col output --group-cols firm_id --order-col year
//! ```
//!
//! Diagnostics go to stderr through `tracing` (`RUST_LOG` overrides the
//! configured level); reports go to stdout.

use clap::{CommandFactory, Parser};
use delicense::cli::{run, Cli};
use delicense::{Config, ConsoleReporter};

fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        std::process::exit(1);
    };

    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.log_level);

    let reporter = ConsoleReporter::new();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(e) = run(&command, &config, &reporter, &mut out) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
