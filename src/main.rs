//! `airq` — classify sensor submissions from the command line.
//!
//! Reads newline-delimited JSON bodies from the file given as the first
//! argument (or stdin), prints one annotated JSON reading record per
//! accepted line, and logs rejects and a batch summary to stderr. Exits
//! non-zero when there was input and every line was rejected.

use airq_service::config::AppConfig;
use airq_service::ingest::batch::{BatchOptions, run_batch};
use airq_service::logging::{self, Component};
use chrono::Utc;
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );
    logging::debug(Component::System, None, concat!("airq ", env!("CARGO_PKG_VERSION")));
    logging::debug(
        Component::Config,
        None,
        &format!(
            "log level {}, stale after {} min, {} trend threshold override(s)",
            config.logging.level,
            config.staleness.max_age_minutes,
            config.trend_thresholds.len()
        ),
    );

    let options = BatchOptions::from_config(&config);
    match open_input(env::args().nth(1)) {
        Ok(input) => match run_batch(input, io::stdout().lock(), &options, Utc::now()) {
            Ok(summary) if summary.succeeded() => ExitCode::SUCCESS,
            Ok(_) => ExitCode::FAILURE,
            Err(e) => {
                logging::error(Component::Cli, None, &e.to_string());
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            logging::error(Component::Cli, None, &e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn open_input(path: Option<String>) -> io::Result<Box<dyn BufRead>> {
    match path.as_deref() {
        Some(p) if p != "-" => {
            logging::debug(Component::Cli, None, &format!("reading submissions from {}", p));
            Ok(Box::new(BufReader::new(File::open(p)?)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}
