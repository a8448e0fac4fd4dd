use brfss_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Initialize logging as early as possible; a read-only state dir should not stop a download.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("log file unavailable ({:#}), logging to stderr", err);
    }

    // Parse CLI and dispatch. Per-entry download failures are reported, not returned.
    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("brfss error: {:#}", err);
        std::process::exit(1);
    }
}
