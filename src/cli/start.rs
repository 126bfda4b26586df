use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing::Level;

// `-v` count (or `UMBRAL_LOG_LEVEL`) to the level shown; zero keeps the
// subscriber default of ERROR.
const fn level_for(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

fn verbosity(matches: &ArgMatches) -> u8 {
    matches
        .get_one::<u8>(commands::logging::ARG_VERBOSITY)
        .copied()
        .unwrap_or(0)
}

/// Parse the command line, install logging, and resolve the server action.
///
/// # Errors
/// Returns an error if telemetry cannot be installed or the arguments do not
/// describe a runnable server (bad DSN, missing session secret).
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(level_for(verbosity(&matches)))
        .context("failed to initialize logging and tracing")?;

    dispatch::handler(&matches).context("invalid umbral configuration")
}
