use std::path::Path;

use clap::ArgMatches;
use tracing::error;

use reaper_config::ReaperConfig;
use reaper_core::{ResourceKind, events};

use crate::color;

mod run;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some((name, sub_matches)) => {
            let kind: ResourceKind = name.parse()?;
            let config = load_config(sub_matches)?;
            run::handle_run_command(kind, sub_matches, &config)
        }
        None => {
            error!(event = "cli.command_missing");
            Err("No subcommand given".into())
        }
    }
}

/// Load `--config` when given (the file must exist), otherwise the default
/// location where a missing file means defaults.
fn load_config(matches: &ArgMatches) -> Result<ReaperConfig, Box<dyn std::error::Error>> {
    let result = match matches.get_one::<String>("config") {
        Some(path) => reaper_config::load_config_from(Path::new(path)),
        None => reaper_config::load_config(),
    };

    result.map_err(|e| {
        eprintln!("{} {}", color::error("Config error:"), e);
        error!(event = "cli.config_load_failed", error = %e);
        events::log_app_error(&e);
        e.into()
    })
}

/// Error message for runs where some deletes failed.
pub(crate) fn format_partial_failure_error(operation: &str, failed: usize, total: usize) -> String {
    format!(
        "Partial failure: {} of {} resource(s) failed to {}",
        failed, total, operation
    )
}
