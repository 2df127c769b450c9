use reaper_core::init_logging;

mod app;
mod color;
mod commands;
mod table;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = app::build_cli();
    let matches = app.get_matches();

    // Logging must be configured before anything else logs.
    let verbosity = matches.get_count("verbose");
    init_logging(verbosity, matches.get_flag("log-json"));

    if matches.get_flag("no-color") {
        color::set_no_color();
    }

    reaper_core::events::log_app_startup();

    commands::run_command(&matches)?;

    Ok(())
}
