//! Configuration for cloud-reaper.
//!
//! Settings come from an optional TOML file (`~/.reaper/config.toml` by
//! default). Every value can be overridden on the command line; this crate
//! only knows about the file layer.

mod errors;
mod loading;
mod types;

pub use errors::ConfigError;
pub use loading::{config_file_path, load_config, load_config_from};
pub use types::{
    CloudSettings, DEFAULT_SMTP_PORT, NotifySettings, ReaperConfig, StateSettings,
};
