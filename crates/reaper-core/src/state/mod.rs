pub mod errors;
pub mod persistence;
pub mod types;

pub use errors::StateStoreError;
pub use persistence::{FlagStateStore, JsonFileStore, default_state_dir};
pub use types::FlagState;
