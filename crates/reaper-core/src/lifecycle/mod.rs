//! Two-phase deletion: a flag pass marks candidates and warns owners, a
//! later sweep pass re-validates and deletes them.

pub mod errors;
pub mod handler;
pub mod types;

pub use errors::LifecycleError;
pub use handler::DeletionLifecycle;
pub use types::{LifecycleRequest, RunMode, RunReport, SWEEP_GRACE_DIVISOR};
