//! Application-level lifecycle events.

use tracing::{error, info, warn};

use crate::errors::ReaperError;

pub fn log_app_startup() {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );
}

/// Log an error with its code, at warn level for user mistakes and error level otherwise.
pub fn log_app_error<E: ReaperError>(error: &E) {
    if error.is_user_error() {
        warn!(
            event = "core.app.user_error",
            error_code = error.error_code(),
            error = %error
        );
    } else {
        error!(
            event = "core.app.error_occurred",
            error_code = error.error_code(),
            error = %error
        );
    }
}
