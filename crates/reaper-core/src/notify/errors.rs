//! Notification error types.

use crate::errors::ReaperError;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Mail tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Mail delivery failed: {message}")]
    SendFailed { message: String },

    #[error("Invalid mail address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    #[error("IO error during mail delivery: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl ReaperError for NotifyError {
    fn error_code(&self) -> &'static str {
        match self {
            NotifyError::ToolNotFound { .. } => "NOTIFY_TOOL_NOT_FOUND",
            NotifyError::SendFailed { .. } => "NOTIFY_SEND_FAILED",
            NotifyError::InvalidAddress { .. } => "NOTIFY_INVALID_ADDRESS",
            NotifyError::IoError { .. } => "NOTIFY_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            NotifyError::ToolNotFound { .. } | NotifyError::InvalidAddress { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_not_found() {
        let error = NotifyError::ToolNotFound {
            tool: "sendmail".to_string(),
        };
        assert_eq!(error.to_string(), "Mail tool not found: sendmail");
        assert_eq!(error.error_code(), "NOTIFY_TOOL_NOT_FOUND");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_send_failed() {
        let error = NotifyError::SendFailed {
            message: "sendmail exited with code 75".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Mail delivery failed: sendmail exited with code 75"
        );
        assert_eq!(error.error_code(), "NOTIFY_SEND_FAILED");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_invalid_address_is_user_error() {
        let error = NotifyError::InvalidAddress {
            address: "ops".to_string(),
            message: "missing domain".to_string(),
        };
        assert_eq!(error.error_code(), "NOTIFY_INVALID_ADDRESS");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_io_error() {
        let error = NotifyError::IoError {
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe"),
        };
        assert!(error.to_string().contains("IO error"));
        assert_eq!(error.error_code(), "NOTIFY_IO_ERROR");
    }
}
