use crate::errors::ReaperError;

#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error("Cloud CLI '{tool}' not found in PATH")]
    ToolNotFound { tool: String },

    #[error("Cloud command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Unexpected response from '{command}': {message}")]
    InvalidResponse { command: String, message: String },

    #[error("Resource '{id}' not found")]
    NotFound { id: String },

    #[error("IO error talking to cloud: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl ReaperError for CloudError {
    fn error_code(&self) -> &'static str {
        match self {
            CloudError::ToolNotFound { .. } => "CLOUD_TOOL_NOT_FOUND",
            CloudError::CommandFailed { .. } => "CLOUD_COMMAND_FAILED",
            CloudError::InvalidResponse { .. } => "CLOUD_INVALID_RESPONSE",
            CloudError::NotFound { .. } => "CLOUD_RESOURCE_NOT_FOUND",
            CloudError::IoError { .. } => "CLOUD_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, CloudError::ToolNotFound { .. })
    }
}
