use crate::cloud::errors::CloudError;
use crate::errors::ReaperError;
use crate::resources::types::ResourceKind;
use crate::state::errors::StateStoreError;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Failed to list {kind}: {source}")]
    Inventory {
        kind: ResourceKind,
        #[source]
        source: CloudError,
    },

    /// `deleted` lists IDs removed from the cloud before the write failed;
    /// the stored state does not know about them.
    #[error("Flag state could not be saved: {source}{}", deleted_note(.deleted))]
    StateStore {
        deleted: Vec<String>,
        #[source]
        source: StateStoreError,
    },
}

impl From<StateStoreError> for LifecycleError {
    fn from(source: StateStoreError) -> Self {
        LifecycleError::StateStore {
            deleted: Vec::new(),
            source,
        }
    }
}

fn deleted_note(deleted: &[String]) -> String {
    if deleted.is_empty() {
        String::new()
    } else {
        format!(" (already deleted: {})", deleted.join(", "))
    }
}

impl ReaperError for LifecycleError {
    fn error_code(&self) -> &'static str {
        match self {
            LifecycleError::Inventory { .. } => "LIFECYCLE_INVENTORY_FAILED",
            LifecycleError::StateStore { .. } => "LIFECYCLE_STATE_STORE_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            LifecycleError::Inventory { source, .. } => source.is_user_error(),
            LifecycleError::StateStore { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_inventory_error_inherits_user_error() {
        let error = LifecycleError::Inventory {
            kind: ResourceKind::Server,
            source: CloudError::ToolNotFound {
                tool: "openstack".to_string(),
            },
        };
        assert_eq!(
            error.to_string(),
            "Failed to list server: Cloud CLI 'openstack' not found in PATH"
        );
        assert_eq!(error.error_code(), "LIFECYCLE_INVENTORY_FAILED");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_state_store_error() {
        let error: LifecycleError = StateStoreError::WriteFailed {
            path: PathBuf::from("/state/default-fip.json"),
            message: "disk full".to_string(),
        }
        .into();
        assert_eq!(error.error_code(), "LIFECYCLE_STATE_STORE_FAILED");
        assert!(!error.is_user_error());
        assert!(!error.to_string().contains("already deleted"));
    }

    #[test]
    fn test_state_store_error_names_deleted_ids() {
        let error = LifecycleError::StateStore {
            deleted: vec!["3".to_string(), "4".to_string()],
            source: StateStoreError::WriteFailed {
                path: PathBuf::from("/state/default-server.json"),
                message: "disk full".to_string(),
            },
        };
        assert!(error.to_string().ends_with("(already deleted: 3, 4)"));
    }
}
