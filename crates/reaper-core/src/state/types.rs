use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resources::types::ResourceKind;

/// Persisted two-phase deletion state for one (cloud, resource kind).
///
/// `flagged` holds IDs selected by a flag pass and not yet swept. `deleted`
/// holds IDs this tool already deleted; they are excluded from future flag
/// passes until they disappear from the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagState {
    pub cloud: String,
    pub kind: ResourceKind,
    #[serde(default)]
    pub flagged: BTreeSet<String>,
    #[serde(default)]
    pub deleted: BTreeSet<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FlagState {
    pub fn empty(cloud: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            cloud: cloud.into(),
            kind,
            flagged: BTreeSet::new(),
            deleted: BTreeSet::new(),
            updated_at: None,
        }
    }

    pub fn is_flagged(&self, id: &str) -> bool {
        self.flagged.contains(id)
    }

    pub fn is_deleted(&self, id: &str) -> bool {
        self.deleted.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let state = FlagState::empty("research", ResourceKind::Server);
        assert_eq!(state.cloud, "research");
        assert!(state.flagged.is_empty());
        assert!(state.deleted.is_empty());
        assert!(state.updated_at.is_none());
    }

    #[test]
    fn test_missing_sets_default_to_empty() {
        let state: FlagState =
            serde_json::from_str(r#"{"cloud": "c", "kind": "fip", "flagged": ["a"]}"#).unwrap();
        assert_eq!(state.kind, ResourceKind::FloatingIp);
        assert!(state.is_flagged("a"));
        assert!(!state.is_deleted("a"));
    }
}
