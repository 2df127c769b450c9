use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::filter::pipeline::StageCount;
use crate::notify::dispatcher::NotifyReport;
use crate::resources::traits::DeleteFailure;
use crate::resources::types::{ResourceKind, ResourceRecord};

/// The sweep re-checks age against `interval / SWEEP_GRACE_DIVISOR`, so a
/// resource flagged at exactly the threshold is still old enough next run.
pub const SWEEP_GRACE_DIVISOR: i32 = 2;

/// Which half of the two-phase protocol to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleRequest {
    FlagPass,
    SweepPass,
}

impl FromStr for LifecycleRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flag" => Ok(LifecycleRequest::FlagPass),
            "sweep" => Ok(LifecycleRequest::SweepPass),
            _ => Err(format!("Unknown phase '{}'. Known phases: flag, sweep", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Flag,
    Sweep,
    Immediate,
}

impl From<LifecycleRequest> for RunMode {
    fn from(request: LifecycleRequest) -> Self {
        match request {
            LifecycleRequest::FlagPass => RunMode::Flag,
            LifecycleRequest::SweepPass => RunMode::Sweep,
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Flag => write!(f, "flag"),
            RunMode::Sweep => write!(f, "sweep"),
            RunMode::Immediate => write!(f, "immediate"),
        }
    }
}

/// Everything one invocation did, or would have done in a dry run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub cloud: String,
    pub kind: ResourceKind,
    pub mode: RunMode,
    pub dry_run: bool,
    /// Records returned by the inventory call.
    pub discovered: usize,
    /// Records fed into the pipeline after state restriction.
    pub considered: usize,
    pub stages: Vec<StageCount>,
    /// Records the pipeline kept.
    pub selected: Vec<ResourceRecord>,
    /// Flag pass: selected IDs that were not flagged before.
    pub newly_flagged: Vec<String>,
    /// Sweep pass: flagged IDs that no longer pass the filters.
    pub dropped: Vec<String>,
    /// Sweep pass: flagged IDs missing from the inventory.
    pub vanished: Vec<String>,
    pub deleted: Vec<ResourceRecord>,
    pub failed: Vec<DeleteFailure>,
    pub notify: Option<NotifyReport>,
    /// Set when prior state could not be read and an empty one was used.
    pub state_warning: Option<String>,
}

impl RunReport {
    pub(crate) fn new(cloud: &str, kind: ResourceKind, mode: RunMode, dry_run: bool) -> Self {
        Self {
            cloud: cloud.to_string(),
            kind,
            mode,
            dry_run,
            discovered: 0,
            considered: 0,
            stages: Vec::new(),
            selected: Vec::new(),
            newly_flagged: Vec::new(),
            dropped: Vec::new(),
            vanished: Vec::new(),
            deleted: Vec::new(),
            failed: Vec::new(),
            notify: None,
            state_warning: None,
        }
    }

    pub fn mismatched(&self) -> usize {
        self.stages.iter().map(|s| s.mismatched).sum()
    }

    pub fn notified(&self) -> usize {
        self.notify.as_ref().map_or(0, |n| n.notified)
    }

    /// Some deletes failed while others may have succeeded.
    pub fn is_partial_failure(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_parsing() {
        assert_eq!("flag".parse(), Ok(LifecycleRequest::FlagPass));
        assert_eq!("sweep".parse(), Ok(LifecycleRequest::SweepPass));
        assert!("delete".parse::<LifecycleRequest>().is_err());
    }

    #[test]
    fn test_run_mode_from_request() {
        assert_eq!(RunMode::from(LifecycleRequest::FlagPass), RunMode::Flag);
        assert_eq!(RunMode::from(LifecycleRequest::SweepPass).to_string(), "sweep");
    }

    #[test]
    fn test_empty_report() {
        let report = RunReport::new("default", ResourceKind::Server, RunMode::Immediate, true);
        assert_eq!(report.mismatched(), 0);
        assert_eq!(report.notified(), 0);
        assert!(!report.is_partial_failure());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "immediate");
        assert_eq!(json["kind"], "server");
    }
}
