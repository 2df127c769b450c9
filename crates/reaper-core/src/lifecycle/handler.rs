use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, error, info, warn};

use crate::filter::criteria::FilterCriteria;
use crate::filter::pipeline::{Selection, select};
use crate::notify::dispatcher::{NotificationDispatcher, NotifyReport};
use crate::notify::message::WarningContext;
use crate::resources::traits::ResourceDescriptor;
use crate::resources::types::ResourceRecord;
use crate::state::persistence::FlagStateStore;
use crate::state::types::FlagState;

use super::errors::LifecycleError;
use super::types::{LifecycleRequest, RunMode, RunReport, SWEEP_GRACE_DIVISOR};

/// One invocation's view of a resource kind: what to select, whether to act,
/// and who to tell.
///
/// Without `force` every mode is a dry run: the pipeline runs and the report
/// is filled in, but nothing is stored, deleted or mailed.
pub struct DeletionLifecycle<'a> {
    cloud: String,
    descriptor: &'a dyn ResourceDescriptor,
    criteria: &'a FilterCriteria,
    now: DateTime<Utc>,
    force: bool,
    dispatcher: Option<&'a NotificationDispatcher<'a>>,
}

impl<'a> DeletionLifecycle<'a> {
    pub fn new(
        cloud: impl Into<String>,
        descriptor: &'a dyn ResourceDescriptor,
        criteria: &'a FilterCriteria,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            cloud: cloud.into(),
            descriptor,
            criteria,
            now,
            force: false,
            dispatcher: None,
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Warn owners through `dispatcher`. Ignored for kinds without owners.
    pub fn notify_with(mut self, dispatcher: Option<&'a NotificationDispatcher<'a>>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn run(
        &self,
        request: LifecycleRequest,
        store: &dyn FlagStateStore,
    ) -> Result<RunReport, LifecycleError> {
        match request {
            LifecycleRequest::FlagPass => self.flag_pass(store),
            LifecycleRequest::SweepPass => self.sweep_pass(store),
        }
    }

    /// Mark everything that matches now; warn owners of the new arrivals.
    pub fn flag_pass(&self, store: &dyn FlagStateStore) -> Result<RunReport, LifecycleError> {
        let mut report = self.start_report(RunMode::Flag);
        let (prior, state_warning) = self.load_state(store);
        report.state_warning = state_warning;

        let listed = self.list()?;
        report.discovered = listed.len();
        let listed_ids = ids_of(&listed);

        let candidates: Vec<ResourceRecord> = listed
            .into_iter()
            .filter(|r| !prior.is_deleted(&r.id))
            .collect();

        let selection = self.select(candidates, self.full_threshold());
        let selected_ids = selection.ids();
        let newly_flagged: Vec<ResourceRecord> = selection
            .selected
            .iter()
            .filter(|r| !prior.is_flagged(&r.id))
            .cloned()
            .collect();
        report.newly_flagged = newly_flagged.iter().map(|r| r.id.clone()).collect();
        fill_selection(&mut report, selection);

        if !self.force {
            info!(
                event = "core.lifecycle.flag_dry_run",
                kind = %self.descriptor.kind(),
                would_flag = selected_ids.len(),
                newly_flagged = report.newly_flagged.len()
            );
            return Ok(report);
        }

        let next = FlagState {
            cloud: self.cloud.clone(),
            kind: self.descriptor.kind(),
            flagged: selected_ids,
            deleted: prior.deleted.intersection(&listed_ids).cloned().collect(),
            updated_at: Some(self.now),
        };
        store.store(&next)?;

        info!(
            event = "core.lifecycle.flag_completed",
            kind = %self.descriptor.kind(),
            flagged = next.flagged.len(),
            newly_flagged = report.newly_flagged.len(),
            excluded_deleted = next.deleted.len()
        );

        report.notify = self.notify(&newly_flagged, true);
        Ok(report)
    }

    /// Delete flagged resources that still match with half the age threshold.
    pub fn sweep_pass(&self, store: &dyn FlagStateStore) -> Result<RunReport, LifecycleError> {
        let mut report = self.start_report(RunMode::Sweep);
        let (prior, state_warning) = self.load_state(store);
        report.state_warning = state_warning;

        let listed = self.list()?;
        report.discovered = listed.len();
        let listed_ids = ids_of(&listed);

        report.vanished = prior.flagged.difference(&listed_ids).cloned().collect();
        if !report.vanished.is_empty() {
            debug!(
                event = "core.lifecycle.flagged_vanished",
                kind = %self.descriptor.kind(),
                ids = ?report.vanished
            );
        }

        let candidates: Vec<ResourceRecord> = listed
            .into_iter()
            .filter(|r| prior.is_flagged(&r.id))
            .collect();
        let candidate_ids = ids_of(&candidates);

        let selection = self.select(candidates, self.sweep_threshold());
        report.dropped = candidate_ids
            .difference(&selection.ids())
            .cloned()
            .collect();
        fill_selection(&mut report, selection);

        if !self.force {
            info!(
                event = "core.lifecycle.sweep_dry_run",
                kind = %self.descriptor.kind(),
                would_delete = report.selected.len(),
                dropped = report.dropped.len(),
                vanished = report.vanished.len()
            );
            return Ok(report);
        }

        let deletion = self.descriptor.delete_all(&report.selected);

        let mut deleted: BTreeSet<String> =
            prior.deleted.intersection(&listed_ids).cloned().collect();
        deleted.extend(deletion.deleted.iter().map(|r| r.id.clone()));

        // Every flagged ID leaves the state: attempted, dropped or vanished.
        let next = FlagState {
            cloud: self.cloud.clone(),
            kind: self.descriptor.kind(),
            flagged: BTreeSet::new(),
            deleted,
            updated_at: Some(self.now),
        };

        report.deleted = deletion.deleted;
        report.failed = deletion.failed;

        if let Err(source) = store.store(&next) {
            let deleted: Vec<String> = report.deleted.iter().map(|r| r.id.clone()).collect();
            error!(
                event = "core.lifecycle.sweep_state_lost",
                kind = %self.descriptor.kind(),
                deleted = ?deleted,
                error = %source,
                "Resources were deleted but the flag state was not saved"
            );
            return Err(LifecycleError::StateStore { deleted, source });
        }

        info!(
            event = "core.lifecycle.sweep_completed",
            kind = %self.descriptor.kind(),
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            dropped = report.dropped.len(),
            vanished = report.vanished.len()
        );

        Ok(report)
    }

    /// Select with the full threshold, warn owners, then delete. No state.
    pub fn run_immediate(&self) -> Result<RunReport, LifecycleError> {
        let mut report = self.start_report(RunMode::Immediate);

        let listed = self.list()?;
        report.discovered = listed.len();

        let selection = self.select(listed, self.full_threshold());
        fill_selection(&mut report, selection);

        if !self.force {
            info!(
                event = "core.lifecycle.immediate_dry_run",
                kind = %self.descriptor.kind(),
                would_delete = report.selected.len()
            );
            return Ok(report);
        }

        report.notify = self.notify(&report.selected, false);

        let deletion = self.descriptor.delete_all(&report.selected);
        report.deleted = deletion.deleted;
        report.failed = deletion.failed;

        info!(
            event = "core.lifecycle.immediate_completed",
            kind = %self.descriptor.kind(),
            deleted = report.deleted.len(),
            failed = report.failed.len()
        );

        Ok(report)
    }

    fn start_report(&self, mode: RunMode) -> RunReport {
        info!(
            event = "core.lifecycle.run_started",
            cloud = %self.cloud,
            kind = %self.descriptor.kind(),
            mode = %mode,
            dry_run = !self.force
        );
        RunReport::new(&self.cloud, self.descriptor.kind(), mode, !self.force)
    }

    fn list(&self) -> Result<Vec<ResourceRecord>, LifecycleError> {
        self.descriptor
            .list()
            .map_err(|source| LifecycleError::Inventory {
                kind: self.descriptor.kind(),
                source,
            })
    }

    fn select(&self, records: Vec<ResourceRecord>, threshold: Option<TimeDelta>) -> Selection {
        let predicates = self.descriptor.predicates(self.criteria, threshold, self.now);
        select(records, &predicates)
    }

    fn full_threshold(&self) -> Option<TimeDelta> {
        self.criteria.age().map(|age| age.to_duration())
    }

    fn sweep_threshold(&self) -> Option<TimeDelta> {
        self.full_threshold()
            .map(|threshold| threshold / SWEEP_GRACE_DIVISOR)
    }

    /// A state that cannot be read is treated as empty; the pass goes on.
    fn load_state(&self, store: &dyn FlagStateStore) -> (FlagState, Option<String>) {
        match store.load() {
            Ok(state) => (state, None),
            Err(e) => {
                warn!(
                    event = "core.lifecycle.state_load_failed",
                    kind = %self.descriptor.kind(),
                    error = %e,
                    "Continuing with empty flag state"
                );
                (
                    FlagState::empty(&self.cloud, self.descriptor.kind()),
                    Some(e.to_string()),
                )
            }
        }
    }

    fn notify(&self, records: &[ResourceRecord], deferred: bool) -> Option<NotifyReport> {
        let dispatcher = self.dispatcher?;

        if !self.descriptor.supports_notification() {
            debug!(
                event = "core.lifecycle.notify_skipped",
                kind = %self.descriptor.kind(),
                reason = "resource kind has no owners"
            );
            return None;
        }

        let spec = self.criteria.spec();
        let context = WarningContext {
            cloud: self.cloud.clone(),
            kind: Some(self.descriptor.kind()),
            age: spec.age.clone(),
            skip_name: spec.skip_name.clone(),
            deferred,
        };

        Some(dispatcher.dispatch(
            records,
            |record| self.descriptor.recipient_for(record),
            &context,
        ))
    }
}

fn ids_of(records: &[ResourceRecord]) -> BTreeSet<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

fn fill_selection(report: &mut RunReport, selection: Selection) {
    report.considered = selection.considered;
    report.stages = selection.stages;
    report.selected = selection.selected;
}
