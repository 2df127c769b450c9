use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::filter::predicates::PredicateSet;
use crate::resources::types::ResourceRecord;

/// How many records survived one predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: &'static str,
    pub remaining: usize,
    /// Records dropped because the predicate could not evaluate them.
    pub mismatched: usize,
}

/// Result of running the pipeline once. Never mutated after `select` returns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Selection {
    pub considered: usize,
    pub stages: Vec<StageCount>,
    pub selected: Vec<ResourceRecord>,
}

impl Selection {
    pub fn ids(&self) -> BTreeSet<String> {
        self.selected.iter().map(|r| r.id.clone()).collect()
    }

    pub fn mismatches(&self) -> usize {
        self.stages.iter().map(|s| s.mismatched).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Keep the records every predicate accepts, in input order.
///
/// Predicates run one stage at a time so each stage can be counted. The
/// outcome is the plain AND of all predicates; order only affects the counts.
pub fn select(records: Vec<ResourceRecord>, predicates: &PredicateSet) -> Selection {
    let considered = records.len();
    let mut remaining = records;
    let mut stages = Vec::with_capacity(predicates.len());

    for predicate in predicates.iter() {
        let mut mismatched = 0;
        remaining.retain(|record| match predicate.evaluate(record) {
            Ok(keep) => keep,
            Err(e) => {
                warn!(
                    event = "core.filter.predicate_unanswerable",
                    predicate = predicate.name(),
                    resource_id = %record.id,
                    error = %e
                );
                mismatched += 1;
                false
            }
        });

        info!(
            event = "core.filter.stage_completed",
            stage = predicate.name(),
            remaining = remaining.len(),
            mismatched = mismatched
        );
        for record in &remaining {
            debug!(
                event = "core.filter.stage_survivor",
                stage = predicate.name(),
                resource_id = %record.id,
                name = %record.name
            );
        }

        stages.push(StageCount {
            stage: predicate.name(),
            remaining: remaining.len(),
            mismatched,
        });
    }

    Selection {
        considered,
        stages,
        selected: remaining,
    }
}
