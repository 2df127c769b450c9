//! One invocation, wired end to end: compile criteria, pick the descriptor,
//! set up notification, then run the requested mode.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::cloud::traits::CloudClient;
use crate::errors::ReaperError;
use crate::filter::criteria::{CriteriaSpec, FilterCriteria};
use crate::filter::errors::CriteriaError;
use crate::lifecycle::errors::LifecycleError;
use crate::lifecycle::handler::DeletionLifecycle;
use crate::lifecycle::types::{LifecycleRequest, RunReport};
use crate::notify::dispatcher::NotificationDispatcher;
use crate::notify::traits::MailTransport;
use crate::resources::registry::descriptor_for;
use crate::resources::types::ResourceKind;
use crate::state::persistence::FlagStateStore;

/// What the operator asked for.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub kind: ResourceKind,
    pub criteria: CriteriaSpec,
    /// `None` runs the single-shot mode that keeps no state.
    pub phase: Option<LifecycleRequest>,
    pub force: bool,
    pub email: bool,
    pub sender: Option<String>,
    /// Send every warning here instead of to resource owners.
    pub recipient: Option<String>,
}

/// The collaborators one invocation talks to.
pub struct RunContext<'a> {
    pub client: &'a dyn CloudClient,
    pub store: &'a dyn FlagStateStore,
    pub transport: &'a dyn MailTransport,
    pub now: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    #[error("--email requires a sender address (--sender or [notify] sender in config)")]
    MissingSender,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl ReaperError for RunError {
    fn error_code(&self) -> &'static str {
        match self {
            RunError::Criteria(e) => e.error_code(),
            RunError::MissingSender => "MISSING_SENDER",
            RunError::Lifecycle(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            RunError::Criteria(e) => e.is_user_error(),
            RunError::MissingSender => true,
            RunError::Lifecycle(e) => e.is_user_error(),
        }
    }
}

/// Run one invocation. Criteria are validated before any cloud call.
pub fn execute(request: &RunRequest, context: &RunContext<'_>) -> Result<RunReport, RunError> {
    let criteria = FilterCriteria::compile(request.criteria.clone())?;

    let sender = request
        .sender
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if request.email && sender.is_none() {
        return Err(RunError::MissingSender);
    }

    let descriptor = descriptor_for(request.kind, context.client);
    if request.email && !descriptor.supports_notification() {
        warn!(
            event = "core.run.email_unsupported",
            kind = %request.kind,
            "--email has no effect for this resource type"
        );
    }

    let dispatcher = sender.filter(|_| request.email).map(|sender| {
        NotificationDispatcher::new(context.transport, sender)
            .with_override_recipient(request.recipient.clone())
    });

    if dispatcher.is_some() && request.force && !context.transport.is_available() {
        warn!(
            event = "core.run.transport_unavailable",
            transport = context.transport.name(),
            "Mail transport not found - warnings will fail to send"
        );
    }

    let lifecycle = DeletionLifecycle::new(
        context.client.identity(),
        descriptor.as_ref(),
        &criteria,
        context.now,
    )
    .force(request.force)
    .notify_with(dispatcher.as_ref());

    let report = match request.phase {
        Some(phase) => lifecycle.run(phase, context.store)?,
        None => lifecycle.run_immediate()?,
    };

    info!(
        event = "core.run.completed",
        kind = %request.kind,
        mode = %report.mode,
        dry_run = report.dry_run,
        selected = report.selected.len(),
        deleted = report.deleted.len(),
        failed = report.failed.len()
    );

    Ok(report)
}
