//! Core library for cloud-reaper.
//!
//! Selects stale cloud resources with a fixed predicate pipeline and deletes
//! them either at once or in two phases (flag, then sweep) with persisted
//! state and owner warnings in between.

pub mod cloud;
pub mod errors;
pub mod events;
pub mod filter;
pub mod interval;
pub mod lifecycle;
pub mod logging;
pub mod notify;
pub mod resources;
pub mod run;
pub mod state;
pub mod test_support;

pub use cloud::{CloudClient, CloudError, OpenStackCli, Owner};
pub use errors::ReaperError;
pub use filter::{
    CriteriaError, CriteriaSpec, FilterCriteria, PredicateError, Selection, StageCount,
};
pub use interval::Interval;
pub use lifecycle::{
    DeletionLifecycle, LifecycleError, LifecycleRequest, RunMode, RunReport, SWEEP_GRACE_DIVISOR,
};
pub use logging::init_logging;
pub use notify::{
    MailMessage, MailTransport, NotificationDispatcher, NotifyError, NotifyReport,
    SendmailTransport, SmtpRelayTransport,
};
pub use resources::{
    DeleteFailure, DeleteReport, ResourceDescriptor, ResourceKind, ResourceRecord, descriptor_for,
};
pub use run::{RunContext, RunError, RunRequest, execute};
pub use state::{FlagState, FlagStateStore, JsonFileStore, StateStoreError, default_state_dir};
