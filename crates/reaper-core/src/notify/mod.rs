//! Owner notification: group flagged resources by recipient and mail a
//! warning to each.
//!
//! A failure for one recipient is recorded in the report and never stops
//! the others, nor the deletion that follows.

pub mod backends;
pub mod dispatcher;
pub mod errors;
pub mod message;
pub mod traits;

pub use backends::{SendmailTransport, SmtpRelayTransport};
pub use dispatcher::{NotificationDispatcher, NotificationGroup, NotifyFailure, NotifyReport};
pub use errors::NotifyError;
pub use message::{MailMessage, WarningContext};
pub use traits::MailTransport;
