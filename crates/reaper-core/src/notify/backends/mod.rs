//! Mail transport implementations.

mod sendmail;
mod smtp;

pub use sendmail::SendmailTransport;
pub use smtp::SmtpRelayTransport;
