//! Mail submission to an SMTP relay.

use std::str::FromStr;

use lettre::address::{Address, Envelope};
use lettre::{SmtpTransport, Transport};
use tracing::{debug, info, warn};

use crate::notify::errors::NotifyError;
use crate::notify::message::MailMessage;
use crate::notify::traits::MailTransport;

/// Hands each message to `<host>:<port>` over plain SMTP, no auth.
///
/// Meant for an internal relay that accepts mail from the reaper's host.
pub struct SmtpRelayTransport {
    host: String,
    port: u16,
    relay: SmtpTransport,
}

impl SmtpRelayTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let relay = SmtpTransport::builder_dangerous(host.clone())
            .port(port)
            .build();
        Self { host, port, relay }
    }

    fn envelope(message: &MailMessage) -> Result<Envelope, NotifyError> {
        let from = parse_address(&message.from)?;
        let to = parse_address(&message.to)?;
        Envelope::new(Some(from), vec![to]).map_err(|e| NotifyError::SendFailed {
            message: format!("bad envelope: {}", e),
        })
    }
}

fn parse_address(address: &str) -> Result<Address, NotifyError> {
    Address::from_str(address.trim()).map_err(|e| NotifyError::InvalidAddress {
        address: address.to_string(),
        message: e.to_string(),
    })
}

impl MailTransport for SmtpRelayTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    /// Reachability is only known when sending; a configured host counts.
    fn is_available(&self) -> bool {
        !self.host.trim().is_empty()
    }

    fn send(&self, message: &MailMessage) -> Result<(), NotifyError> {
        let envelope = Self::envelope(message)?;

        debug!(
            event = "core.notify.smtp_started",
            host = %self.host,
            port = self.port,
            to = %message.to
        );

        self.relay
            .send_raw(&envelope, message.render().as_bytes())
            .map_err(|e| {
                warn!(
                    event = "core.notify.smtp_failed",
                    host = %self.host,
                    port = self.port,
                    to = %message.to,
                    error = %e
                );
                NotifyError::SendFailed {
                    message: format!("{}:{}: {}", self.host, self.port, e),
                }
            })?;

        info!(event = "core.notify.smtp_completed", to = %message.to);
        Ok(())
    }
}
