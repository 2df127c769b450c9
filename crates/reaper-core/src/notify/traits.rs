//! Mail transport trait definition.

use crate::notify::errors::NotifyError;
use crate::notify::message::MailMessage;

/// Trait defining the interface for mail submission.
///
/// The reaper only needs "hand this message to something that delivers it";
/// SMTP, sendmail or a test recorder all fit behind it.
pub trait MailTransport: Send + Sync {
    /// The canonical name of this transport (e.g., "sendmail").
    fn name(&self) -> &'static str;

    /// Check if this transport can be used on this system.
    fn is_available(&self) -> bool;

    /// Submit one message. Returns once the transport has accepted it.
    fn send(&self, message: &MailMessage) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockTransport {
        available: bool,
    }

    impl MailTransport for MockTransport {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn send(&self, _message: &MailMessage) -> Result<(), NotifyError> {
            if self.available {
                Ok(())
            } else {
                Err(NotifyError::ToolNotFound {
                    tool: "mock".to_string(),
                })
            }
        }
    }

    fn message() -> MailMessage {
        MailMessage {
            from: "reaper@example.org".to_string(),
            to: "alice@example.org".to_string(),
            subject: "Test".to_string(),
            body: "Hello".to_string(),
        }
    }

    #[test]
    fn mock_transport_available() {
        let transport = MockTransport { available: true };
        assert_eq!(transport.name(), "mock");
        assert!(transport.is_available());
        assert!(transport.send(&message()).is_ok());
    }

    #[test]
    fn mock_transport_unavailable() {
        let transport = MockTransport { available: false };
        assert!(!transport.is_available());
        assert!(transport.send(&message()).is_err());
    }
}
