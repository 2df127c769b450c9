//! Mail submission through a sendmail-compatible binary.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::notify::errors::NotifyError;
use crate::notify::message::MailMessage;
use crate::notify::traits::MailTransport;

/// Pipes a rendered message to `<binary> -f <from> -- <to>`.
///
/// Works with sendmail, postfix, exim, msmtp and other drop-in binaries.
pub struct SendmailTransport {
    binary: String,
}

impl SendmailTransport {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl MailTransport for SendmailTransport {
    fn name(&self) -> &'static str {
        "sendmail"
    }

    fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    fn send(&self, message: &MailMessage) -> Result<(), NotifyError> {
        debug!(
            event = "core.notify.sendmail_started",
            binary = %self.binary,
            to = %message.to
        );

        let mut child = Command::new(&self.binary)
            .arg("-f")
            .arg(&message.from)
            .arg("--")
            .arg(&message.to)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    NotifyError::ToolNotFound {
                        tool: self.binary.clone(),
                    }
                } else {
                    NotifyError::IoError { source: e }
                }
            })?;

        // A binary that exits without reading stdin is judged by its exit status.
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(message.render().as_bytes())
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(NotifyError::IoError { source: e });
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                event = "core.notify.sendmail_failed",
                to = %message.to,
                status = %output.status,
                stderr = %stderr.trim()
            );
            return Err(NotifyError::SendFailed {
                message: format!(
                    "{} exited with {}: {}",
                    self.binary,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        info!(event = "core.notify.sendmail_completed", to = %message.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> MailMessage {
        MailMessage {
            from: "reaper@example.org".to_string(),
            to: "alice@example.org".to_string(),
            subject: "Test".to_string(),
            body: "Hello".to_string(),
        }
    }

    #[test]
    fn test_sendmail_name() {
        assert_eq!(SendmailTransport::new("sendmail").name(), "sendmail");
    }

    #[test]
    fn test_missing_binary() {
        let transport = SendmailTransport::new("reaper-test-no-such-sendmail");
        assert!(!transport.is_available());
        assert!(matches!(
            transport.send(&message()),
            Err(NotifyError::ToolNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_accepting_binary() {
        // `true` ignores its arguments and stdin, like a sendmail that queued the mail.
        let transport = SendmailTransport::new("true");
        assert!(transport.send(&message()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_rejecting_binary() {
        let transport = SendmailTransport::new("false");
        assert!(matches!(
            transport.send(&message()),
            Err(NotifyError::SendFailed { .. })
        ));
    }
}
