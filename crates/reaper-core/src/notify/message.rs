use serde::Serialize;

use crate::resources::types::ResourceKind;

fn kind_plural(kind: Option<ResourceKind>) -> &'static str {
    kind.map(|k| k.plural()).unwrap_or("resources")
}

/// What the recipient is being warned about, quoted back verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningContext {
    pub cloud: String,
    pub kind: Option<ResourceKind>,
    /// `--age` exactly as typed.
    pub age: Option<String>,
    /// `--skip-name` exactly as typed.
    pub skip_name: Option<String>,
    /// True when deletion waits for the next sweep; false when it follows
    /// immediately.
    pub deferred: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// Build the deletion warning for one recipient.
    pub fn warning(from: &str, to: &str, names: &[String], context: &WarningContext) -> Self {
        let noun = match (context.kind, names.len()) {
            (Some(kind), 1) => kind.noun(),
            (Some(kind), _) => kind.plural(),
            (None, 1) => "resource",
            (None, _) => "resources",
        };

        let subject = format!(
            "[cloud-reaper] {} {} scheduled for deletion on {}",
            names.len(),
            noun,
            context.cloud
        );

        let when = if context.deferred {
            "will be deleted during the next cleanup run"
        } else {
            "are being deleted now"
        };

        let mut body = format!(
            "The following {} on cloud '{}' {}:\n\n",
            kind_plural(context.kind),
            context.cloud,
            when
        );
        for name in names {
            body.push_str("  - ");
            body.push_str(name);
            body.push('\n');
        }

        body.push_str("\nThey were selected because they are older than ");
        match &context.age {
            Some(age) => body.push_str(&format!("'{}'", age)),
            None => body.push_str("any age (no minimum age set)"),
        }
        body.push_str(".\n");

        match &context.skip_name {
            Some(pattern) => body.push_str(&format!(
                "Resources whose names start with a match for '{}' are never deleted; \
                 rename a resource to keep it.\n",
                pattern
            )),
            None => body.push_str("No name exemption is configured for this cleanup.\n"),
        }

        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject,
            body,
        }
    }

    /// RFC 5322 text handed to the transport.
    pub fn render(&self) -> String {
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
            self.from,
            self.to,
            self.subject,
            self.body.replace('\n', "\r\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> WarningContext {
        WarningContext {
            cloud: "research".to_string(),
            kind: Some(ResourceKind::Server),
            age: Some("3d".to_string()),
            skip_name: Some("pet-.*".to_string()),
            deferred: true,
        }
    }

    #[test]
    fn test_warning_lists_names_and_quotes_parameters() {
        let names = vec!["server-pet-4".to_string(), "derp-server-5".to_string()];
        let message = MailMessage::warning("reaper@example.org", "alice@example.org", &names, &context());

        assert_eq!(message.to, "alice@example.org");
        assert_eq!(
            message.subject,
            "[cloud-reaper] 2 servers scheduled for deletion on research"
        );
        assert!(message.body.contains("  - server-pet-4\n"));
        assert!(message.body.contains("  - derp-server-5\n"));
        assert!(message.body.contains("'3d'"));
        assert!(message.body.contains("'pet-.*'"));
        assert!(message.body.contains("next cleanup run"));
    }

    #[test]
    fn test_warning_without_parameters() {
        let context = WarningContext {
            age: None,
            skip_name: None,
            deferred: false,
            ..context()
        };
        let message = MailMessage::warning("a@x", "b@x", &["web".to_string()], &context);
        assert!(message.body.contains("no minimum age set"));
        assert!(message.body.contains("No name exemption"));
        assert!(message.body.contains("are being deleted now"));
    }

    #[test]
    fn test_render_has_headers_and_crlf() {
        let message = MailMessage::warning("a@x", "b@x", &["web".to_string()], &context());
        let rendered = message.render();
        assert!(rendered.starts_with("From: a@x\r\nTo: b@x\r\nSubject: [cloud-reaper] 1 server scheduled"));
        assert!(rendered.contains("\r\n\r\nThe following"));
        assert!(!rendered.replace("\r\n", "").contains('\n'));
    }
}
