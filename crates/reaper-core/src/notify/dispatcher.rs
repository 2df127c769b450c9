use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cloud::errors::CloudError;
use crate::cloud::types::Owner;
use crate::errors::ReaperError;
use crate::resources::types::ResourceRecord;

use super::message::{MailMessage, WarningContext};
use super::traits::MailTransport;

/// Recipient address → names of the resources addressed to them.
///
/// Built per run, never persisted. Names keep the order the records came in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationGroup {
    recipients: BTreeMap<String, Vec<String>>,
}

impl NotificationGroup {
    pub fn add(&mut self, recipient: &str, name: &str) {
        self.recipients
            .entry(recipient.to_string())
            .or_default()
            .push(name.to_string());
    }

    pub fn get(&self, recipient: &str) -> Option<&[String]> {
        self.recipients.get(recipient).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.recipients
            .iter()
            .map(|(recipient, names)| (recipient.as_str(), names.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Number of resources across all recipients.
    pub fn resource_count(&self) -> usize {
        self.recipients.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotifyFailure {
    pub recipient: String,
    pub error_code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NotifyReport {
    /// Recipients whose message the transport accepted.
    pub sent: Vec<String>,
    /// Resources covered by an accepted message.
    pub notified: usize,
    /// Names of resources nobody could be told about.
    pub unaddressed: Vec<String>,
    pub failed: Vec<NotifyFailure>,
}

pub struct NotificationDispatcher<'a> {
    transport: &'a dyn MailTransport,
    sender: String,
    override_recipient: Option<String>,
}

impl<'a> NotificationDispatcher<'a> {
    pub fn new(transport: &'a dyn MailTransport, sender: impl Into<String>) -> Self {
        Self {
            transport,
            sender: sender.into(),
            override_recipient: None,
        }
    }

    /// Send everything to one operator address instead of the owners.
    pub fn with_override_recipient(mut self, recipient: Option<String>) -> Self {
        self.override_recipient = recipient.filter(|r| !r.trim().is_empty());
        self
    }

    /// Resolve a recipient for each record. With an override recipient,
    /// `lookup` is never called.
    ///
    /// Returns the group and the names of records that got no recipient.
    pub fn group<F>(
        &self,
        records: &[ResourceRecord],
        lookup: F,
    ) -> (NotificationGroup, Vec<String>)
    where
        F: Fn(&ResourceRecord) -> Result<Option<Owner>, CloudError>,
    {
        let mut group = NotificationGroup::default();
        let mut unaddressed = Vec::new();

        if let Some(recipient) = &self.override_recipient {
            for record in records {
                group.add(recipient, &record.name);
            }
            return (group, unaddressed);
        }

        for record in records {
            match lookup(record) {
                Ok(Some(owner)) => match owner.address() {
                    Some(address) => group.add(address, &record.name),
                    None => {
                        debug!(
                            event = "core.notify.owner_without_address",
                            resource_id = %record.id,
                            owner = %owner.name
                        );
                        unaddressed.push(record.name.clone());
                    }
                },
                Ok(None) => {
                    debug!(event = "core.notify.no_owner", resource_id = %record.id);
                    unaddressed.push(record.name.clone());
                }
                Err(e) => {
                    warn!(
                        event = "core.notify.owner_lookup_failed",
                        resource_id = %record.id,
                        error = %e
                    );
                    unaddressed.push(record.name.clone());
                }
            }
        }

        (group, unaddressed)
    }

    /// Group `records` by recipient and send one warning per recipient.
    pub fn dispatch<F>(
        &self,
        records: &[ResourceRecord],
        lookup: F,
        context: &WarningContext,
    ) -> NotifyReport
    where
        F: Fn(&ResourceRecord) -> Result<Option<Owner>, CloudError>,
    {
        info!(
            event = "core.notify.dispatch_started",
            transport = self.transport.name(),
            resources = records.len(),
            override_recipient = ?self.override_recipient
        );

        let (group, unaddressed) = self.group(records, lookup);
        let mut report = NotifyReport {
            unaddressed,
            ..Default::default()
        };

        for (recipient, names) in group.iter() {
            let message = MailMessage::warning(&self.sender, recipient, names, context);
            match self.transport.send(&message) {
                Ok(()) => {
                    info!(
                        event = "core.notify.message_sent",
                        recipient = recipient,
                        resources = names.len()
                    );
                    report.sent.push(recipient.to_string());
                    report.notified += names.len();
                }
                Err(e) => {
                    warn!(
                        event = "core.notify.message_failed",
                        recipient = recipient,
                        error = %e
                    );
                    report.failed.push(NotifyFailure {
                        recipient: recipient.to_string(),
                        error_code: e.error_code(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            event = "core.notify.dispatch_completed",
            sent = report.sent.len(),
            failed = report.failed.len(),
            unaddressed = report.unaddressed.len()
        );

        report
    }
}
