//! In-memory doubles for the cloud, the flag-state store and the mail
//! transport.
//!
//! Public so the CLI crate and integration tests can drive full runs
//! without a cloud or a mail server.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::cloud::errors::CloudError;
use crate::cloud::traits::CloudClient;
use crate::cloud::types::Owner;
use crate::notify::errors::NotifyError;
use crate::notify::message::MailMessage;
use crate::notify::traits::MailTransport;
use crate::resources::types::{ResourceKind, ResourceRecord};
use crate::state::errors::StateStoreError;
use crate::state::persistence::FlagStateStore;
use crate::state::types::FlagState;

/// Cloud whose inventory is a pair of vectors. Deleting removes the record,
/// so a later list no longer returns it.
pub struct FakeCloud {
    identity: String,
    servers: RefCell<Vec<ResourceRecord>>,
    floating_ips: RefCell<Vec<ResourceRecord>>,
    owners: HashMap<String, Owner>,
    failing_deletes: HashSet<String>,
    fail_list: bool,
    deleted_servers: RefCell<Vec<String>>,
    deleted_floating_ips: RefCell<Vec<String>>,
    owner_lookups: Cell<usize>,
}

impl Default for FakeCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCloud {
    pub fn new() -> Self {
        Self {
            identity: "default".to_string(),
            servers: RefCell::new(Vec::new()),
            floating_ips: RefCell::new(Vec::new()),
            owners: HashMap::new(),
            failing_deletes: HashSet::new(),
            fail_list: false,
            deleted_servers: RefCell::new(Vec::new()),
            deleted_floating_ips: RefCell::new(Vec::new()),
            owner_lookups: Cell::new(0),
        }
    }

    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = identity.to_string();
        self
    }

    pub fn with_servers(self, servers: Vec<ResourceRecord>) -> Self {
        self.servers.replace(servers);
        self
    }

    pub fn with_floating_ips(self, floating_ips: Vec<ResourceRecord>) -> Self {
        self.floating_ips.replace(floating_ips);
        self
    }

    pub fn with_owner(mut self, user_id: &str, name: &str, email: Option<&str>) -> Self {
        self.owners.insert(
            user_id.to_string(),
            Owner {
                name: name.to_string(),
                email: email.map(str::to_string),
            },
        );
        self
    }

    /// Make `delete_*` fail for this ID. The record stays listed.
    pub fn failing_delete(mut self, id: &str) -> Self {
        self.failing_deletes.insert(id.to_string());
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Replace the server inventory between runs.
    pub fn set_servers(&self, servers: Vec<ResourceRecord>) {
        self.servers.replace(servers);
    }

    pub fn deleted_servers(&self) -> Vec<String> {
        self.deleted_servers.borrow().clone()
    }

    pub fn deleted_floating_ips(&self) -> Vec<String> {
        self.deleted_floating_ips.borrow().clone()
    }

    pub fn owner_lookups(&self) -> usize {
        self.owner_lookups.get()
    }

    fn list(
        &self,
        records: &RefCell<Vec<ResourceRecord>>,
        command: &str,
    ) -> Result<Vec<ResourceRecord>, CloudError> {
        if self.fail_list {
            return Err(CloudError::CommandFailed {
                command: command.to_string(),
                message: "HTTP 503".to_string(),
            });
        }
        Ok(records.borrow().clone())
    }

    fn delete(
        &self,
        records: &RefCell<Vec<ResourceRecord>>,
        log: &RefCell<Vec<String>>,
        id: &str,
    ) -> Result<(), CloudError> {
        if self.failing_deletes.contains(id) {
            return Err(CloudError::CommandFailed {
                command: "delete".to_string(),
                message: format!("refusing to delete {}", id),
            });
        }
        let mut records = records.borrow_mut();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(CloudError::NotFound { id: id.to_string() });
        }
        log.borrow_mut().push(id.to_string());
        Ok(())
    }
}

impl CloudClient for FakeCloud {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn list_servers(&self) -> Result<Vec<ResourceRecord>, CloudError> {
        self.list(&self.servers, "server list")
    }

    fn list_floating_ips(&self) -> Result<Vec<ResourceRecord>, CloudError> {
        self.list(&self.floating_ips, "floating ip list")
    }

    fn delete_server(&self, id: &str) -> Result<(), CloudError> {
        self.delete(&self.servers, &self.deleted_servers, id)
    }

    fn delete_floating_ip(&self, id: &str) -> Result<(), CloudError> {
        self.delete(&self.floating_ips, &self.deleted_floating_ips, id)
    }

    fn get_owner(&self, user_id: &str) -> Result<Owner, CloudError> {
        self.owner_lookups.set(self.owner_lookups.get() + 1);
        self.owners
            .get(user_id)
            .cloned()
            .ok_or_else(|| CloudError::NotFound {
                id: user_id.to_string(),
            })
    }
}

/// Flag-state store held in memory, with switchable load/store failures.
pub struct MemoryStore {
    state: RefCell<FlagState>,
    fail_loads: bool,
    fail_stores: bool,
    stores: Cell<usize>,
}

impl MemoryStore {
    pub fn new(cloud: &str, kind: ResourceKind) -> Self {
        Self::with_state(FlagState::empty(cloud, kind))
    }

    pub fn with_state(state: FlagState) -> Self {
        Self {
            state: RefCell::new(state),
            fail_loads: false,
            fail_stores: false,
            stores: Cell::new(0),
        }
    }

    pub fn failing_loads(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    pub fn failing_stores(mut self) -> Self {
        self.fail_stores = true;
        self
    }

    /// The state as last stored (or as seeded).
    pub fn current(&self) -> FlagState {
        self.state.borrow().clone()
    }

    /// Number of successful `store` calls.
    pub fn store_count(&self) -> usize {
        self.stores.get()
    }
}

impl FlagStateStore for MemoryStore {
    fn load(&self) -> Result<FlagState, StateStoreError> {
        if self.fail_loads {
            return Err(StateStoreError::Corrupted {
                path: "memory".into(),
                message: "simulated read failure".to_string(),
            });
        }
        Ok(self.state.borrow().clone())
    }

    fn store(&self, state: &FlagState) -> Result<(), StateStoreError> {
        if self.fail_stores {
            return Err(StateStoreError::WriteFailed {
                path: "memory".into(),
                message: "simulated write failure".to_string(),
            });
        }
        self.state.replace(state.clone());
        self.stores.set(self.stores.get() + 1);
        Ok(())
    }
}

/// Transport that records messages instead of sending them.
#[derive(Default)]
pub struct RecordingTransport {
    messages: Mutex<Vec<MailMessage>>,
    failing: HashSet<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject messages addressed to `recipient`.
    pub fn failing_for(mut self, recipient: &str) -> Self {
        self.failing.insert(recipient.to_string());
        self
    }

    pub fn messages(&self) -> Vec<MailMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl MailTransport for RecordingTransport {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn send(&self, message: &MailMessage) -> Result<(), NotifyError> {
        if self.failing.contains(&message.to) {
            return Err(NotifyError::SendFailed {
                message: format!("mailbox {} unavailable", message.to),
            });
        }
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.clone());
        Ok(())
    }
}
