//! Virtual servers: filtered by age and name, owners are notifiable.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::cloud::errors::CloudError;
use crate::cloud::traits::CloudClient;
use crate::cloud::types::Owner;
use crate::filter::criteria::FilterCriteria;
use crate::filter::predicates::{
    AgePredicate, NameExemptPredicate, NameMatchPredicate, PredicateSet,
};

use super::traits::ResourceDescriptor;
use super::types::{ResourceKind, ResourceRecord};

pub struct ServerDescriptor<'a> {
    client: &'a dyn CloudClient,
}

impl<'a> ServerDescriptor<'a> {
    pub fn new(client: &'a dyn CloudClient) -> Self {
        Self { client }
    }
}

impl ResourceDescriptor for ServerDescriptor<'_> {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Server
    }

    fn list(&self) -> Result<Vec<ResourceRecord>, CloudError> {
        self.client.list_servers()
    }

    fn delete(&self, id: &str) -> Result<(), CloudError> {
        self.client.delete_server(id)
    }

    fn predicates(
        &self,
        criteria: &FilterCriteria,
        age_threshold: Option<TimeDelta>,
        now: DateTime<Utc>,
    ) -> PredicateSet {
        let mut set = PredicateSet::new();
        if let Some(threshold) = age_threshold {
            set.push(AgePredicate::new(threshold, now));
        } else {
            debug!(event = "core.resource.server_no_age", "No age provided");
        }
        set.push(NameExemptPredicate::new(criteria.skip_name().clone()));
        set.push(NameMatchPredicate::new(criteria.name().clone()));
        set
    }

    fn supports_notification(&self) -> bool {
        true
    }

    fn recipient_for(&self, record: &ResourceRecord) -> Result<Option<Owner>, CloudError> {
        match record.owner_id() {
            Some(user_id) => self.client.get_owner(user_id).map(Some),
            None => Ok(None),
        }
    }
}
