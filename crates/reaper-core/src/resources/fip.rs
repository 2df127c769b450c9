//! Floating IP addresses: filtered by age, attachment and subnet.

use chrono::{DateTime, TimeDelta, Utc};

use crate::cloud::errors::CloudError;
use crate::cloud::traits::CloudClient;
use crate::filter::criteria::FilterCriteria;
use crate::filter::predicates::{AgePredicate, AttachedPredicate, PredicateSet, SubnetField, SubnetPredicate};

use super::traits::ResourceDescriptor;
use super::types::{ResourceKind, ResourceRecord};

pub struct FloatingIpDescriptor<'a> {
    client: &'a dyn CloudClient,
}

impl<'a> FloatingIpDescriptor<'a> {
    pub fn new(client: &'a dyn CloudClient) -> Self {
        Self { client }
    }
}

impl ResourceDescriptor for FloatingIpDescriptor<'_> {
    fn kind(&self) -> ResourceKind {
        ResourceKind::FloatingIp
    }

    fn list(&self) -> Result<Vec<ResourceRecord>, CloudError> {
        self.client.list_floating_ips()
    }

    fn delete(&self, id: &str) -> Result<(), CloudError> {
        self.client.delete_floating_ip(id)
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
        }
        set.push(AttachedPredicate::new(criteria.with_attached()));
        if let Some(network) = criteria.floating_subnet() {
            set.push(SubnetPredicate::new(SubnetField::Floating, network));
        }
        if let Some(network) = criteria.static_subnet() {
            set.push(SubnetPredicate::new(SubnetField::Fixed, network));
        }
        set
    }
}
