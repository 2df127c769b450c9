use chrono::{DateTime, TimeDelta, Utc};
use ipnetwork::IpNetwork;

use crate::filter::criteria::NameMatcher;
use crate::filter::errors::PredicateError;
use crate::resources::types::{ResourceDetails, ResourceRecord};

/// A pure yes/no test over one record.
pub trait Predicate: Send + Sync {
    /// Short label used in stage counts and logs (e.g. "age").
    fn name(&self) -> &'static str;

    /// `Ok(true)` keeps the record, `Ok(false)` drops it. `Err` also drops
    /// it, but tells the pipeline the answer was not a plain "no".
    fn evaluate(&self, record: &ResourceRecord) -> Result<bool, PredicateError>;
}

/// `now > created_at + threshold`, with `now` fixed at construction.
pub struct AgePredicate {
    threshold: TimeDelta,
    now: DateTime<Utc>,
}

impl AgePredicate {
    pub fn new(threshold: TimeDelta, now: DateTime<Utc>) -> Self {
        Self { threshold, now }
    }
}

impl Predicate for AgePredicate {
    fn name(&self) -> &'static str {
        "age"
    }

    fn evaluate(&self, record: &ResourceRecord) -> Result<bool, PredicateError> {
        // A cutoff past the end of time means nothing is old enough.
        Ok(record
            .created_at
            .checked_add_signed(self.threshold)
            .is_some_and(|cutoff| self.now > cutoff))
    }
}

pub struct NameExemptPredicate {
    matcher: NameMatcher,
}

impl NameExemptPredicate {
    pub fn new(matcher: NameMatcher) -> Self {
        Self { matcher }
    }
}

impl Predicate for NameExemptPredicate {
    fn name(&self) -> &'static str {
        "skip-name"
    }

    fn evaluate(&self, record: &ResourceRecord) -> Result<bool, PredicateError> {
        Ok(!self.matcher.is_match(&record.name))
    }
}

pub struct NameMatchPredicate {
    matcher: NameMatcher,
}

impl NameMatchPredicate {
    pub fn new(matcher: NameMatcher) -> Self {
        Self { matcher }
    }
}

impl Predicate for NameMatchPredicate {
    fn name(&self) -> &'static str {
        "name"
    }

    fn evaluate(&self, record: &ResourceRecord) -> Result<bool, PredicateError> {
        Ok(self.matcher.is_match(&record.name))
    }
}

/// Attached floating IPs are only candidates with `--with-attached`.
pub struct AttachedPredicate {
    with_attached: bool,
}

impl AttachedPredicate {
    pub fn new(with_attached: bool) -> Self {
        Self { with_attached }
    }
}

impl Predicate for AttachedPredicate {
    fn name(&self) -> &'static str {
        "attached"
    }

    fn evaluate(&self, record: &ResourceRecord) -> Result<bool, PredicateError> {
        match &record.details {
            ResourceDetails::FloatingIp { attached, .. } => Ok(self.with_attached || !attached),
            ResourceDetails::Server { .. } => Ok(true),
        }
    }
}

/// Which address of a floating IP a subnet test looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetField {
    Floating,
    Fixed,
}

pub struct SubnetPredicate {
    field: SubnetField,
    network: IpNetwork,
}

impl SubnetPredicate {
    pub fn new(field: SubnetField, network: IpNetwork) -> Self {
        Self { field, network }
    }
}

impl Predicate for SubnetPredicate {
    fn name(&self) -> &'static str {
        match self.field {
            SubnetField::Floating => "floating-subnet",
            SubnetField::Fixed => "static-subnet",
        }
    }

    fn evaluate(&self, record: &ResourceRecord) -> Result<bool, PredicateError> {
        let address = match (&record.details, self.field) {
            (
                ResourceDetails::FloatingIp {
                    floating_address, ..
                },
                SubnetField::Floating,
            ) => Some(*floating_address),
            (ResourceDetails::FloatingIp { fixed_address, .. }, SubnetField::Fixed) => {
                *fixed_address
            }
            (ResourceDetails::Server { .. }, _) => None,
        };

        // No address to test (e.g. unattached, no fixed IP) is simply "not in".
        let Some(address) = address else {
            return Ok(false);
        };

        if address.is_ipv4() != self.network.is_ipv4() {
            return Err(PredicateError::AddressFamilyMismatch {
                network: self.network,
                address,
            });
        }

        Ok(self.network.contains(address))
    }
}

/// Ordered list of active predicates for one pass.
#[derive(Default)]
pub struct PredicateSet {
    predicates: Vec<Box<dyn Predicate>>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: impl Predicate + 'static) {
        self.predicates.push(Box::new(predicate));
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.predicates.iter().map(|p| p.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Predicate> {
        self.predicates.iter().map(|p| p.as_ref())
    }

    /// Reverse application order. Only useful for checking that order
    /// never changes the outcome.
    pub fn reversed(mut self) -> Self {
        self.predicates.reverse();
        self
    }
}
