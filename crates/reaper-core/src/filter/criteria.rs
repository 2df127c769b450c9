use ipnetwork::IpNetwork;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::filter::errors::CriteriaError;
use crate::interval::Interval;

/// Filter options exactly as the operator typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaSpec {
    pub age: Option<String>,
    pub name: Option<String>,
    pub skip_name: Option<String>,
    pub with_attached: bool,
    pub floating_subnet: Option<String>,
    pub static_subnet: Option<String>,
}

/// Name test with a uniform interface whether or not a pattern was given.
///
/// Patterns are anchored at the start of the name, so `pet-.*` matches
/// `pet-server-6` but not `server-pet-4`.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    Constant(bool),
    Pattern(Regex),
}

impl NameMatcher {
    fn compile(
        flag: &'static str,
        pattern: Option<&str>,
        default: bool,
    ) -> Result<Self, CriteriaError> {
        let Some(pattern) = pattern else {
            return Ok(NameMatcher::Constant(default));
        };

        let invalid = |e: regex::Error| CriteriaError::InvalidPattern {
            flag,
            pattern: pattern.to_string(),
            message: e.to_string(),
        };

        // Validate the raw pattern first so wrapping can't change its meaning.
        Regex::new(pattern).map_err(invalid)?;
        let anchored = Regex::new(&format!("^(?:{})", pattern)).map_err(invalid)?;
        Ok(NameMatcher::Pattern(anchored))
    }

    pub fn is_match(&self, name: &str) -> bool {
        match self {
            NameMatcher::Constant(value) => *value,
            NameMatcher::Pattern(regex) => regex.is_match(name),
        }
    }
}

/// Compiled, immutable filter configuration for one invocation.
///
/// Every field is optional; an absent field disables its predicate rather
/// than rejecting everything.
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    spec: CriteriaSpec,
    age: Option<Interval>,
    name: NameMatcher,
    skip_name: NameMatcher,
    with_attached: bool,
    floating_subnet: Option<IpNetwork>,
    static_subnet: Option<IpNetwork>,
}

impl FilterCriteria {
    pub fn compile(spec: CriteriaSpec) -> Result<Self, CriteriaError> {
        let age = spec.age.as_deref().map(Interval::parse);
        if let Some(interval) = &age
            && interval.is_zero()
        {
            warn!(
                event = "core.criteria.zero_age",
                age = ?spec.age,
                "Age has no recognized unit and parses to zero - every resource is old enough"
            );
        }

        let name = NameMatcher::compile("--name", spec.name.as_deref(), true)?;
        let skip_name = NameMatcher::compile("--skip-name", spec.skip_name.as_deref(), false)?;
        let floating_subnet = parse_network("--floating-subnet", spec.floating_subnet.as_deref())?;
        let static_subnet = parse_network("--static-subnet", spec.static_subnet.as_deref())?;

        debug!(
            event = "core.criteria.compiled",
            age = ?age.map(|a| a.render()),
            name = ?spec.name,
            skip_name = ?spec.skip_name,
            with_attached = spec.with_attached,
            floating_subnet = ?floating_subnet,
            static_subnet = ?static_subnet
        );

        Ok(Self {
            with_attached: spec.with_attached,
            spec,
            age,
            name,
            skip_name,
            floating_subnet,
            static_subnet,
        })
    }

    /// The raw operator input, for quoting back in notifications.
    pub fn spec(&self) -> &CriteriaSpec {
        &self.spec
    }

    pub fn age(&self) -> Option<Interval> {
        self.age
    }

    pub fn name(&self) -> &NameMatcher {
        &self.name
    }

    pub fn skip_name(&self) -> &NameMatcher {
        &self.skip_name
    }

    pub fn with_attached(&self) -> bool {
        self.with_attached
    }

    pub fn floating_subnet(&self) -> Option<IpNetwork> {
        self.floating_subnet
    }

    pub fn static_subnet(&self) -> Option<IpNetwork> {
        self.static_subnet
    }
}

fn parse_network(flag: &'static str, value: Option<&str>) -> Result<Option<IpNetwork>, CriteriaError> {
    value
        .map(|network| {
            network
                .trim()
                .parse::<IpNetwork>()
                .map_err(|e| CriteriaError::InvalidSubnet {
                    flag,
                    network: network.to_string(),
                    message: e.to_string(),
                })
        })
        .transpose()
}
