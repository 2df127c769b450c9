use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resource types the reaper knows how to clean up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Server,
    #[serde(rename = "fip")]
    FloatingIp,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Server, ResourceKind::FloatingIp];

    /// CLI subcommand name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Server => "server",
            ResourceKind::FloatingIp => "fip",
        }
    }

    /// Singular noun for messages.
    pub fn noun(&self) -> &'static str {
        match self {
            ResourceKind::Server => "server",
            ResourceKind::FloatingIp => "floating IP",
        }
    }

    /// Plural noun for reports and log messages.
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Server => "servers",
            ResourceKind::FloatingIp => "floating IPs",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "server" | "servers" => Ok(ResourceKind::Server),
            "fip" | "fips" | "floating-ip" => Ok(ResourceKind::FloatingIp),
            _ => Err(format!(
                "Unknown resource type '{}'. Known types: server, fip",
                s
            )),
        }
    }
}

/// Read-only snapshot of one cloud resource, as returned by the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub details: ResourceDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceDetails {
    Server {
        owner_id: Option<String>,
    },
    FloatingIp {
        attached: bool,
        fixed_address: Option<IpAddr>,
        floating_address: IpAddr,
    },
}

impl ResourceRecord {
    pub fn server(
        id: impl Into<String>,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        owner_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at,
            details: ResourceDetails::Server { owner_id },
        }
    }

    /// Floating IPs have no name of their own; the address stands in for it.
    pub fn floating_ip(
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        floating_address: IpAddr,
        fixed_address: Option<IpAddr>,
        attached: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: floating_address.to_string(),
            created_at,
            details: ResourceDetails::FloatingIp {
                attached,
                fixed_address,
                floating_address,
            },
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self.details {
            ResourceDetails::Server { .. } => ResourceKind::Server,
            ResourceDetails::FloatingIp { .. } => ResourceKind::FloatingIp,
        }
    }

    pub fn owner_id(&self) -> Option<&str> {
        match &self.details {
            ResourceDetails::Server { owner_id } => owner_id.as_deref(),
            ResourceDetails::FloatingIp { .. } => None,
        }
    }
}
