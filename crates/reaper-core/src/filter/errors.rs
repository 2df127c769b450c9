use std::net::IpAddr;

use ipnetwork::IpNetwork;

use crate::errors::ReaperError;

/// Malformed filter configuration. Always raised before any cloud call.
#[derive(Debug, thiserror::Error)]
pub enum CriteriaError {
    #[error("Invalid {flag} pattern '{pattern}': {message}")]
    InvalidPattern {
        flag: &'static str,
        pattern: String,
        message: String,
    },

    #[error("Invalid {flag} network '{network}': {message}")]
    InvalidSubnet {
        flag: &'static str,
        network: String,
        message: String,
    },
}

impl ReaperError for CriteriaError {
    fn error_code(&self) -> &'static str {
        match self {
            CriteriaError::InvalidPattern { .. } => "CRITERIA_INVALID_PATTERN",
            CriteriaError::InvalidSubnet { .. } => "CRITERIA_INVALID_SUBNET",
        }
    }

    fn is_user_error(&self) -> bool {
        true
    }
}

/// A predicate could not give a yes/no answer for one record.
///
/// The pipeline treats this as "not selected" and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
    #[error("Address {address} is not the same IP family as network {network}")]
    AddressFamilyMismatch { network: IpNetwork, address: IpAddr },
}

impl ReaperError for PredicateError {
    fn error_code(&self) -> &'static str {
        match self {
            PredicateError::AddressFamilyMismatch { .. } => "PREDICATE_ADDRESS_FAMILY_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_subnet_display() {
        let error = CriteriaError::InvalidSubnet {
            flag: "--floating-subnet",
            network: "10.0.0.0/33".to_string(),
            message: "invalid prefix".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid --floating-subnet network '10.0.0.0/33': invalid prefix"
        );
        assert_eq!(error.error_code(), "CRITERIA_INVALID_SUBNET");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_address_family_mismatch_display() {
        let error = PredicateError::AddressFamilyMismatch {
            network: "2001:db8::/32".parse().unwrap(),
            address: "10.0.0.1".parse().unwrap(),
        };
        assert!(error.to_string().contains("10.0.0.1"));
        assert!(error.to_string().contains("2001:db8::/32"));
        assert_eq!(error.error_code(), "PREDICATE_ADDRESS_FAMILY_MISMATCH");
        assert!(!error.is_user_error());
    }
}
