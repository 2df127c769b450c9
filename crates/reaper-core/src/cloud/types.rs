use serde::{Deserialize, Serialize};

/// The user that created a resource, as far as notification cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    pub email: Option<String>,
}

impl Owner {
    /// The owner's address, if it looks deliverable.
    pub fn address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| email.contains('@'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_requires_at_sign() {
        let owner = Owner {
            name: "alice".to_string(),
            email: Some(" alice@example.org ".to_string()),
        };
        assert_eq!(owner.address(), Some("alice@example.org"));

        let owner = Owner {
            name: "bob".to_string(),
            email: Some("".to_string()),
        };
        assert_eq!(owner.address(), None);

        let owner = Owner {
            name: "carol".to_string(),
            email: None,
        };
        assert_eq!(owner.address(), None);
    }
}
