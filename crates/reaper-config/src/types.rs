use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Default binary used to talk to the cloud.
pub const DEFAULT_OPENSTACK_BIN: &str = "openstack";

/// Default mail submission binary.
pub const DEFAULT_SENDMAIL_BIN: &str = "sendmail";

pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaperConfig {
    pub cloud: CloudSettings,
    pub notify: NotifySettings,
    pub state: StateSettings,
}

/// `[cloud]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSettings {
    /// Named cloud from `clouds.yaml`. Falls back to `OS_CLOUD` when unset.
    pub name: Option<String>,
    pub openstack_bin: String,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            name: None,
            openstack_bin: DEFAULT_OPENSTACK_BIN.to_string(),
        }
    }
}

/// `[notify]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    pub sender: Option<String>,
    /// When set, every warning goes here instead of to resource owners.
    pub recipient: Option<String>,
    pub sendmail: String,
    /// SMTP relay to submit to. Unset means pipe to `sendmail`.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            sender: None,
            recipient: None,
            sendmail: DEFAULT_SENDMAIL_BIN.to_string(),
            smtp_host: None,
            smtp_port: DEFAULT_SMTP_PORT,
        }
    }
}

/// `[state]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateSettings {
    pub dir: Option<PathBuf>,
}

impl ReaperConfig {
    /// Reject settings that would only fail later, mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cloud.openstack_bin.trim().is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: "cloud.openstack_bin must not be empty".to_string(),
            });
        }

        if self.notify.sendmail.trim().is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: "notify.sendmail must not be empty".to_string(),
            });
        }

        if let Some(host) = &self.notify.smtp_host
            && host.trim().is_empty()
        {
            return Err(ConfigError::InvalidConfiguration {
                message: "notify.smtp_host must not be empty when set".to_string(),
            });
        }

        if self.notify.smtp_port == 0 {
            return Err(ConfigError::InvalidConfiguration {
                message: "notify.smtp_port must be between 1 and 65535".to_string(),
            });
        }

        for (field, value) in [
            ("notify.sender", &self.notify.sender),
            ("notify.recipient", &self.notify.recipient),
        ] {
            if let Some(address) = value
                && !address.contains('@')
            {
                return Err(ConfigError::InvalidConfiguration {
                    message: format!("{} '{}' is not an email address", field, address),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReaperConfig::default();
        assert_eq!(config.cloud.openstack_bin, "openstack");
        assert_eq!(config.notify.sendmail, "sendmail");
        assert_eq!(config.notify.smtp_host, None);
        assert_eq!(config.notify.smtp_port, 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_smtp_relay_settings() {
        let config: ReaperConfig = toml::from_str(
            r#"
            [notify]
            smtp_host = "mail.example.org"
            smtp_port = 2525
            "#,
        )
        .unwrap();
        assert_eq!(config.notify.smtp_host.as_deref(), Some("mail.example.org"));
        assert_eq!(config.notify.smtp_port, 2525);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_smtp_settings() {
        let mut config = ReaperConfig::default();
        config.notify.smtp_host = Some(" ".to_string());
        assert!(config.validate().is_err());

        let mut config = ReaperConfig::default();
        config.notify.smtp_port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("smtp_port"));
    }
    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ReaperConfig = toml::from_str(
            r#"
            [notify]
            sender = "cloud-admin@example.org"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.notify.sender.as_deref(),
            Some("cloud-admin@example.org")
        );
        assert_eq!(config.notify.sendmail, "sendmail");
        assert_eq!(config.cloud.openstack_bin, "openstack");
        assert!(config.state.dir.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_sender() {
        let mut config = ReaperConfig::default();
        config.notify.sender = Some("not-an-address".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("notify.sender"));
    }

    #[test]
    fn test_validate_rejects_empty_binary() {
        let mut config = ReaperConfig::default();
        config.cloud.openstack_bin = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }
}
