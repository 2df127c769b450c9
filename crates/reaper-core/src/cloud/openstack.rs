//! `CloudClient` backed by the `openstack` command-line client.
//!
//! Every call shells out with `-f json` and parses stdout. Listings take
//! one `list` call plus one `show` per resource. Credentials come from the
//! usual `clouds.yaml` / `OS_*` environment handled by the client itself;
//! the reaper only passes `--os-cloud` through.

use std::net::IpAddr;
use std::process::Command;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cloud::errors::CloudError;
use crate::cloud::traits::CloudClient;
use crate::cloud::types::Owner;
use crate::resources::types::ResourceRecord;

/// Identity used for state files when no cloud name is configured.
pub const DEFAULT_CLOUD_IDENTITY: &str = "default";

pub struct OpenStackCli {
    binary: String,
    cloud: Option<String>,
}

impl OpenStackCli {
    pub fn new(binary: impl Into<String>, cloud: Option<String>) -> Self {
        Self {
            binary: binary.into(),
            cloud: cloud.filter(|c| !c.trim().is_empty()),
        }
    }

    /// Check if the configured client binary is on PATH.
    pub fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    fn run(&self, args: &[&str]) -> Result<String, CloudError> {
        let command_label = args.join(" ");
        let mut command = Command::new(&self.binary);
        if let Some(cloud) = &self.cloud {
            command.arg("--os-cloud").arg(cloud);
        }
        command.args(args);

        debug!(
            event = "core.cloud.command_started",
            command = %command_label,
            cloud = ?self.cloud
        );

        let output = command.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CloudError::ToolNotFound {
                    tool: self.binary.clone(),
                }
            } else {
                CloudError::IoError { source: e }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                event = "core.cloud.command_failed",
                command = %command_label,
                status = %output.status,
                stderr = %stderr.trim()
            );
            return Err(CloudError::CommandFailed {
                command: command_label,
                message: format!("exit {}: {}", output.status, stderr.trim()),
            });
        }

        debug!(event = "core.cloud.command_completed", command = %command_label);
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OpenStackCli {
    /// List IDs, then `show` each one. List output carries neither the
    /// creation time nor the owning user, so detail calls are unavoidable.
    ///
    /// A `show` that fails for one ID (usually deleted in between) skips
    /// that record; missing tools and unparseable output still abort.
    fn list_detailed(
        &self,
        resource: &[&str],
        label: &str,
        parse_detail: fn(&str) -> Result<ResourceRecord, String>,
    ) -> Result<Vec<ResourceRecord>, CloudError> {
        let mut list_args = resource.to_vec();
        list_args.extend(["list", "-f", "json"]);
        let stdout = self.run(&list_args)?;
        let ids = parse_ids(&stdout).map_err(|message| CloudError::InvalidResponse {
            command: format!("{} list", label),
            message,
        })?;

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            let mut show_args = resource.to_vec();
            show_args.extend(["show", id.as_str(), "-f", "json"]);
            let stdout = match self.run(&show_args) {
                Ok(stdout) => stdout,
                Err(CloudError::CommandFailed { message, .. }) => {
                    warn!(
                        event = "core.cloud.show_skipped",
                        resource = label,
                        id = %id,
                        error = %message
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            let record = parse_detail(&stdout).map_err(|message| CloudError::InvalidResponse {
                command: format!("{} show {}", label, id),
                message,
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

impl CloudClient for OpenStackCli {
    fn identity(&self) -> &str {
        self.cloud.as_deref().unwrap_or(DEFAULT_CLOUD_IDENTITY)
    }

    fn list_servers(&self) -> Result<Vec<ResourceRecord>, CloudError> {
        let servers = self.list_detailed(&["server"], "server", parse_server)?;
        info!(event = "core.cloud.servers_listed", count = servers.len());
        Ok(servers)
    }

    fn list_floating_ips(&self) -> Result<Vec<ResourceRecord>, CloudError> {
        let fips = self.list_detailed(&["floating", "ip"], "floating ip", parse_floating_ip)?;
        info!(event = "core.cloud.floating_ips_listed", count = fips.len());
        Ok(fips)
    }

    fn delete_server(&self, id: &str) -> Result<(), CloudError> {
        self.run(&["server", "delete", id]).map(|_| ())
    }

    fn delete_floating_ip(&self, id: &str) -> Result<(), CloudError> {
        self.run(&["floating", "ip", "delete", id]).map(|_| ())
    }

    fn get_owner(&self, user_id: &str) -> Result<Owner, CloudError> {
        let stdout = self.run(&["user", "show", user_id, "-f", "json"])?;
        parse_owner(&stdout).map_err(|message| CloudError::InvalidResponse {
            command: "user show".to_string(),
            message,
        })
    }
}

// `list` prints column titles ("ID"); `show` prints API field names
// (created, user_id). Aliases cover both so either shape parses.

#[derive(Debug, Deserialize)]
struct RawListEntry {
    #[serde(alias = "ID")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    #[serde(alias = "ID")]
    id: String,
    #[serde(alias = "Name")]
    name: String,
    #[serde(alias = "created_at", alias = "Created At")]
    created: String,
    #[serde(alias = "User ID", default)]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFloatingIp {
    #[serde(alias = "ID")]
    id: String,
    #[serde(alias = "Floating IP Address")]
    floating_ip_address: String,
    #[serde(alias = "Fixed IP Address", default)]
    fixed_ip_address: Option<String>,
    #[serde(alias = "Port", default)]
    port_id: Option<String>,
    #[serde(alias = "created", alias = "Created At")]
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    #[serde(alias = "Name")]
    name: String,
    #[serde(alias = "Email", default)]
    email: Option<String>,
}

fn parse_ids(json: &str) -> Result<Vec<String>, String> {
    let raw: Vec<RawListEntry> = serde_json::from_str(json).map_err(|e| e.to_string())?;
    Ok(raw.into_iter().map(|entry| entry.id).collect())
}

fn parse_server(json: &str) -> Result<ResourceRecord, String> {
    let server: RawServer = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let created_at =
        parse_timestamp(&server.created).map_err(|e| format!("server {}: {}", server.id, e))?;
    Ok(ResourceRecord::server(
        server.id,
        server.name,
        created_at,
        server.user_id.filter(|o| !o.is_empty()),
    ))
}

fn parse_floating_ip(json: &str) -> Result<ResourceRecord, String> {
    let fip: RawFloatingIp = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let created_at = parse_timestamp(&fip.created_at)
        .map_err(|e| format!("floating ip {}: {}", fip.id, e))?;
    let floating_address: IpAddr = fip.floating_ip_address.parse().map_err(|e| {
        format!(
            "floating ip {}: bad address '{}': {}",
            fip.id, fip.floating_ip_address, e
        )
    })?;
    let fixed_address = match fip.fixed_ip_address.as_deref() {
        None | Some("") => None,
        Some(addr) => Some(addr.parse::<IpAddr>().map_err(|e| {
            format!("floating ip {}: bad fixed address '{}': {}", fip.id, addr, e)
        })?),
    };
    let attached = fip.port_id.is_some_and(|p| !p.is_empty());
    Ok(ResourceRecord::floating_ip(
        fip.id,
        created_at,
        floating_address,
        fixed_address,
        attached,
    ))
}

fn parse_owner(json: &str) -> Result<Owner, String> {
    let raw: RawUser = serde_json::from_str(json).map_err(|e| e.to_string())?;
    Ok(Owner {
        name: raw.name,
        email: raw.email.filter(|e| !e.is_empty()),
    })
}

/// Accept RFC 3339 and the zone-less form some services emit (assumed UTC).
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("bad timestamp '{}': {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::types::ResourceDetails;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2018, 2, 23, 16, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2018-02-23T16:00:00Z").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2018-02-23T17:00:00+01:00").unwrap(),
            expected
        );
        assert_eq!(
            parse_timestamp("2018-02-23T16:00:00.000000").unwrap(),
            expected
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_parse_ids_from_list_columns() {
        let servers = r#"[
            {"ID": "1", "Name": "test-server-1", "Status": "ACTIVE",
             "Networks": {"private": ["10.0.0.3"]}, "Image": "cirros", "Flavor": "m1.tiny"},
            {"ID": "2", "Name": "pet-server-6", "Status": "SHUTOFF",
             "Networks": {}, "Image": "N/A (booted from volume)", "Flavor": "m1.small"}
        ]"#;
        assert_eq!(parse_ids(servers).unwrap(), vec!["1", "2"]);

        let fips = r#"[
            {"ID": "f1", "Floating IP Address": "10.0.0.5", "Fixed IP Address": null,
             "Port": null, "Floating Network": "n-1", "Project": "p-1"}
        ]"#;
        assert_eq!(parse_ids(fips).unwrap(), vec!["f1"]);
        assert_eq!(parse_ids("[]").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_parse_server_show_output() {
        let json = r#"{
            "OS-EXT-STS:vm_state": "active", "accessIPv4": "",
            "addresses": {"private": ["10.0.0.3"]}, "config_drive": "",
            "created": "2018-02-20T15:59:59Z", "flavor": "m1.tiny (1)",
            "id": "1", "image": "cirros (c0ffee)", "name": "test-server-1",
            "project_id": "p-1", "status": "ACTIVE",
            "updated": "2018-02-20T16:01:00Z", "user_id": "u-1"
        }"#;
        let server = parse_server(json).unwrap();
        assert_eq!(server.id, "1");
        assert_eq!(server.name, "test-server-1");
        assert_eq!(server.owner_id(), Some("u-1"));
        assert_eq!(
            server.created_at,
            Utc.with_ymd_and_hms(2018, 2, 20, 15, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_parse_server_without_user() {
        let json = r#"{"id": "2", "name": "web", "created": "2017-12-31T12:00:00Z", "user_id": ""}"#;
        assert_eq!(parse_server(json).unwrap().owner_id(), None);
    }

    #[test]
    fn test_parse_server_missing_created_is_error() {
        let json = r#"{"ID": "1", "Name": "x", "Status": "ACTIVE"}"#;
        assert!(parse_server(json).is_err());
    }

    #[test]
    fn test_parse_floating_ip_show_output() {
        let json = r#"{
            "created_at": "2018-01-01T00:00:00Z", "description": "",
            "fixed_ip_address": null, "floating_ip_address": "10.0.0.5",
            "floating_network_id": "n-1", "id": "f1", "port_id": null,
            "project_id": "p-1", "router_id": null, "status": "DOWN",
            "updated_at": "2018-01-01T00:00:00Z"
        }"#;
        let fip = parse_floating_ip(json).unwrap();
        assert_eq!(
            fip.details,
            ResourceDetails::FloatingIp {
                attached: false,
                fixed_address: None,
                floating_address: "10.0.0.5".parse().unwrap(),
            }
        );

        let attached = r#"{"id": "f2", "floating_ip_address": "10.0.0.6",
            "fixed_ip_address": "192.168.1.4", "port_id": "p-1",
            "created_at": "2018-01-01T00:00:00Z"}"#;
        match parse_floating_ip(attached).unwrap().details {
            ResourceDetails::FloatingIp {
                attached,
                fixed_address,
                ..
            } => {
                assert!(attached);
                assert_eq!(fixed_address, Some("192.168.1.4".parse().unwrap()));
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_parse_floating_ip_bad_address() {
        let json = r#"{"id": "f1", "floating_ip_address": "nope", "created_at": "2018-01-01T00:00:00Z"}"#;
        let err = parse_floating_ip(json).unwrap_err();
        assert!(err.contains("bad address 'nope'"));
    }

    #[test]
    fn test_parse_owner() {
        let owner = parse_owner(r#"{"name": "alice", "email": "alice@example.org"}"#).unwrap();
        assert_eq!(owner.address(), Some("alice@example.org"));

        let owner = parse_owner(r#"{"name": "svc", "email": ""}"#).unwrap();
        assert_eq!(owner.email, None);
    }

    #[test]
    fn test_identity_defaults() {
        assert_eq!(OpenStackCli::new("openstack", None).identity(), "default");
        assert_eq!(
            OpenStackCli::new("openstack", Some(" ".to_string())).identity(),
            "default"
        );
        assert_eq!(
            OpenStackCli::new("openstack", Some("research".to_string())).identity(),
            "research"
        );
    }

    #[cfg(unix)]
    fn scripted_client(dir: &std::path::Path) -> OpenStackCli {
        use std::os::unix::fs::PermissionsExt;

        let script = r#"#!/bin/sh
case "$1 $2" in
  "server list") echo '[{"ID": "1", "Name": "a"}, {"ID": "2", "Name": "b"}]' ;;
  "server show")
    if [ "$3" = "2" ]; then
      echo "No server with a name or ID of '2' exists." >&2
      exit 1
    fi
    echo '{"id": "1", "name": "a", "created": "2018-01-01T00:00:00Z", "user_id": "u-1"}'
    ;;
  *) exit 2 ;;
esac
"#;
        let path = dir.join("openstack");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        OpenStackCli::new(path.to_string_lossy(), None)
    }

    #[cfg(unix)]
    #[test]
    fn test_list_servers_shows_each_and_skips_vanished() {
        let dir = tempfile::TempDir::new().unwrap();
        let client = scripted_client(dir.path());

        let servers = client.list_servers().unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].id, "1");
        assert_eq!(servers[0].owner_id(), Some("u-1"));
    }

    #[test]
    fn test_missing_binary_is_tool_not_found() {
        let client = OpenStackCli::new("reaper-test-no-such-binary", None);
        assert!(!client.is_available());
        let err = client.list_servers().unwrap_err();
        assert!(matches!(err, CloudError::ToolNotFound { .. }));
    }
}
