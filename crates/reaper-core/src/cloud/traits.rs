//! Cloud client trait definition.

use crate::cloud::errors::CloudError;
use crate::cloud::types::Owner;
use crate::resources::types::ResourceRecord;

/// The slice of a cloud API the reaper needs.
///
/// One call per logical operation, synchronous, no retries. Implementations
/// surface failures as `CloudError` and leave retry policy to the operator.
pub trait CloudClient {
    /// Stable identity of the target cloud, used to key persisted state.
    fn identity(&self) -> &str;

    fn list_servers(&self) -> Result<Vec<ResourceRecord>, CloudError>;

    fn list_floating_ips(&self) -> Result<Vec<ResourceRecord>, CloudError>;

    fn delete_server(&self, id: &str) -> Result<(), CloudError>;

    fn delete_floating_ip(&self, id: &str) -> Result<(), CloudError>;

    fn get_owner(&self, user_id: &str) -> Result<Owner, CloudError>;
}
