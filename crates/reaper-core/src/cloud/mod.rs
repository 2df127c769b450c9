pub mod errors;
pub mod openstack;
pub mod traits;
pub mod types;

pub use errors::CloudError;
pub use openstack::OpenStackCli;
pub use traits::CloudClient;
pub use types::Owner;
