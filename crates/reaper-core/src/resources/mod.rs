pub mod fip;
pub mod registry;
pub mod server;
pub mod traits;
pub mod types;

pub use fip::FloatingIpDescriptor;
pub use registry::descriptor_for;
pub use server::ServerDescriptor;
pub use traits::{DeleteFailure, DeleteReport, ResourceDescriptor};
pub use types::{ResourceDetails, ResourceKind, ResourceRecord};
