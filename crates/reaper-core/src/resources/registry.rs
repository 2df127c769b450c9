//! Lookup from resource kind to its descriptor.

use crate::cloud::traits::CloudClient;

use super::fip::FloatingIpDescriptor;
use super::server::ServerDescriptor;
use super::traits::ResourceDescriptor;
use super::types::ResourceKind;

/// Build the descriptor for `kind`, bound to one cloud client for this run.
pub fn descriptor_for<'a>(
    kind: ResourceKind,
    client: &'a dyn CloudClient,
) -> Box<dyn ResourceDescriptor + 'a> {
    match kind {
        ResourceKind::Server => Box::new(ServerDescriptor::new(client)),
        ResourceKind::FloatingIp => Box::new(FloatingIpDescriptor::new(client)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeCloud;

    #[test]
    fn test_descriptor_for_every_kind() {
        let cloud = FakeCloud::new();
        for kind in ResourceKind::ALL {
            let descriptor = descriptor_for(kind, &cloud);
            assert_eq!(descriptor.kind(), kind);
        }
    }

    #[test]
    fn test_only_servers_notify() {
        let cloud = FakeCloud::new();
        assert!(descriptor_for(ResourceKind::Server, &cloud).supports_notification());
        assert!(!descriptor_for(ResourceKind::FloatingIp, &cloud).supports_notification());
    }
}
