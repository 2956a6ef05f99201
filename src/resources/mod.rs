//! Managed resource handlers, one module per resource type.

use std::sync::Arc;

use crate::resource::Resource;

mod backup;
mod bucket;
mod dns_record;
mod domain;
mod fip;
mod firewall;
mod gateway;
mod image;
mod kubernetes;
mod kubernetes_group;
mod loadbalancer;
mod project;
mod script;
mod server;
mod server_snapshot;
mod sshkey;
mod storage;
mod vpc;

pub use backup::BackupResource;
pub use bucket::BucketResource;
pub use dns_record::DnsRecordResource;
pub use domain::DomainResource;
pub use fip::FipResource;
pub use firewall::FirewallResource;
pub use gateway::GatewayResource;
pub use image::ImageResource;
pub use kubernetes::KubernetesResource;
pub use kubernetes_group::KubernetesGroupResource;
pub use loadbalancer::LoadBalancerResource;
pub use project::ProjectResource;
pub use script::ScriptResource;
pub use server::ServerResource;
pub use server_snapshot::ServerSnapshotResource;
pub use sshkey::SshKeyResource;
pub use storage::StorageResource;
pub use vpc::VpcResource;

/// Every resource handler, unconfigured.
pub fn all() -> Vec<Arc<dyn Resource>> {
    vec![
        Arc::new(BackupResource::new()),
        Arc::new(BucketResource::new()),
        Arc::new(DnsRecordResource::new()),
        Arc::new(DomainResource::new()),
        Arc::new(FipResource::new()),
        Arc::new(FirewallResource::new()),
        Arc::new(GatewayResource::new()),
        Arc::new(ImageResource::new()),
        Arc::new(KubernetesResource::new()),
        Arc::new(KubernetesGroupResource::new()),
        Arc::new(LoadBalancerResource::new()),
        Arc::new(ProjectResource::new()),
        Arc::new(ScriptResource::new()),
        Arc::new(ServerResource::new()),
        Arc::new(ServerSnapshotResource::new()),
        Arc::new(SshKeyResource::new()),
        Arc::new(StorageResource::new()),
        Arc::new(VpcResource::new()),
    ]
}
