//! In-memory platform shared by the unit tests.
//!
//! Creations land in the matching list straight away, except for the types
//! the platform builds asynchronously (clusters, images, load balancers and
//! servers): their lists come back empty for the first `build_delay` calls.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::backup::CreateBackupRequest;
use super::bucket::CreateBucketRequest;
use super::domain::{CreateDomainRequest, DnsRecordRequest};
use super::fip::CreateFipRequest;
use super::firewall::CreateFirewallRequest;
use super::gateway::CreateGatewayRequest;
use super::image::CreateImageRequest;
use super::kubernetes::{CreateKubernetesGroupRequest, CreateKubernetesRequest};
use super::loadbalancer::CreateLoadBalancerRequest;
use super::project::ProjectRequest;
use super::script::ScriptRequest;
use super::server::{CreateServerRequest, PowerAction};
use super::snapshot::{CreateSnapshotRequest, UpdateSnapshotRequest};
use super::sshkey::CreateSshKeyRequest;
use super::storage::CreateStorageRequest;
use super::vpc::CreateVpcRequest;
use super::*;

#[derive(Default)]
pub(crate) struct FakeVpsie {
    pub backups: Mutex<Vec<Backup>>,
    pub buckets: Mutex<Vec<Bucket>>,
    pub datacenters: Mutex<Vec<Datacenter>>,
    pub domains: Mutex<Vec<Domain>>,
    pub records: Mutex<Vec<(String, DnsRecord)>>,
    pub fips: Mutex<Vec<Fip>>,
    pub firewalls: Mutex<Vec<Firewall>>,
    pub gateways: Mutex<Vec<Gateway>>,
    pub images: Mutex<Vec<Image>>,
    pub clusters: Mutex<Vec<KubernetesCluster>>,
    pub groups: Mutex<Vec<KubernetesGroup>>,
    pub loadbalancers: Mutex<Vec<LoadBalancer>>,
    pub projects: Mutex<Vec<Project>>,
    pub scripts: Mutex<Vec<Script>>,
    pub servers: Mutex<Vec<Server>>,
    pub snapshots: Mutex<Vec<Snapshot>>,
    pub sshkeys: Mutex<Vec<SshKey>>,
    pub storages: Mutex<Vec<Storage>>,
    pub vpcs: Mutex<Vec<Vpc>>,
    pub build_delay: u32,
    lists: Mutex<BTreeMap<&'static str, u32>>,
    next_id: AtomicI64,
    calls: Mutex<Vec<String>>,
}

impl FakeVpsie {
    pub fn with_build_delay(build_delay: u32) -> Self {
        Self {
            build_delay,
            ..Default::default()
        }
    }

    /// Mutating calls in the order they were made.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of times a built collection was listed.
    pub fn list_count(&self, kind: &str) -> u32 {
        self.lists.lock().unwrap().get(kind).copied().unwrap_or(0)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn built<T: Clone>(&self, kind: &'static str, items: &Mutex<Vec<T>>) -> Vec<T> {
        let mut lists = self.lists.lock().unwrap();
        let count = lists.entry(kind).or_insert(0);
        *count += 1;
        if *count <= self.build_delay {
            return vec![];
        }
        items.lock().unwrap().clone()
    }
}

fn contents<T: Clone>(items: &Mutex<Vec<T>>) -> Vec<T> {
    items.lock().unwrap().clone()
}

fn lookup<T: Clone>(
    items: &Mutex<Vec<T>>,
    kind: &str,
    key: &str,
    predicate: impl Fn(&T) -> bool,
) -> Result<T, ApiError> {
    find_by(contents(items), kind, key, predicate)
}

fn remove<T>(
    items: &Mutex<Vec<T>>,
    kind: &str,
    key: &str,
    predicate: impl Fn(&T) -> bool,
) -> Result<(), ApiError> {
    let mut items = items.lock().unwrap();
    let before = items.len();
    items.retain(|item| !predicate(item));
    if items.len() == before {
        return Err(ApiError::NotFound(format!("{} {} not found", kind, key)));
    }
    Ok(())
}

fn modify<T>(
    items: &Mutex<Vec<T>>,
    kind: &str,
    key: &str,
    predicate: impl Fn(&T) -> bool,
    change: impl FnOnce(&mut T),
) -> Result<(), ApiError> {
    let mut items = items.lock().unwrap();
    match items.iter_mut().find(|item| predicate(&**item)) {
        Some(item) => {
            change(item);
            Ok(())
        },
        None => Err(ApiError::NotFound(format!("{} {} not found", kind, key))),
    }
}

#[async_trait]
impl BackupApi for FakeVpsie {
    async fn list_backups(&self) -> Result<Vec<Backup>, ApiError> {
        Ok(contents(&self.backups))
    }

    async fn get_backup(&self, identifier: &str) -> Result<Backup, ApiError> {
        lookup(&self.backups, "backup", identifier, |b| b.identifier == identifier)
    }

    async fn create_backup(&self, request: &CreateBackupRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create backup {}", request.name));
        self.backups.lock().unwrap().push(Backup {
            identifier: format!("bk-{}", id),
            name: request.name.clone(),
            note: request.note.clone(),
            vm_identifier: request.vm_identifier.clone(),
            ..Default::default()
        });
        Ok(())
    }

    async fn rename_backup(&self, identifier: &str, name: &str) -> Result<(), ApiError> {
        self.record(format!("rename backup {} {}", identifier, name));
        modify(&self.backups, "backup", identifier, |b| b.identifier == identifier, |b| {
            b.name = name.to_string()
        })
    }

    async fn delete_backup(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.backups, "backup", identifier, |b| b.identifier == identifier)
    }
}

#[async_trait]
impl BucketApi for FakeVpsie {
    async fn list_buckets(&self) -> Result<Vec<Bucket>, ApiError> {
        Ok(contents(&self.buckets))
    }

    async fn get_bucket(&self, identifier: &str) -> Result<Bucket, ApiError> {
        lookup(&self.buckets, "bucket", identifier, |b| b.identifier == identifier)
    }

    async fn create_bucket(&self, request: &CreateBucketRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create bucket {}", request.bucket_name));
        self.buckets.lock().unwrap().push(Bucket {
            identifier: format!("bkt-{}", id),
            bucket_name: request.bucket_name.clone(),
            project_id: request.project_id.clone(),
            datacenter_id: request.datacenter_id.clone(),
            file_listing: request.file_listing,
            access_key: "AK-TEST".to_string(),
            secret_key: "SK-TEST".to_string(),
            endpoint: "https://s3.example.test".to_string(),
            state: "active".to_string(),
            ..Default::default()
        });
        Ok(())
    }

    async fn set_file_listing(&self, identifier: &str, enabled: bool) -> Result<(), ApiError> {
        self.record(format!("file listing {} {}", identifier, enabled));
        modify(&self.buckets, "bucket", identifier, |b| b.identifier == identifier, |b| {
            b.file_listing = enabled
        })
    }

    async fn delete_bucket(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.buckets, "bucket", identifier, |b| b.identifier == identifier)
    }
}

#[async_trait]
impl DatacenterApi for FakeVpsie {
    async fn list_datacenters(&self) -> Result<Vec<Datacenter>, ApiError> {
        Ok(contents(&self.datacenters))
    }
}

#[async_trait]
impl DomainApi for FakeVpsie {
    async fn list_domains(&self) -> Result<Vec<Domain>, ApiError> {
        Ok(contents(&self.domains))
    }

    async fn create_domain(&self, request: &CreateDomainRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create domain {}", request.domain_name));
        self.domains.lock().unwrap().push(Domain {
            identifier: format!("dom-{}", id),
            domain_name: request.domain_name.clone(),
            project_identifier: request.project_identifier.clone(),
            nameserver_status: "pending".to_string(),
            ..Default::default()
        });
        Ok(())
    }

    async fn delete_domain(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.domains, "domain", identifier, |d| d.identifier == identifier)
    }

    async fn list_dns_records(&self, domain_identifier: &str) -> Result<Vec<DnsRecord>, ApiError> {
        Ok(contents(&self.records)
            .into_iter()
            .filter(|(domain, _)| domain == domain_identifier)
            .map(|(_, record)| record)
            .collect())
    }

    async fn create_dns_record(
        &self,
        domain_identifier: &str,
        request: &DnsRecordRequest,
    ) -> Result<DnsRecord, ApiError> {
        let record = DnsRecord {
            id: self.next_id(),
            record_type: request.record_type.clone(),
            name: request.name.clone(),
            content: request.content.clone(),
            ttl: request.ttl,
        };
        self.records
            .lock()
            .unwrap()
            .push((domain_identifier.to_string(), record.clone()));
        Ok(record)
    }

    async fn update_dns_record(
        &self,
        domain_identifier: &str,
        record_id: i64,
        request: &DnsRecordRequest,
    ) -> Result<(), ApiError> {
        modify(
            &self.records,
            "dns record",
            &record_id.to_string(),
            |(domain, r)| domain == domain_identifier && r.id == record_id,
            |(_, r)| {
                r.content = request.content.clone();
                r.ttl = request.ttl;
            },
        )
    }

    async fn delete_dns_record(
        &self,
        domain_identifier: &str,
        record_id: i64,
    ) -> Result<(), ApiError> {
        remove(&self.records, "dns record", &record_id.to_string(), |(domain, r)| {
            domain == domain_identifier && r.id == record_id
        })
    }
}

#[async_trait]
impl FipApi for FakeVpsie {
    async fn list_fips(&self) -> Result<Vec<Fip>, ApiError> {
        Ok(contents(&self.fips))
    }

    async fn create_fip(&self, request: &CreateFipRequest) -> Result<Fip, ApiError> {
        let id = self.next_id();
        let fip = Fip {
            id,
            ip: format!("198.51.100.{}", id),
            ip_type: request.ip_type.clone(),
            dc_identifier: request.dc_identifier.clone(),
            vm_identifier: request.vm_identifier.clone(),
            hostname: "web-1".to_string(),
            ..Default::default()
        };
        self.record(format!("create fip {}", request.vm_identifier));
        self.fips.lock().unwrap().push(fip.clone());
        Ok(fip)
    }

    async fn delete_fip(&self, id: i64) -> Result<(), ApiError> {
        remove(&self.fips, "floating IP", &id.to_string(), |f| f.id == id)
    }
}

#[async_trait]
impl FirewallApi for FakeVpsie {
    async fn list_firewalls(&self) -> Result<Vec<Firewall>, ApiError> {
        Ok(contents(&self.firewalls))
    }

    async fn get_firewall(&self, identifier: &str) -> Result<Firewall, ApiError> {
        lookup(&self.firewalls, "firewall", identifier, |f| f.identifier == identifier)
    }

    async fn create_firewall(&self, request: &CreateFirewallRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create firewall {}", request.group_name));
        self.firewalls.lock().unwrap().push(Firewall {
            identifier: format!("fw-{}", id),
            group_name: request.group_name.clone(),
            inbound_count: request.inbound.len() as i64,
            outbound_count: request.outbound.len() as i64,
            inbound: request.inbound.clone(),
            outbound: request.outbound.clone(),
            ..Default::default()
        });
        Ok(())
    }

    async fn rename_firewall(&self, identifier: &str, name: &str) -> Result<(), ApiError> {
        self.record(format!("rename firewall {} {}", identifier, name));
        modify(&self.firewalls, "firewall", identifier, |f| f.identifier == identifier, |f| {
            f.group_name = name.to_string()
        })
    }

    async fn delete_firewall(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.firewalls, "firewall", identifier, |f| f.identifier == identifier)
    }
}

#[async_trait]
impl GatewayApi for FakeVpsie {
    async fn list_gateways(&self) -> Result<Vec<Gateway>, ApiError> {
        Ok(contents(&self.gateways))
    }

    async fn get_gateway(&self, id: i64) -> Result<Gateway, ApiError> {
        lookup(&self.gateways, "gateway", &id.to_string(), |g| g.id == id)
    }

    async fn create_gateway(&self, request: &CreateGatewayRequest) -> Result<Gateway, ApiError> {
        let id = self.next_id();
        let gateway = Gateway {
            id,
            ip: format!("203.0.113.{}", id),
            ip_type: request.ip_type.clone(),
            dc_identifier: request.dc_identifier.clone(),
            attached_vpcs: request.vpc_ids.clone(),
            ..Default::default()
        };
        self.gateways.lock().unwrap().push(gateway.clone());
        Ok(gateway)
    }

    async fn attach_vpc(&self, id: i64, vpc_id: i64) -> Result<(), ApiError> {
        self.record(format!("attach {} {}", id, vpc_id));
        modify(&self.gateways, "gateway", &id.to_string(), |g| g.id == id, |g| {
            g.attached_vpcs.push(vpc_id)
        })
    }

    async fn detach_vpc(&self, id: i64, vpc_id: i64) -> Result<(), ApiError> {
        self.record(format!("detach {} {}", id, vpc_id));
        modify(&self.gateways, "gateway", &id.to_string(), |g| g.id == id, |g| {
            g.attached_vpcs.retain(|v| *v != vpc_id)
        })
    }

    async fn delete_gateway(&self, id: i64) -> Result<(), ApiError> {
        remove(&self.gateways, "gateway", &id.to_string(), |g| g.id == id)
    }
}

#[async_trait]
impl ImageApi for FakeVpsie {
    async fn list_images(&self) -> Result<Vec<Image>, ApiError> {
        Ok(self.built("images", &self.images))
    }

    async fn get_image(&self, identifier: &str) -> Result<Image, ApiError> {
        lookup(&self.images, "image", identifier, |i| {
            i.identifier == identifier && i.deleted == 0
        })
    }

    async fn create_image(&self, request: &CreateImageRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create image {}", request.image_name));
        self.images.lock().unwrap().push(Image {
            identifier: format!("img-{}", id),
            image_label: request.image_name.clone(),
            dc_identifier: request.dc_identifier.clone(),
            image_size: 2048,
            ..Default::default()
        });
        Ok(())
    }

    // Deleted images stay listed with the `deleted` flag set.
    async fn delete_image(&self, identifier: &str) -> Result<(), ApiError> {
        modify(
            &self.images,
            "image",
            identifier,
            |i| i.identifier == identifier && i.deleted == 0,
            |i| i.deleted = 1,
        )
    }
}

#[async_trait]
impl KubernetesApi for FakeVpsie {
    async fn list_clusters(&self) -> Result<Vec<KubernetesCluster>, ApiError> {
        Ok(self.built("clusters", &self.clusters))
    }

    async fn get_cluster(&self, identifier: &str) -> Result<KubernetesCluster, ApiError> {
        lookup(&self.clusters, "kubernetes cluster", identifier, |c| {
            c.identifier == identifier
        })
    }

    async fn create_cluster(&self, request: &CreateKubernetesRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create cluster {}", request.cluster_name));
        self.clusters.lock().unwrap().push(KubernetesCluster {
            identifier: format!("k8s-{}", id),
            cluster_name: request.cluster_name.clone(),
            version: request.kubernetes_version.clone(),
            dc_identifier: request.dc_identifier.clone(),
            project_id: request.project_id.clone(),
            vpc_id: request.vpc_id,
            nodes_count: request.nodes_num,
            state: "provisioning".to_string(),
            ..Default::default()
        });
        Ok(())
    }

    async fn delete_cluster(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.clusters, "kubernetes cluster", identifier, |c| {
            c.identifier == identifier
        })
    }

    async fn list_groups(
        &self,
        cluster_identifier: &str,
    ) -> Result<Vec<KubernetesGroup>, ApiError> {
        Ok(contents(&self.groups)
            .into_iter()
            .filter(|g| g.cluster_identifier == cluster_identifier)
            .collect())
    }

    async fn create_group(&self, request: &CreateKubernetesGroupRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create group {}", request.group_name));
        // Nodes join later, so a fresh group reports none.
        self.groups.lock().unwrap().push(KubernetesGroup {
            id,
            group_name: request.group_name.clone(),
            cluster_identifier: request.cluster_identifier.clone(),
            boxsize_id: request.boxsize_id,
            ..Default::default()
        });
        Ok(())
    }

    async fn add_group_nodes(&self, group_id: i64, count: i64) -> Result<(), ApiError> {
        self.record(format!("add {} {}", group_id, count));
        Ok(())
    }

    async fn remove_group_nodes(&self, group_id: i64, count: i64) -> Result<(), ApiError> {
        self.record(format!("remove {} {}", group_id, count));
        Ok(())
    }

    async fn delete_group(&self, group_id: i64) -> Result<(), ApiError> {
        remove(&self.groups, "kubernetes group", &group_id.to_string(), |g| {
            g.id == group_id
        })
    }
}

#[async_trait]
impl LoadBalancerApi for FakeVpsie {
    async fn list_loadbalancers(&self) -> Result<Vec<LoadBalancer>, ApiError> {
        Ok(self.built("loadbalancers", &self.loadbalancers))
    }

    async fn get_loadbalancer(&self, identifier: &str) -> Result<LoadBalancer, ApiError> {
        lookup(&self.loadbalancers, "load balancer", identifier, |lb| {
            lb.identifier == identifier
        })
    }

    async fn create_loadbalancer(
        &self,
        request: &CreateLoadBalancerRequest,
    ) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create loadbalancer {}", request.lb_name));
        self.loadbalancers.lock().unwrap().push(LoadBalancer {
            identifier: format!("lb-{}", id),
            lb_name: request.lb_name.clone(),
            algorithm: request.algorithm.clone(),
            dc_identifier: request.dc_identifier.clone(),
            redirect_http: request.redirect_http,
            rules: request.rules.clone(),
            ..Default::default()
        });
        Ok(())
    }

    async fn rename_loadbalancer(&self, identifier: &str, name: &str) -> Result<(), ApiError> {
        self.record(format!("rename loadbalancer {} {}", identifier, name));
        modify(
            &self.loadbalancers,
            "load balancer",
            identifier,
            |lb| lb.identifier == identifier,
            |lb| lb.lb_name = name.to_string(),
        )
    }

    async fn delete_loadbalancer(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.loadbalancers, "load balancer", identifier, |lb| {
            lb.identifier == identifier
        })
    }
}

#[async_trait]
impl ProjectApi for FakeVpsie {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        Ok(contents(&self.projects))
    }

    async fn get_project(&self, identifier: &str) -> Result<Project, ApiError> {
        lookup(&self.projects, "project", identifier, |p| p.identifier == identifier)
    }

    async fn create_project(&self, request: &ProjectRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create project {}", request.name));
        self.projects.lock().unwrap().push(Project {
            id,
            identifier: format!("prj-{}", id),
            name: request.name.clone(),
            description: request.description.clone(),
            ..Default::default()
        });
        Ok(())
    }

    async fn update_project(
        &self,
        identifier: &str,
        request: &ProjectRequest,
    ) -> Result<(), ApiError> {
        self.record(format!("update project {} {}", identifier, request.name));
        modify(&self.projects, "project", identifier, |p| p.identifier == identifier, |p| {
            p.name = request.name.clone();
            p.description = request.description.clone();
        })
    }

    async fn delete_project(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.projects, "project", identifier, |p| p.identifier == identifier)
    }
}

#[async_trait]
impl ScriptApi for FakeVpsie {
    async fn list_scripts(&self) -> Result<Vec<Script>, ApiError> {
        Ok(contents(&self.scripts))
    }

    async fn get_script(&self, identifier: &str) -> Result<Script, ApiError> {
        lookup(&self.scripts, "script", identifier, |s| s.identifier == identifier)
    }

    async fn create_script(&self, request: &ScriptRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create script {}", request.name));
        self.scripts.lock().unwrap().push(Script {
            identifier: format!("scr-{}", id),
            script_name: request.name.clone(),
            script: request.script.clone(),
            script_type: request.script_type.clone(),
            ..Default::default()
        });
        Ok(())
    }

    async fn update_script(
        &self,
        identifier: &str,
        request: &ScriptRequest,
    ) -> Result<(), ApiError> {
        self.record(format!("update script {}", identifier));
        modify(&self.scripts, "script", identifier, |s| s.identifier == identifier, |s| {
            s.script_name = request.name.clone();
            s.script = request.script.clone();
            s.script_type = request.script_type.clone();
        })
    }

    async fn delete_script(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.scripts, "script", identifier, |s| s.identifier == identifier)
    }
}

#[async_trait]
impl ServerApi for FakeVpsie {
    async fn list_servers(&self) -> Result<Vec<Server>, ApiError> {
        Ok(self.built("servers", &self.servers))
    }

    async fn get_server(&self, identifier: &str) -> Result<Server, ApiError> {
        lookup(&self.servers, "server", identifier, |s| s.identifier == identifier)
    }

    async fn create_server(&self, request: &CreateServerRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create server {}", request.hostname));
        self.servers.lock().unwrap().push(Server {
            identifier: format!("vm-{}", id),
            hostname: request.hostname.clone(),
            dc_identifier: request.dc_identifier.clone(),
            os_identifier: request.os_identifier.clone(),
            resource_identifier: request.resource_identifier.clone(),
            project_id: request.project_id.clone(),
            cpu: 1,
            ram: 1024,
            status: "running".to_string(),
            ..Default::default()
        });
        Ok(())
    }

    async fn change_hostname(&self, identifier: &str, hostname: &str) -> Result<(), ApiError> {
        self.record(format!("hostname {} {}", identifier, hostname));
        modify(&self.servers, "server", identifier, |s| s.identifier == identifier, |s| {
            s.hostname = hostname.to_string()
        })
    }

    async fn resize_server(&self, identifier: &str, cpu: i64, ram: i64) -> Result<(), ApiError> {
        self.record(format!("resize {} {} {}", identifier, cpu, ram));
        modify(&self.servers, "server", identifier, |s| s.identifier == identifier, |s| {
            s.cpu = cpu;
            s.ram = ram;
        })
    }

    async fn power(&self, identifier: &str, action: PowerAction) -> Result<(), ApiError> {
        self.record(format!("power {} {:?}", identifier, action));
        let status = match action {
            PowerAction::Start => "running",
            PowerAction::Stop => "stopped",
        };
        modify(&self.servers, "server", identifier, |s| s.identifier == identifier, |s| {
            s.status = status.to_string()
        })
    }

    async fn set_lock(&self, identifier: &str, locked: bool) -> Result<(), ApiError> {
        self.record(format!("lock {} {}", identifier, locked));
        modify(&self.servers, "server", identifier, |s| s.identifier == identifier, |s| {
            s.is_locked = i64::from(locked)
        })
    }

    async fn delete_server(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.servers, "server", identifier, |s| s.identifier == identifier)
    }
}

#[async_trait]
impl SnapshotApi for FakeVpsie {
    async fn list_snapshots(&self) -> Result<Vec<Snapshot>, ApiError> {
        Ok(contents(&self.snapshots))
    }

    async fn get_snapshot(&self, identifier: &str) -> Result<Snapshot, ApiError> {
        lookup(&self.snapshots, "snapshot", identifier, |s| s.identifier == identifier)
    }

    async fn create_snapshot(&self, request: &CreateSnapshotRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create snapshot {}", request.name));
        self.snapshots.lock().unwrap().push(Snapshot {
            identifier: format!("snap-{}", id),
            name: request.name.clone(),
            note: request.note.clone(),
            vm_identifier: request.vm_identifier.clone(),
            ..Default::default()
        });
        Ok(())
    }

    async fn update_snapshot(
        &self,
        identifier: &str,
        request: &UpdateSnapshotRequest,
    ) -> Result<(), ApiError> {
        self.record(format!("update snapshot {}", identifier));
        modify(&self.snapshots, "snapshot", identifier, |s| s.identifier == identifier, |s| {
            s.name = request.name.clone();
            s.note = request.note.clone();
        })
    }

    async fn delete_snapshot(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.snapshots, "snapshot", identifier, |s| s.identifier == identifier)
    }
}

#[async_trait]
impl SshKeyApi for FakeVpsie {
    async fn list_sshkeys(&self) -> Result<Vec<SshKey>, ApiError> {
        Ok(contents(&self.sshkeys))
    }

    async fn get_sshkey(&self, identifier: &str) -> Result<SshKey, ApiError> {
        lookup(&self.sshkeys, "ssh key", identifier, |k| k.identifier == identifier)
    }

    async fn create_sshkey(&self, request: &CreateSshKeyRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create sshkey {}", request.name));
        self.sshkeys.lock().unwrap().push(SshKey {
            id,
            identifier: format!("key-{}", id),
            name: request.name.clone(),
            private_key: request.private_key.clone(),
            ..Default::default()
        });
        Ok(())
    }

    async fn delete_sshkey(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.sshkeys, "ssh key", identifier, |k| k.identifier == identifier)
    }
}

#[async_trait]
impl StorageApi for FakeVpsie {
    async fn list_storages(&self) -> Result<Vec<Storage>, ApiError> {
        Ok(contents(&self.storages))
    }

    async fn get_storage(&self, identifier: &str) -> Result<Storage, ApiError> {
        lookup(&self.storages, "storage", identifier, |s| s.identifier == identifier)
    }

    async fn create_storage(&self, request: &CreateStorageRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create storage {}", request.name));
        self.storages.lock().unwrap().push(Storage {
            identifier: format!("vol-{}", id),
            name: request.name.clone(),
            description: request.description.clone(),
            size: request.size,
            storage_type: request.storage_type.clone(),
            disk_format: request.disk_format.clone(),
            dc_identifier: request.dc_identifier.clone(),
            ..Default::default()
        });
        Ok(())
    }

    async fn rename_storage(&self, identifier: &str, name: &str) -> Result<(), ApiError> {
        self.record(format!("rename storage {} {}", identifier, name));
        modify(&self.storages, "storage", identifier, |s| s.identifier == identifier, |s| {
            s.name = name.to_string()
        })
    }

    async fn resize_storage(&self, identifier: &str, size: i64) -> Result<(), ApiError> {
        self.record(format!("resize storage {} {}", identifier, size));
        modify(&self.storages, "storage", identifier, |s| s.identifier == identifier, |s| {
            s.size = size
        })
    }

    async fn attach_storage(&self, identifier: &str, vm_identifier: &str) -> Result<(), ApiError> {
        self.record(format!("attach storage {} {}", identifier, vm_identifier));
        modify(&self.storages, "storage", identifier, |s| s.identifier == identifier, |s| {
            s.vm_identifier = vm_identifier.to_string()
        })
    }

    async fn detach_storage(&self, identifier: &str) -> Result<(), ApiError> {
        self.record(format!("detach storage {}", identifier));
        modify(&self.storages, "storage", identifier, |s| s.identifier == identifier, |s| {
            s.vm_identifier.clear()
        })
    }

    async fn delete_storage(&self, identifier: &str) -> Result<(), ApiError> {
        remove(&self.storages, "storage", identifier, |s| s.identifier == identifier)
    }
}

#[async_trait]
impl VpcApi for FakeVpsie {
    async fn list_vpcs(&self) -> Result<Vec<Vpc>, ApiError> {
        Ok(contents(&self.vpcs))
    }

    async fn get_vpc(&self, id: i64) -> Result<Vpc, ApiError> {
        lookup(&self.vpcs, "vpc", &id.to_string(), |v| v.id == id)
    }

    async fn create_vpc(&self, request: &CreateVpcRequest) -> Result<(), ApiError> {
        let id = self.next_id();
        self.record(format!("create vpc {}", request.name));
        self.vpcs.lock().unwrap().push(Vpc {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            dc_identifier: request.dc_identifier.clone(),
            network_range: format!("10.{}.0.0", id),
            network_size: 24,
            ..Default::default()
        });
        Ok(())
    }

    async fn delete_vpc(&self, id: i64) -> Result<(), ApiError> {
        remove(&self.vpcs, "vpc", &id.to_string(), |v| v.id == id)
    }
}
