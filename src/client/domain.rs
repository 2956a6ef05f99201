//! DNS domains and their records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Domain {
    pub identifier: String,
    pub domain_name: String,
    pub project_identifier: String,
    pub nameserver_status: String,
    pub last_check: String,
    pub created_on: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DnsRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDomainRequest {
    pub domain_name: String,
    pub project_identifier: String,
}

/// Body for creating or updating a DNS record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecordRequest {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: i64,
}

#[async_trait]
pub trait DomainApi: Send + Sync {
    async fn list_domains(&self) -> Result<Vec<Domain>, ApiError>;
    async fn create_domain(&self, request: &CreateDomainRequest) -> Result<(), ApiError>;
    async fn delete_domain(&self, identifier: &str) -> Result<(), ApiError>;
    async fn list_dns_records(&self, domain_identifier: &str) -> Result<Vec<DnsRecord>, ApiError>;
    async fn create_dns_record(
        &self,
        domain_identifier: &str,
        request: &DnsRecordRequest,
    ) -> Result<DnsRecord, ApiError>;
    async fn update_dns_record(
        &self,
        domain_identifier: &str,
        record_id: i64,
        request: &DnsRecordRequest,
    ) -> Result<(), ApiError>;
    async fn delete_dns_record(&self, domain_identifier: &str, record_id: i64)
        -> Result<(), ApiError>;
}

#[async_trait]
impl DomainApi for VpsieClient {
    async fn list_domains(&self) -> Result<Vec<Domain>, ApiError> {
        self.get("domains").await
    }

    async fn create_domain(&self, request: &CreateDomainRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("domains", request).await?;
        Ok(())
    }

    async fn delete_domain(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("domains/{}", identifier)).await
    }

    async fn list_dns_records(&self, domain_identifier: &str) -> Result<Vec<DnsRecord>, ApiError> {
        self.get(&format!("domains/{}/records", domain_identifier))
            .await
    }

    async fn create_dns_record(
        &self,
        domain_identifier: &str,
        request: &DnsRecordRequest,
    ) -> Result<DnsRecord, ApiError> {
        self.post(&format!("domains/{}/records", domain_identifier), request)
            .await
    }

    async fn update_dns_record(
        &self,
        domain_identifier: &str,
        record_id: i64,
        request: &DnsRecordRequest,
    ) -> Result<(), ApiError> {
        let _: Ack = self
            .put(
                &format!("domains/{}/records/{}", domain_identifier, record_id),
                request,
            )
            .await?;
        Ok(())
    }

    async fn delete_dns_record(
        &self,
        domain_identifier: &str,
        record_id: i64,
    ) -> Result<(), ApiError> {
        self.delete(&format!(
            "domains/{}/records/{}",
            domain_identifier, record_id
        ))
        .await
    }
}

/// Find a domain by its exact name.
pub async fn get_domain_by_name(api: &dyn DomainApi, name: &str) -> Result<Domain, ApiError> {
    let domains = api.list_domains().await?;
    find_by(domains, "domain", name, |d| d.domain_name == name)
}

/// Find a DNS record of a domain by id.
pub async fn get_dns_record(
    api: &dyn DomainApi,
    domain_identifier: &str,
    record_id: i64,
) -> Result<DnsRecord, ApiError> {
    let records = api.list_dns_records(domain_identifier).await?;
    find_by(records, "dns record", &record_id.to_string(), |r| {
        r.id == record_id
    })
}
