//! Server backups.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{find_by, Ack, ApiError, VpsieClient};

/// A backup of a server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Backup {
    pub identifier: String,
    pub name: String,
    pub note: String,
    pub vm_identifier: String,
    pub backup_key: String,
    pub state: String,
    pub dc_identifier: String,
    pub box_id: i64,
    pub os_full_name: String,
    pub backup_sha1: String,
    pub is_deleted: i64,
    pub created_on: String,
    pub created_by: String,
}

/// Request body for creating a backup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupRequest {
    pub vm_identifier: String,
    pub name: String,
    pub note: String,
}

/// Backup endpoints.
#[async_trait]
pub trait BackupApi: Send + Sync {
    async fn list_backups(&self) -> Result<Vec<Backup>, ApiError>;
    async fn get_backup(&self, identifier: &str) -> Result<Backup, ApiError>;
    async fn create_backup(&self, request: &CreateBackupRequest) -> Result<(), ApiError>;
    async fn rename_backup(&self, identifier: &str, name: &str) -> Result<(), ApiError>;
    async fn delete_backup(&self, identifier: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl BackupApi for VpsieClient {
    async fn list_backups(&self) -> Result<Vec<Backup>, ApiError> {
        self.get("backups").await
    }

    async fn get_backup(&self, identifier: &str) -> Result<Backup, ApiError> {
        self.get(&format!("backups/{}", identifier)).await
    }

    async fn create_backup(&self, request: &CreateBackupRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("backups", request).await?;
        Ok(())
    }

    async fn rename_backup(&self, identifier: &str, name: &str) -> Result<(), ApiError> {
        let _: Ack = self
            .put(
                &format!("backups/{}/rename", identifier),
                &json!({ "name": name }),
            )
            .await?;
        Ok(())
    }

    async fn delete_backup(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("backups/{}", identifier)).await
    }
}

/// Find a backup by its exact name.
pub async fn get_backup_by_name(api: &dyn BackupApi, name: &str) -> Result<Backup, ApiError> {
    let backups = api.list_backups().await?;
    find_by(backups, "backup", name, |b| b.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockBackupApi {
        backups: Vec<Backup>,
    }

    #[async_trait]
    impl BackupApi for MockBackupApi {
        async fn list_backups(&self) -> Result<Vec<Backup>, ApiError> {
            Ok(self.backups.clone())
        }

        async fn get_backup(&self, identifier: &str) -> Result<Backup, ApiError> {
            find_by(self.backups.clone(), "backup", identifier, |b| {
                b.identifier == identifier
            })
        }

        async fn create_backup(&self, _request: &CreateBackupRequest) -> Result<(), ApiError> {
            Ok(())
        }

        async fn rename_backup(&self, _identifier: &str, _name: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete_backup(&self, _identifier: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn backup(identifier: &str, name: &str) -> Backup {
        Backup {
            identifier: identifier.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_get_backup_by_name() {
        let api = MockBackupApi {
            backups: vec![backup("b-1", "nightly"), backup("b-2", "weekly")],
        };

        let found = get_backup_by_name(&api, "weekly").await.unwrap();
        assert_eq!(found.identifier, "b-2");

        let err = get_backup_by_name(&api, "monthly").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_backup_by_name_empty_list() {
        let api = MockBackupApi { backups: vec![] };
        let err = get_backup_by_name(&api, "nightly").await.unwrap_err();
        assert_eq!(err.to_string(), "Not found: backup nightly not found");
    }

    #[test]
    fn test_backup_decodes_camel_case() {
        let backup: Backup = serde_json::from_value(serde_json::json!({
            "identifier": "b-1",
            "name": "nightly",
            "vmIdentifier": "vm-9",
            "createdOn": "2024-01-01 10:00:00",
            "unknownField": true
        }))
        .unwrap();
        assert_eq!(backup.vm_identifier, "vm-9");
        assert_eq!(backup.created_on, "2024-01-01 10:00:00");
        assert_eq!(backup.box_id, 0);
    }
}
