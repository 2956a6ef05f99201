//! Custom images imported from a URL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{find_by, Ack, ApiError, VpsieClient};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Image {
    pub identifier: String,
    pub image_label: String,
    pub image_size: i64,
    pub original_name: String,
    pub dc_identifier: String,
    pub dc_name: String,
    pub created_on: String,
    pub deleted: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    pub dc_identifier: String,
    pub image_name: String,
    pub image_url: String,
}

#[async_trait]
pub trait ImageApi: Send + Sync {
    async fn list_images(&self) -> Result<Vec<Image>, ApiError>;
    async fn get_image(&self, identifier: &str) -> Result<Image, ApiError>;
    async fn create_image(&self, request: &CreateImageRequest) -> Result<(), ApiError>;
    async fn delete_image(&self, identifier: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ImageApi for VpsieClient {
    async fn list_images(&self) -> Result<Vec<Image>, ApiError> {
        self.get("images").await
    }

    async fn get_image(&self, identifier: &str) -> Result<Image, ApiError> {
        self.get(&format!("images/{}", identifier)).await
    }

    async fn create_image(&self, request: &CreateImageRequest) -> Result<(), ApiError> {
        let _: Ack = self.post("images", request).await?;
        Ok(())
    }

    async fn delete_image(&self, identifier: &str) -> Result<(), ApiError> {
        self.delete(&format!("images/{}", identifier)).await
    }
}

/// Find a live image by its label. Deleted images stay listed until purged
/// and are skipped.
pub async fn get_image_by_name(api: &dyn ImageApi, name: &str) -> Result<Image, ApiError> {
    let images = api.list_images().await?;
    find_by(images, "image", name, |i| i.deleted == 0 && i.image_label == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeVpsie;

    fn image(identifier: &str, label: &str, deleted: i64) -> Image {
        Image {
            identifier: identifier.to_string(),
            image_label: label.to_string(),
            deleted,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_get_image_by_name_skips_deleted_images() {
        let api = FakeVpsie::default();
        *api.images.lock().unwrap() = vec![
            image("img-old", "ubuntu", 1),
            image("img-new", "ubuntu", 0),
            image("img-2", "debian", 0),
        ];

        let found = get_image_by_name(&api, "ubuntu").await.unwrap();
        assert_eq!(found.identifier, "img-new");

        api.images.lock().unwrap().retain(|i| i.identifier != "img-new");
        let err = get_image_by_name(&api, "ubuntu").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
