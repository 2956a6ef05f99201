//! `vpsie_images`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Collection;
use crate::client::{ApiError, Image, ImageApi, VpsieClient};
use crate::schema::AttributeType;

/// Custom images uploaded to the account.
pub struct Images;

#[async_trait]
impl Collection for Images {
    type Api = dyn ImageApi;
    type Item = Image;

    const TYPE_NAME: &'static str = "vpsie_images";
    const ATTRIBUTE: &'static str = "images";
    const DESCRIPTION: &'static str = "Custom images";
    const FILTERS: &'static [&'static str] = &["dc_identifier"];

    fn fields(&self) -> Vec<(&'static str, AttributeType)> {
        vec![
            ("identifier", AttributeType::String),
            ("image_label", AttributeType::String),
            ("image_size", AttributeType::Int64),
            ("original_name", AttributeType::String),
            ("dc_identifier", AttributeType::String),
            ("dc_name", AttributeType::String),
            ("created_on", AttributeType::String),
        ]
    }

    fn bind(&self, client: Arc<VpsieClient>) -> Arc<Self::Api> {
        client
    }

    async fn list(&self, api: &Self::Api) -> Result<Vec<Image>, ApiError> {
        // Deleted images stay listed until purged.
        let images = api.list_images().await?;
        Ok(images.into_iter().filter(|i| i.deleted == 0).collect())
    }

    fn element(&self, image: &Image) -> Value {
        json!({
            "identifier": image.identifier,
            "image_label": image.image_label,
            "image_size": image.image_size,
            "original_name": image.original_name,
            "dc_identifier": image.dc_identifier,
            "dc_name": image.dc_name,
            "created_on": image.created_on,
        })
    }
}
