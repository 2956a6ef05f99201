//! `vpsie_image`: a custom image imported from a URL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::image::CreateImageRequest;
use crate::client::{get_image_by_name, Image, ImageApi, VpsieClient};
use crate::error::ProviderError;
use crate::resource::{
    api_err, decode, delete_result, encode, read_result, require_identifier, ApiSlot, Resource,
};
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::wait::{self, wait_for, Timeouts};

const KIND: &str = "image";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ImageModel {
    identifier: String,
    dc_identifier: String,
    image_name: String,
    image_url: String,
    image_size: i64,
    original_name: String,
    dc_name: String,
    created_on: String,
    timeouts: Option<Timeouts>,
}

impl ImageModel {
    fn apply(&mut self, image: &Image) {
        self.identifier = image.identifier.clone();
        self.dc_identifier = image.dc_identifier.clone();
        self.image_name = image.image_label.clone();
        self.image_size = image.image_size;
        self.original_name = image.original_name.clone();
        self.dc_name = image.dc_name.clone();
        self.created_on = image.created_on.clone();
    }
}

/// Handler for `vpsie_image`.
pub struct ImageResource {
    api: ApiSlot<dyn ImageApi>,
    poll_interval: Duration,
}

impl ImageResource {
    /// Create an unconfigured handler.
    pub fn new() -> Self {
        Self {
            api: ApiSlot::empty(),
            poll_interval: wait::POLL_INTERVAL,
        }
    }

    /// Create a handler bound to `api`.
    pub fn with_api(api: Arc<dyn ImageApi>) -> Self {
        Self {
            api: ApiSlot::with(api),
            poll_interval: wait::POLL_INTERVAL,
        }
    }

    /// Override the interval between creation lookups.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for ImageResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resource for ImageResource {
    fn type_name(&self) -> &'static str {
        "vpsie_image"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("A custom image downloaded by the platform")
            .with_attribute("identifier", Attribute::computed_string())
            .with_attribute("dc_identifier", Attribute::required_string().with_force_new())
            .with_attribute(
                "image_name",
                Attribute::required_string()
                    .with_description("Label of the image; must be unique")
                    .with_force_new(),
            )
            .with_attribute(
                "image_url",
                Attribute::required_string()
                    .with_description("URL the image is downloaded from")
                    .with_force_new(),
            )
            .with_attribute("image_size", Attribute::computed_int64())
            .with_attribute("original_name", Attribute::computed_string())
            .with_attribute("dc_name", Attribute::computed_string())
            .with_attribute("created_on", Attribute::computed_string())
            .with_block("timeouts", Timeouts::block())
    }

    fn configure(&self, client: Arc<VpsieClient>) {
        self.api.set(client);
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        wait::validate_timeouts(config)
    }

    async fn create(&self, planned: Value) -> Result<Value, ProviderError> {
        let mut model: ImageModel = decode(planned)?;
        let api = self.api.get()?;
        let timeout = Timeouts::create_timeout(model.timeouts.as_ref())?;

        let request = CreateImageRequest {
            dc_identifier: model.dc_identifier.clone(),
            image_name: model.image_name.clone(),
            image_url: model.image_url.clone(),
        };
        api.create_image(&request)
            .await
            .map_err(api_err("Error creating image"))?;

        let what = format!("image {}", model.image_name);
        let image = wait_for(&what, self.poll_interval, timeout, || {
            get_image_by_name(api.as_ref(), &model.image_name)
        })
        .await?;
        info!(identifier = %image.identifier, "image created");

        model.apply(&image);
        encode(&model)
    }

    async fn read(&self, state: Value) -> Result<Option<Value>, ProviderError> {
        let mut model: ImageModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        let Some(image) = read_result(KIND, id, api.get_image(id).await)? else {
            return Ok(None);
        };

        model.apply(&image);
        Ok(Some(encode(&model)?))
    }

    async fn delete(&self, state: Value) -> Result<(), ProviderError> {
        let model: ImageModel = decode(state)?;
        let api = self.api.get()?;

        let id = require_identifier(KIND, &model.identifier)?;
        delete_result(KIND, id, api.delete_image(id).await)
    }
}
