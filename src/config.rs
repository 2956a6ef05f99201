//! Provider configuration.

use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_API_URL;
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// Environment variable holding the fallback access token.
pub const ACCESS_TOKEN_ENV: &str = "VPSIE_ACCESS_TOKEN";

/// Environment variable overriding the API endpoint.
pub const API_URL_ENV: &str = "VPSIE_API_URL";

/// The `provider "vpsie"` block as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API access token.
    pub access_token: Option<String>,
    /// API endpoint override.
    pub api_url: Option<String>,
}

/// Configuration after environment fallbacks have been applied.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Token sent in the `Vpsie-Auth` header.
    pub access_token: String,
    /// Base URL of the REST API.
    pub api_url: String,
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("access_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "access_token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!(
                        "VPSie API access token. Falls back to {} when unset.",
                        ACCESS_TOKEN_ENV
                    )),
            )
            .with_attribute(
                "api_url",
                Attribute::optional_string().with_description(format!(
                    "API endpoint, defaults to {}.",
                    DEFAULT_API_URL
                )),
            )
    }

    /// Decode the provider block. A null configuration is an empty one.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Apply fallbacks using `env` to look up variables.
    pub fn resolve_with<F>(self, env: F) -> Result<ResolvedConfig, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = non_empty(self.access_token)
            .or_else(|| non_empty(env(ACCESS_TOKEN_ENV)))
            .ok_or_else(|| {
                ProviderError::Configuration(format!(
                    "no access token configured; set access_token in the provider block or the {} environment variable",
                    ACCESS_TOKEN_ENV
                ))
            })?;

        let api_url = non_empty(self.api_url)
            .or_else(|| non_empty(env(API_URL_ENV)))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(ResolvedConfig {
            access_token,
            api_url,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
