//! VPSie Provider
//!
//! An infrastructure provider plugin for the VPSie cloud platform. The host
//! engine starts the binary, reads the handshake line from stdout and then
//! drives resources and data sources over gRPC.
//!
//! # Overview
//!
//! - **Resources**: 18 `vpsie_*` managed resources (servers, storage, VPCs,
//!   Kubernetes clusters, load balancers, DNS records, ...), see [`resources`]
//! - **Data sources**: 17 list queries with optional equality filters, see
//!   [`data_sources`]
//! - **Client**: a typed REST client for the platform API, see [`client`]
//! - **Protocol**: the generated gRPC types and the [`server`] wrapping them
//!
//! # Handshake Protocol
//!
//! Once listening, the provider prints one line to stdout:
//!
//! ```text
//! HEMMER_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `HEMMER_PROVIDER|<protocol_version>|<address>`. All logging goes
//! to stderr.
//!
//! # Configuration
//!
//! The provider block takes an `access_token`. When it is empty the
//! `VPSIE_ACCESS_TOKEN` environment variable is used instead.
//!
//! # Embedding
//!
//! ```ignore
//! use vpsie_provider::{init_logging, serve, VpsieProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!     serve(VpsieProvider::new()).await
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

#[allow(missing_docs)]
pub mod client;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod resources;
pub mod schema;
pub mod server;
pub mod testing;
pub mod types;
pub mod validation;
pub mod wait;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default};
pub use provider::VpsieProvider;
pub use schema::ProviderSchema;
pub use server::{serve, serve_with_options, ProviderService, ServeOptions};
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, HANDSHAKE_PREFIX,
    PROTOCOL_VERSION,
};
pub use validation::{validate, validate_result};
