//! Polling for entities whose creation completes asynchronously.
//!
//! Images, Kubernetes clusters, load balancers and servers are created by a
//! request that returns before the entity exists. Their handlers poll a
//! "list and match by name" lookup at a fixed interval until the entity shows
//! up or the create timeout expires.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::client::ApiError;
use crate::error::ProviderError;
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock};

/// Interval between two lookups.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Create timeout used when the configuration does not set one.
pub const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// The `timeouts` block accepted by polling resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// How long to wait for creation, e.g. `"20m"` or `"1h30m"`.
    pub create: Option<String>,
}

impl Timeouts {
    /// Schema of the block.
    pub fn block() -> NestedBlock {
        NestedBlock::single(
            Block::new()
                .with_attribute(
                    "create",
                    Attribute::optional_string()
                        .with_description("How long to wait for creation (default \"20m\")"),
                )
                .with_description("Operation timeouts"),
        )
    }

    /// The create timeout, falling back to [`DEFAULT_CREATE_TIMEOUT`].
    pub fn create_timeout(timeouts: Option<&Timeouts>) -> Result<Duration, ProviderError> {
        match timeouts.and_then(|t| t.create.as_deref()) {
            Some(raw) => parse_duration(raw).map_err(ProviderError::Validation),
            None => Ok(DEFAULT_CREATE_TIMEOUT),
        }
    }
}

/// Check the `timeouts` block of a configuration, if present.
pub fn validate_timeouts(config: &serde_json::Value) -> Vec<Diagnostic> {
    match config.pointer("/timeouts/create").and_then(|v| v.as_str()) {
        Some(raw) => match parse_duration(raw) {
            Ok(_) => vec![],
            Err(err) => vec![Diagnostic::error("Invalid timeout")
                .with_detail(err)
                .with_attribute("timeouts.create")],
        },
        None => vec![],
    }
}

/// Parse a duration such as `"45s"`, `"20m"`, `"1h30m"` or `"500ms"`.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let input = raw.trim();
    if input.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("missing unit in duration \"{}\"", raw))?;
        if digits == 0 {
            return Err(format!("invalid duration \"{}\"", raw));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| format!("invalid duration \"{}\"", raw))?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = match &rest[..unit_len] {
            "ms" => Duration::from_millis(1),
            "s" => Duration::from_secs(1),
            "m" => Duration::from_secs(60),
            "h" => Duration::from_secs(3600),
            other => return Err(format!("unknown unit \"{}\" in duration \"{}\"", other, raw)),
        };
        rest = &rest[unit_len..];

        let part = u32::try_from(value)
            .ok()
            .and_then(|v| unit.checked_mul(v))
            .ok_or_else(|| format!("duration \"{}\" is too large", raw))?;
        total = total
            .checked_add(part)
            .ok_or_else(|| format!("duration \"{}\" is too large", raw))?;
    }

    Ok(total)
}

/// Poll `lookup` every `interval` until it succeeds.
///
/// A not-found error means "not there yet" and keeps polling; any other error
/// aborts. Once `timeout` has elapsed the wait fails with
/// [`ProviderError::DeadlineExceeded`]. The deadline also cuts short a lookup
/// that is still in flight.
pub async fn wait_for<T, F, Fut>(
    what: &str,
    interval: Duration,
    timeout: Duration,
    mut lookup: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let deadline = Instant::now() + timeout;
    let expired = || {
        ProviderError::DeadlineExceeded(format!(
            "{} did not become available within {:?}",
            what, timeout
        ))
    };
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let Ok(outcome) = tokio::time::timeout_at(deadline, lookup()).await else {
            return Err(expired());
        };
        match outcome {
            Ok(found) => {
                debug!(what, attempt, "wait completed");
                return Ok(found);
            },
            Err(err) if err.is_not_found() => {
                if Instant::now() + interval > deadline {
                    return Err(expired());
                }
                debug!(what, attempt, "not available yet, polling again");
                tokio::time::sleep(interval).await;
            },
            Err(err) => {
                return Err(ProviderError::api(format!("Error waiting for {}", what), err));
            },
        }
    }
}
