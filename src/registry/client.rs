//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry logic (max 3 retries) on transport errors and HTTP 429
//! - Status mapping: 404 is `PackageNotFound`, other failures are transport errors

use crate::error::RegistryError;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("upgradeps/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// What a request is about, for error reporting
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub package: &'a str,
    pub registry: &'a str,
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                RegistryError::network_error(
                    "",
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the first backoff delay; it doubles after every failed attempt
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Perform a GET request with retry logic
    ///
    /// Transport errors and 429 responses are retried with exponential
    /// backoff. Other statuses are mapped without retrying.
    pub async fn get(
        &self,
        url: &str,
        accept: Option<&str>,
        ctx: RequestContext<'_>,
    ) -> Result<reqwest::Response, RegistryError> {
        let mut last_error = None;
        let mut delay = self.base_delay;

        for attempt in 0..=self.max_retries {
            let mut request = self.client.get(url);
            if let Some(accept) = accept {
                request = request.header(ACCEPT, accept);
            }

            match request.send().await {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    last_error = Some(RegistryError::RateLimitExceeded {
                        registry: ctx.registry.to_string(),
                    });
                }
                Ok(response) => return check_status(response, ctx),
                Err(e) if e.is_timeout() => {
                    last_error = Some(RegistryError::timeout(ctx.package, ctx.registry));
                }
                Err(e) => {
                    last_error = Some(RegistryError::network_error(
                        ctx.package,
                        ctx.registry,
                        e.to_string(),
                    ));
                }
            }

            if attempt < self.max_retries {
                tracing::debug!(package = ctx.package, attempt, ?delay, "retrying request");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            RegistryError::network_error(ctx.package, ctx.registry, "unknown error")
        }))
    }

    /// Perform a GET request and parse the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        accept: Option<&str>,
        ctx: RequestContext<'_>,
    ) -> Result<T, RegistryError> {
        let response = self.get(url, accept, ctx).await?;
        let body = response.bytes().await.map_err(|e| {
            RegistryError::network_error(ctx.package, ctx.registry, e.to_string())
        })?;
        serde_json::from_slice(&body).map_err(|e| {
            RegistryError::invalid_response(
                ctx.package,
                ctx.registry,
                format!("failed to parse JSON: {}", e),
            )
        })
    }
}

fn check_status(
    response: reqwest::Response,
    ctx: RequestContext<'_>,
) -> Result<reqwest::Response, RegistryError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(RegistryError::package_not_found(ctx.package, ctx.registry));
    }
    if !status.is_success() {
        return Err(RegistryError::network_error(
            ctx.package,
            ctx.registry,
            format!("HTTP {}", status),
        ));
    }
    Ok(response)
}
