//! Backend HTTP Client - Rate-limited REST API Client
//!
//! Wraps reqwest with a concurrency cap and a client-side rate limiter
//! for every call to the monitoring backend. A request is attempted
//! exactly once: the caller decides whether to surface or degrade.
//!
//! The backend answers errors with HTTP 200 and a `{code, message}`
//! envelope, so a successful status alone does not mean success.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::types::ErrorEnvelope;
use crate::errors::MonitorError;

/// Status code the backend puts in its envelope on success.
const ENVELOPE_SUCCESS_CODE: i64 = 200;

/// Configuration for the backend HTTP client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
  /// Base URL of the backend (without the `/api` suffix).
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum concurrent requests.
  pub max_concurrent: usize,
  /// Sustained request rate.
  pub requests_per_second: u32,
}

impl Default for ApiClientConfig {
  fn default() -> Self {
    Self {
      base_url: "http://127.0.0.1:8890".to_string(),
      timeout: Duration::from_secs(30),
      max_concurrent: 4,
      requests_per_second: 10,
    }
  }
}

/// Rate-limited HTTP client for the monitoring backend.
pub struct ApiClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: ApiClientConfig,
  /// Concurrency limiter.
  semaphore: Arc<Semaphore>,
  /// Smooths bursts (explorer pages fan out several reads at once).
  limiter: DefaultDirectRateLimiter,
}

impl ApiClient {
  /// Create a new backend client.
  pub fn new(config: ApiClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(config.max_concurrent)
      .build()
      .context("Failed to build HTTP client")?;

    let rate = NonZeroU32::new(config.requests_per_second)
      .context("requests_per_second must be positive")?;
    let limiter = RateLimiter::direct(Quota::per_second(rate));
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

    Ok(Self {
      http,
      config,
      semaphore,
      limiter,
    })
  }

  /// Full URL of a backend resource.
  fn url(&self, resource: &str) -> String {
    format!("{}/api/{}", self.config.base_url.trim_end_matches('/'), resource)
  }

  /// GET `resource` with query parameters and decode the body.
  pub async fn get<T: DeserializeOwned>(
    &self,
    resource: &'static str,
    query: &[(&str, String)],
  ) -> Result<T, MonitorError> {
    let request = self.http.get(self.url(resource)).query(query);
    let body = self.execute(resource, request).await?;
    decode(resource, body)
  }

  /// POST a JSON body to `resource` and decode the body.
  pub async fn post<B, T>(&self, resource: &'static str, body: &B) -> Result<T, MonitorError>
  where
    B: Serialize + ?Sized + Sync,
    T: DeserializeOwned,
  {
    let request = self.http.post(self.url(resource)).json(body);
    let body = self.execute(resource, request).await?;
    decode(resource, body)
  }

  /// Send once under the concurrency cap and rate limit, returning the
  /// JSON body after status and envelope checks.
  async fn execute(&self, resource: &'static str, request: RequestBuilder) -> Result<Value, MonitorError> {
    let _permit = self
      .semaphore
      .acquire()
      .await
      .map_err(|e| MonitorError::remote(resource, e))?;
    self.limiter.until_ready().await;

    debug!(resource, "Backend request");
    let response = request.send().await.map_err(|e| {
      warn!(resource, error = %e, "Backend request failed");
      MonitorError::remote(resource, e)
    })?;

    let status = response.status();
    if !status.is_success() {
      warn!(resource, status = %status, "Backend returned error status");
      return Err(MonitorError::remote(resource, format!("HTTP {status}")));
    }

    let body: Value = response
      .json()
      .await
      .map_err(|e| MonitorError::remote(resource, e))?;

    check_envelope(resource, &body)?;
    Ok(body)
  }
}

/// Reject `{code, message}` bodies whose code is not success.
pub(crate) fn check_envelope(resource: &'static str, body: &Value) -> Result<(), MonitorError> {
  let Some(code) = body.get("code").and_then(Value::as_i64) else {
    return Ok(());
  };
  if code == ENVELOPE_SUCCESS_CODE {
    return Ok(());
  }

  let envelope: ErrorEnvelope = serde_json::from_value(body.clone()).unwrap_or(ErrorEnvelope {
    code,
    message: String::new(),
  });
  warn!(resource, code, message = %envelope.message, "Backend returned error envelope");
  Err(MonitorError::remote(resource, envelope))
}

/// Decode a checked body into `T`.
pub(crate) fn decode<T: DeserializeOwned>(resource: &'static str, body: Value) -> Result<T, MonitorError> {
  serde_json::from_value(body).map_err(|e| MonitorError::remote(resource, format!("malformed response: {e}")))
}
