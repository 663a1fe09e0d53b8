//! The shared reqwest client and generic fetch helpers.

use crate::error::{ApiError, Result};
use botones_core::config::USER_AGENT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Default per-request deadline; individual calls may stretch it up to 20 s
/// (screenshot rendering is slow on the remote side).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// One client, connection-pooled, shared by every endpoint wrapper.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ApiError::Build)?;
        Ok(Self { http })
    }

    /// Wrap an existing client (shared with the attachment downloader).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Access to the underlying client for raw downloads.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// GET `url` and decode the JSON body into `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
    ) -> Result<T> {
        debug!(endpoint, "GET json");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport { endpoint, source: e })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        resp.json::<T>().await.map_err(|e| ApiError::Decode {
            endpoint,
            detail: e.to_string(),
        })
    }

    /// GET `url` and return the raw body, with a per-request timeout.
    pub(crate) async fn get_bytes(
        &self,
        endpoint: &'static str,
        url: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        debug!(endpoint, "GET bytes");
        let resp = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ApiError::Transport { endpoint, source: e })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Transport { endpoint, source: e })?;
        Ok(body.to_vec())
    }
}
