//! URL shortening, QR rendering, and page screenshots.

use crate::{
    client::ApiClient,
    error::{ApiError, Result},
};
use std::time::Duration;

const SHORTEN_ENDPOINT: &str = "is.gd";
const QR_ENDPOINT: &str = "qrserver";
const SCREENSHOT_ENDPOINT: &str = "s-shot";

impl ApiClient {
    /// Shorten a URL via is.gd. In simple format the body IS the short URL;
    /// problems come back as an "Error: ..." body, sometimes with HTTP 200.
    pub async fn shorten(&self, url: &str) -> Result<String> {
        let request_url = format!(
            "https://is.gd/create.php?format=simple&url={}",
            urlencoding::encode(url)
        );
        let resp = self
            .http()
            .get(&request_url)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                endpoint: SHORTEN_ENDPOINT,
                source: e,
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| ApiError::Transport {
            endpoint: SHORTEN_ENDPOINT,
            source: e,
        })?;

        if !status.is_success() || body.trim_start().starts_with("Error") {
            return Err(ApiError::Decode {
                endpoint: SHORTEN_ENDPOINT,
                detail: body.chars().take(120).collect(),
            });
        }
        Ok(body.trim().to_string())
    }

    /// Render `text` as a 500x500 QR code PNG.
    pub async fn qr_png(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!(
            "https://api.qrserver.com/v1/create-qr-code/?size=500x500&data={}",
            urlencoding::encode(text)
        );
        self.get_bytes(QR_ENDPOINT, &url, Duration::from_secs(15))
            .await
    }

    /// Render a screenshot of `url` as PNG (1280px wide, 100% zoom).
    /// Rendering happens remotely and is slow, so this call gets the longest
    /// timeout the client allows.
    pub async fn screenshot_png(&self, url: &str) -> Result<Vec<u8>> {
        let request_url = format!(
            "https://mini.s-shot.ru/1280x720/PNG/1280/Z100/?{}",
            urlencoding::encode(url)
        );
        self.get_bytes(SCREENSHOT_ENDPOINT, &request_url, Duration::from_secs(20))
            .await
    }
}
