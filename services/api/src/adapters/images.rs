//! services/api/src/adapters/images.rs
//!
//! An adapter for the `ImageStorageService` port backed by an imgbb-compatible
//! upload API: a multipart POST with an `image` part and a `key` query parameter,
//! answered with `{ "data": { "url": "..." } }`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use storefront_core::ports::{ImageStorageService, PortError, PortResult};
use tracing::info;

#[derive(Clone)]
pub struct ImageHostAdapter {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
}

impl ImageHostAdapter {
    pub fn new(client: reqwest::Client, upload_url: String, api_key: String) -> Self {
        Self {
            client,
            upload_url,
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadedImage,
}

#[derive(Deserialize)]
struct UploadedImage {
    url: String,
}

#[async_trait]
impl ImageStorageService for ImageHostAdapter {
    async fn upload(&self, file_name: &str, data: &[u8]) -> PortResult<String> {
        let part = Part::bytes(data.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&self.upload_url)
            .query(&[("key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "Image host answered {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        info!(file_name, url = %body.data.url, "Image uploaded");
        Ok(body.data.url)
    }
}
