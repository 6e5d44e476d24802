use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const UPLOAD_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ImageHostError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image host returned status {0}")]
    Api(u16),

    #[error("image host rejected the upload")]
    Rejected,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

/// Client for the external image host. The host key never leaves the server;
/// authors upload through `POST /images` and only ever see the hosted URL.
#[derive(Clone)]
pub struct ImageHostClient {
    client: Client,
    endpoint: String,
    key: String,
}

impl ImageHostClient {
    pub fn new(endpoint: String, key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(UPLOAD_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
            key,
        }
    }

    /// Uploads one image and returns its hosted URL.
    pub async fn upload(&self, filename: &str, bytes: Bytes) -> Result<String, ImageHostError> {
        let part = Part::bytes(bytes.to_vec()).file_name(filename.to_owned());
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", &self.key)])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageHostError::Api(status.as_u16()));
        }

        let parsed: UploadResponse = response.json().await?;
        match parsed {
            UploadResponse {
                success: true,
                data: Some(data),
            } => {
                debug!("image '{filename}' uploaded to {}", data.url);
                Ok(data.url)
            }
            _ => Err(ImageHostError::Rejected),
        }
    }
}
