//! HTTP implementation of [`MlService`]

use super::{MlError, MlService};
use axum::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("pickup-dash/", env!("CARGO_PKG_VERSION"));

/// ML service client over HTTP
pub struct HttpMlGateway {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpMlGateway {
    /// Create a client for the service at `base_url`
    ///
    /// `timeout` bounds each request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MlError> {
        Url::parse(base_url).map_err(|e| MlError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| MlError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, MlError> {
        let response = request
            .send()
            .await
            .map_err(|e| MlError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn send_json(&self, request: reqwest::RequestBuilder) -> Result<Value, MlError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| MlError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MlService for HttpMlGateway {
    async fn upload_training_data(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Value, MlError> {
        let size = contents.len();
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| MlError::Network(e.to_string()))?;
        let form = Form::new().part("file", part);

        debug!(file = %file_name, bytes = size, "Forwarding training data");
        let body = self
            .send_json(self.http_client.post(self.url("/upload")).multipart(form))
            .await?;

        info!(file = %file_name, "Training data forwarded to ML service");
        Ok(body)
    }

    async fn train(&self, k: i64) -> Result<Value, MlError> {
        debug!(k, "Requesting training");
        self.send_json(
            self.http_client
                .post(self.url("/train"))
                .form(&[("k", k.to_string())]),
        )
        .await
    }

    async fn request_assignment(&self, capacity: f64) -> Result<Value, MlError> {
        debug!(capacity, "Requesting truck assignment");
        self.send_json(
            self.http_client
                .post(self.url("/assign"))
                .form(&[("capacity", capacity.to_string())]),
        )
        .await
    }

    async fn fetch_assignments(&self) -> Result<String, MlError> {
        let text = self
            .send(self.http_client.get(self.url("/download/assignments")))
            .await?
            .text()
            .await
            .map_err(|e| MlError::Parse(e.to_string()))?;

        debug!(bytes = text.len(), "Fetched assignment document");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let gateway = HttpMlGateway::new("http://127.0.0.1:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(gateway.base_url(), "http://127.0.0.1:8000");
        assert_eq!(gateway.url("/train"), "http://127.0.0.1:8000/train");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = HttpMlGateway::new("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(MlError::InvalidUrl(_))));
    }
}
