//! Hugging Face HTTP client
//!
//! Endpoints:
//! - GET  {hub}/api/datasets/{repo}/tree/main?recursive=true
//! - POST {hub}/api/datasets/{repo}/commit/main (NDJSON, base64 file content)
//! - GET  {datasets_server}/rows?dataset=..&config=default&split=train

use crate::dataset::types::Example;
use crate::errors::{DatasetError, Result};
use crate::hub::{DatasetHub, FewShotSource};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Default Hub endpoint
pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";

/// Default dataset viewer endpoint
pub const DEFAULT_DATASETS_SERVER_URL: &str = "https://datasets-server.huggingface.co";

/// Request timeout (2 minutes, uploads can be large)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Hub client for listing, committing and reading dataset rows
#[derive(Debug, Clone)]
pub struct HubClient {
    client: Client,
    hub_url: String,
    datasets_server_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HubClient {
    /// Create client against the public Hub
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_endpoints(DEFAULT_HUB_URL, DEFAULT_DATASETS_SERVER_URL, token)
    }

    /// Create client with custom endpoints
    pub fn with_endpoints(hub_url: &str, datasets_server_url: &str, token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(REQUEST_TIMEOUT)?,
            hub_url: hub_url.trim_end_matches('/').to_string(),
            datasets_server_url: datasets_server_url.trim_end_matches('/').to_string(),
            token,
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Replace the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// Path of a config's data file inside the repository
    pub fn data_file_path(config_name: &str) -> String {
        format!("data/{}/train.json", config_name)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Timeouts keep their own variant; other transport errors become `Hub`
    fn send_error(&self, action: &str, err: reqwest::Error) -> DatasetError {
        if err.is_timeout() {
            DatasetError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            }
        } else {
            DatasetError::Hub(format!("Failed to {}: {}", action, err))
        }
    }

    async fn check(response: Response, action: &str) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(DatasetError::Hub(format!("{} failed: HTTP {}: {}", action, status, error_text)))
    }
}

#[async_trait]
impl DatasetHub for HubClient {
    async fn list_files(&self, repo_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/api/datasets/{}/tree/main", self.hub_url, repo_id);
        let response = self
            .authorize(self.client.get(&url).query(&[("recursive", "true")]))
            .send()
            .await
            .map_err(|e| self.send_error("list repository files", e))?;
        let response = Self::check(response, "Listing repository files").await?;

        let entries: Vec<TreeEntry> = response
            .json()
            .await
            .map_err(|e| DatasetError::Hub(format!("Failed to parse file listing: {}", e)))?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.kind == "file")
            .map(|entry| entry.path)
            .collect())
    }

    async fn push(&self, repo_id: &str, config_name: &str, examples: &[Example]) -> Result<()> {
        if self.token.is_none() {
            return Err(DatasetError::Hub(
                "a Hugging Face token is required to push (set HUGGINGFACE_TOKEN)".to_string(),
            ));
        }

        let content = serde_json::to_vec_pretty(examples)?;
        let path = Self::data_file_path(config_name);
        let summary = format!(
            "Upload {} examples as {} ({})",
            examples.len(),
            config_name,
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );

        let header = json!({"key": "header", "value": {"summary": summary, "description": ""}});
        let file = json!({
            "key": "file",
            "value": {"path": path, "encoding": "base64", "content": BASE64.encode(&content)}
        });
        let body = format!("{}\n{}\n", header, file);

        let url = format!("{}/api/datasets/{}/commit/main", self.hub_url, repo_id);
        debug!(url = %url, path = %path, bytes = content.len(), "Committing dataset file");

        let response = self
            .authorize(self.client.post(&url))
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(|e| self.send_error("push dataset", e))?;
        Self::check(response, "Pushing dataset").await?;

        info!(repo = repo_id, config = config_name, "Dataset committed");
        Ok(())
    }
}

#[async_trait]
impl FewShotSource for HubClient {
    async fn fetch_examples(&self, dataset: &str, count: usize) -> Result<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/rows", self.datasets_server_url);
        let length = count.to_string();
        let response = self
            .authorize(self.client.get(&url).query(&[
                ("dataset", dataset),
                ("config", "default"),
                ("split", "train"),
                ("offset", "0"),
                ("length", length.as_str()),
            ]))
            .send()
            .await
            .map_err(|e| self.send_error("fetch rows", e))?;
        let response = Self::check(response, "Fetching few-shot rows").await?;

        let page: RowsPage = response
            .json()
            .await
            .map_err(|e| DatasetError::Hub(format!("Failed to parse rows: {}", e)))?;

        page.rows
            .into_iter()
            .take(count)
            .map(|row| serde_json::to_string_pretty(&row.row).map_err(DatasetError::from))
            .collect()
    }
}

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(DatasetError::Http)
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    #[serde(rename = "type")]
    kind: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct RowsPage {
    #[serde(default)]
    rows: Vec<RowEntry>,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_file_path_puts_config_second() {
        let path = HubClient::data_file_path("v3");
        assert_eq!(path, "data/v3/train.json");
        assert_eq!(path.split('/').nth(1), Some("v3"));
    }

    #[test]
    fn test_endpoints_trimmed() {
        let client = HubClient::with_endpoints("http://hub/", "http://rows/", None).unwrap();
        assert_eq!(client.hub_url, "http://hub");
        assert_eq!(client.datasets_server_url, "http://rows");
    }

    #[tokio::test]
    async fn test_push_without_token_is_rejected() {
        let client = HubClient::new(None).unwrap();
        let err = client.push("user/repo", "v0", &[]).await.unwrap_err();
        assert!(matches!(err, DatasetError::Hub(_)));
    }
}
