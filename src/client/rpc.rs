// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::time::Duration;
use url::Url;

/// Request timeout of the RPC client
const DEFAULT_REQ_TIMEOUT: Duration = Duration::from_secs(60);

/// A plain JSON-RPC 2.0 client over HTTP
#[derive(Clone)]
pub struct JsonRpcClient {
    http_client: reqwest::Client,
    url: Url,
    bearer_token: Option<String>,
}

impl JsonRpcClient {
    /// Creates a new client that sends requests to `url`
    pub fn new(url: Url, bearer_token: Option<&str>) -> Self {
        Self {
            http_client: reqwest::Client::default(),
            url,
            bearer_token: bearer_token.map(String::from),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send a JSON-RPC request and decode its `result`
    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        tracing::debug!("{} request: {}", method, request_body);

        let mut builder = self
            .http_client
            .post(self.url.as_str())
            .json(&request_body)
            .timeout(DEFAULT_REQ_TIMEOUT);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let response_body = response.text().await?;
        tracing::debug!("{} raw response: {}", method, response_body);

        decode_response(method, &response_body)
    }
}

/// Extract the typed `result` of a JSON-RPC response, turning an `error`
/// object into an error
pub fn decode_response<T: DeserializeOwned>(method: &str, body: &str) -> Result<T> {
    let value: Value = serde_json::from_str(body)?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let error_msg = error
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error");
        anyhow::bail!("{} RPC error: {}", method, error_msg);
    }
    match value.get("result") {
        Some(result) => Ok(serde_json::from_value(result.clone())?),
        None => anyhow::bail!("{} response has neither result nor error", method),
    }
}
