//! Minimal JSON-RPC 2.0 client over HTTP

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    /// Error kind name, e.g. "queue_not_active"
    #[serde(default)]
    data: Option<serde_json::Value>,
}

pub async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0",
        method,
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        match error.data.as_ref().and_then(|d| d.as_str()) {
            Some(kind) => anyhow::bail!("{} ({}): {}", kind, error.code, error.message),
            None => anyhow::bail!("RPC error ({}): {}", error.code, error.message),
        }
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}
