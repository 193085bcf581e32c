//! An authenticated JSON-RPC client for the engine endpoint.

use crate::{
    EngineApi, EngineError, EngineResult, ForkchoiceUpdated, PayloadAttributes, PayloadStatus,
};
use alloy_rpc_types_engine::{Claims, ExecutionPayloadV1, ForkchoiceState, JwtSecret, PayloadId};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::trace;

/// A JSON-RPC request envelope.
#[derive(Debug, Serialize)]
struct Request<P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: P,
}

/// A JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Response<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

/// A JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// Speaks the engine protocol over HTTP with per-request token auth.
///
/// The node rejects tokens issued more than a minute ago, so every request
/// signs a fresh claim instead of caching one.
#[derive(Debug)]
pub struct EngineClient {
    endpoint: String,
    secret: JwtSecret,
    client: reqwest::Client,
    id: AtomicU64,
}

impl EngineClient {
    /// Creates a new client against `endpoint`, authenticating with
    /// `secret`.
    pub fn new(endpoint: String, secret: JwtSecret) -> Self {
        Self { endpoint, secret, client: reqwest::Client::new(), id: AtomicU64::new(0) }
    }

    /// Signs a token for a single request.
    fn bearer_token(&self) -> EngineResult<String> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or_default();
        Ok(self.secret.encode(&Claims { iat, exp: None })?)
    }

    /// Dispatches one JSON-RPC call and decodes its result.
    async fn call<P, T>(&self, method: &'static str, params: P) -> EngineResult<T>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        let body = {
            let request = Request {
                jsonrpc: "2.0",
                id: self.id.fetch_add(1, Ordering::Relaxed),
                method,
                params,
            };
            serde_json::to_vec(&request)?
        };
        let token = self.bearer_token()?;

        trace!(target: "engine", method, "Dispatching engine call");
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let bytes = response.error_for_status()?.bytes().await?;

        let parsed: Response<T> = serde_json::from_slice(&bytes)?;
        if let Some(error) = parsed.error {
            return Err(EngineError::Rpc { code: error.code, message: error.message });
        }
        parsed.result.ok_or(EngineError::MissingResult)
    }
}

#[async_trait]
impl EngineApi for EngineClient {
    async fn forkchoice_updated(
        &self,
        state: ForkchoiceState,
        attributes: Option<PayloadAttributes>,
    ) -> EngineResult<ForkchoiceUpdated> {
        self.call("engine_forkchoiceUpdatedV1", (state, attributes)).await
    }

    async fn get_payload(&self, payload_id: PayloadId) -> EngineResult<ExecutionPayloadV1> {
        self.call("engine_getPayloadV1", (payload_id,)).await
    }

    async fn new_payload(&self, payload: ExecutionPayloadV1) -> EngineResult<PayloadStatus> {
        self.call("engine_newPayloadV1", (payload,)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PayloadStatusCode;
    use serde_json::json;

    #[test]
    fn test_request_envelope_shape() {
        let state = ForkchoiceState {
            head_block_hash: Default::default(),
            safe_block_hash: Default::default(),
            finalized_block_hash: Default::default(),
        };
        let request = Request {
            jsonrpc: "2.0",
            id: 3,
            method: "engine_forkchoiceUpdatedV1",
            params: (state, None::<PayloadAttributes>),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], json!("2.0"));
        assert_eq!(value["id"], json!(3));
        assert_eq!(value["method"], json!("engine_forkchoiceUpdatedV1"));
        assert!(value["params"].is_array());
        assert_eq!(value["params"].as_array().unwrap().len(), 2);
        assert!(value["params"][1].is_null());
    }

    #[test]
    fn test_response_envelope_result() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"result":{"status":"VALID"}}"#;
        let parsed: Response<PayloadStatus> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.result.unwrap().status, PayloadStatusCode::Valid);
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_response_envelope_error() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-38001,"message":"Unknown payload"}}"#;
        let parsed: Response<PayloadStatus> = serde_json::from_str(raw).unwrap();
        assert!(parsed.result.is_none());
        let error = parsed.error.unwrap();
        assert_eq!(error.code, -38001);
        assert_eq!(error.message, "Unknown payload");
    }
}
