//! HTTP transport adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{
    ApiRequest, Endpoints, GAME_ID_HEADER, HttpFailure, PLAYER_ID_HEADER, TransportError,
};

/// Issues requests against the game server.
///
/// Implementations must fail with [`TransportError::Http`] for any non-2xx
/// status without decoding a success payload, and must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the decoded JSON body.
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl ReqwestTransport {
    /// Creates a transport for the given endpoints.
    ///
    /// `timeout` applies to every request including the long-poll, so it is
    /// usually left unset.
    #[instrument(skip(endpoints), fields(host = %endpoints.host()))]
    pub fn new(endpoints: Endpoints, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        info!("HTTP transport ready");
        Ok(Self { client, endpoints })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), endpoint = %request.endpoint()))]
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let url = self.endpoints.url(*request.endpoint());

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .header(ACCEPT, "*/*")
            .header(CONTENT_TYPE, "application/json; charset=utf-8");

        if let Some(ids) = request.ids() {
            builder = builder
                .header(GAME_ID_HEADER, ids.game_id())
                .header(PLAYER_ID_HEADER, ids.player_id());
        }

        if let Some(body) = request.body() {
            debug!(body = %body, "Request body");
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Request did not complete");
            TransportError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or_default().to_string();
            let body = response.text().await.unwrap_or_default();
            warn!(
                method = %request.method(),
                url = %url,
                status = status.as_u16(),
                status_text = %status_text,
                "Request failed"
            );
            return Err(HttpFailure::new(status.as_u16(), status_text, body).into());
        }

        let text = response.text().await?;
        debug!(status = status.as_u16(), body = %text, "Response received");
        parse_body(&text)
    }
}

/// Decodes a success body. An empty body is treated as `{}`.
pub fn parse_body(text: &str) -> Result<Value, TransportError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::from_str(text)?)
}
