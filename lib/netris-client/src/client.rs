//! Session-authenticated HTTP client for the Netris controller

use crate::api::{extract_id, NetrisApi};
use crate::{ClientError, Endpoint, Result};
use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Connection settings for the Netris controller
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL, e.g. https://netris.example.com
    pub host: String,
    pub login: String,
    pub password: String,
    /// Skip TLS certificate verification
    pub insecure: bool,
    pub timeout: Duration,
}

/// Response envelope used by every Netris endpoint
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "isSuccess", default)]
    is_success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

/// NetrisClient talks to the Netris controller over its REST API.
///
/// Authentication is cookie based: the first request logs in, and a 401
/// answer triggers one re-login before the request is retried.
pub struct NetrisClient {
    http: reqwest::Client,
    base_url: String,
    login: String,
    password: String,
    authenticated: Mutex<bool>,
}

impl NetrisClient {
    /// Create a new client; no request is sent until the first call
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config.host.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(config.host));
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            login: config.login,
            password: config.password,
            authenticated: Mutex::new(false),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Open a session with the configured credentials
    pub async fn authenticate(&self) -> Result<()> {
        let mut authenticated = self.authenticated.lock().await;
        let response = self
            .http
            .post(self.url("/api/auth"))
            .json(&json!({
                "user": self.login,
                "password": self.password,
                "auth_scheme_id": 1,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            *authenticated = false;
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Unauthorized(format!("{}: {}", status, body)));
        }

        *authenticated = true;
        info!("Authenticated against Netris controller {}", self.base_url);
        Ok(())
    }

    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        if !*self.authenticated.lock().await {
            self.authenticate().await?;
        }

        debug!("{} {}", method, path);
        let mut response = self.request(method.clone(), path, body).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Netris session expired, logging in again");
            *self.authenticated.lock().await = false;
            self.authenticate().await?;
            response = self.request(method, path, body).await?;
        }

        let status = response.status().as_u16();
        let text = response.text().await?;
        decode_envelope(status, &text)
    }
}

/// Unwrap the `{isSuccess, message, data}` envelope of a response body.
pub(crate) fn decode_envelope(status: u16, body: &str) -> Result<Value> {
    let envelope = serde_json::from_str::<ApiResponse>(body);

    if !(200..300).contains(&status) {
        let message = match envelope {
            Ok(envelope) if !envelope.message.is_empty() => envelope.message,
            _ => body.to_string(),
        };
        return Err(ClientError::Api { status, message });
    }

    let envelope = envelope?;
    if !envelope.is_success {
        return Err(ClientError::Api {
            status,
            message: envelope.message,
        });
    }
    Ok(envelope.data)
}

#[async_trait]
impl NetrisApi for NetrisClient {
    async fn list(&self, endpoint: Endpoint) -> Result<Vec<Value>> {
        match self.send(Method::GET, endpoint.path(), None).await? {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(ClientError::UnexpectedPayload(format!(
                "{} returned {}",
                endpoint, other
            ))),
        }
    }

    async fn create(&self, endpoint: Endpoint, payload: &Value) -> Result<i64> {
        let data = self.send(Method::POST, endpoint.path(), Some(payload)).await?;
        extract_id(&data)
    }

    async fn update(&self, endpoint: Endpoint, id: i64, payload: &Value) -> Result<()> {
        self.send(Method::PUT, &endpoint.item_path(id), Some(payload))
            .await?;
        Ok(())
    }

    async fn delete(&self, endpoint: Endpoint, id: i64) -> Result<()> {
        self.send(Method::DELETE, &endpoint.item_path(id), None)
            .await?;
        Ok(())
    }
}
