use std::time::Duration;

use log::{debug, error};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::utils::DashboardError;

/// JSON transport to the platform backend.
#[rocket::async_trait]
pub trait RemoteApi: Send + Sync {
    /// GETs `url`. Any non-2xx status or transport failure is a network error.
    async fn get_json(&self, url: Url) -> Result<Value, DashboardError>;

    async fn post_json(&self, url: Url, body: Value) -> Result<Value, DashboardError>;
}

pub struct HttpApi {
    client: Client,
}

impl HttpApi {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpApi { client })
    }

    async fn decode(response: reqwest::Response, url: &Url) -> Result<Value, DashboardError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DashboardError::network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| body_message(&body))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            error!("{} returned {}: {}", url, status, message);
            return Err(DashboardError::Network(message));
        }

        serde_json::from_str(&text)
            .map_err(|e| DashboardError::application(format!("Invalid JSON response: {}", e)))
    }
}

#[rocket::async_trait]
impl RemoteApi for HttpApi {
    async fn get_json(&self, url: Url) -> Result<Value, DashboardError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("GET {} failed: {}", url, e);
                DashboardError::network(e.to_string())
            })?;

        Self::decode(response, &url).await
    }

    async fn post_json(&self, url: Url, body: Value) -> Result<Value, DashboardError> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("POST {} failed: {}", url, e);
                DashboardError::network(e.to_string())
            })?;

        Self::decode(response, &url).await
    }
}

/// `message`, falling back to `error`, when the body carries either.
pub fn body_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Rejects bodies whose `success` flag is not `true`.
pub fn ensure_success(body: Value, fallback: &str) -> Result<Value, DashboardError> {
    if body.get("success").and_then(Value::as_bool) == Some(true) {
        Ok(body)
    } else {
        Err(DashboardError::Application(
            body_message(&body).unwrap_or_else(|| fallback.to_string()),
        ))
    }
}

/// Decodes `body[key]`; a missing or null field yields the default.
pub fn field<T: DeserializeOwned + Default>(body: &Value, key: &str) -> Result<T, DashboardError> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            DashboardError::application(format!("Unexpected `{}` payload: {}", key, e))
        }),
    }
}
