//! HTTP transport with a cached view of whether the API is reachable.
//!
//! Every CRUD helper first asks [`Backend::check_backend`]. The answer is
//! cached for [`ClientConfig::availability_ttl`], so a burst of calls costs a
//! single health request. When the cached answer is "unavailable" one fresh
//! probe is tried before giving up with [`ClientError::BackendNotAvailable`].

use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use reqwest::{Method, StatusCode, header::CONTENT_TYPE};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{config::ClientConfig, error::ClientError};

const HEALTH_PATH: &str = "/api/health";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Unknown,
    Available,
    Unavailable,
}

#[derive(Debug)]
struct ProbeState {
    availability: Availability,
    checked_at: Option<Instant>,
}

pub struct Backend {
    http: reqwest::Client,
    config: ClientConfig,
    probe: Mutex<ProbeState>,
    /// Held while a health request is in flight so concurrent checks share it.
    in_flight: tokio::sync::Mutex<()>,
}

impl Backend {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            http,
            config,
            probe: Mutex::new(ProbeState {
                availability: Availability::Unknown,
                checked_at: None,
            }),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn availability(&self) -> Availability {
        self.probe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .availability
    }

    /// Forgets the cached answer. The next check probes again.
    pub fn invalidate_backend_cache(&self) {
        self.set_availability(Availability::Unknown);
    }

    fn set_availability(&self, availability: Availability) {
        let mut probe = self.probe.lock().unwrap_or_else(PoisonError::into_inner);
        probe.availability = availability;
        probe.checked_at = match availability {
            Availability::Unknown => None,
            _ => Some(Instant::now()),
        };
    }

    fn cached(&self) -> Option<bool> {
        let probe = self.probe.lock().unwrap_or_else(PoisonError::into_inner);
        let fresh = probe
            .checked_at
            .is_some_and(|at| at.elapsed() < self.config.availability_ttl);
        match probe.availability {
            Availability::Unknown => None,
            _ if !fresh => None,
            availability => Some(availability == Availability::Available),
        }
    }

    pub async fn check_backend(&self, timeout: Duration) -> bool {
        if self.config.force_backend {
            return true;
        }
        if let Some(available) = self.cached() {
            return available;
        }

        let _guard = self.in_flight.lock().await;
        // Someone else may have finished a probe while we waited.
        if let Some(available) = self.cached() {
            return available;
        }

        let available = self.health(timeout).await;
        self.set_availability(if available {
            Availability::Available
        } else {
            Availability::Unavailable
        });
        available
    }

    /// One uncached health request. Only a success updates the cache.
    pub async fn probe_backend_once(&self, timeout: Duration) -> bool {
        let available = self.health(timeout).await;
        if available {
            self.set_availability(Availability::Available);
        }
        available
    }

    async fn health(&self, timeout: Duration) -> bool {
        let url = format!("{}{HEALTH_PATH}", self.config.base_url);
        match self.http.get(&url).timeout(timeout).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                log::warn!("Health check returned {}", response.status());
                false
            }
            Err(e) => {
                log::warn!("Health check failed: {e}");
                false
            }
        }
    }

    async fn ensure_available(&self) -> Result<(), ClientError> {
        if self.config.force_backend {
            return Ok(());
        }
        let timeout = self.config.health_timeout;
        if self.check_backend(timeout).await || self.probe_backend_once(timeout).await {
            Ok(())
        } else {
            Err(ClientError::BackendNotAvailable)
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<Vec<u8>>,
    ) -> Result<T, ClientError> {
        self.ensure_available().await?;

        let url = format!("{}{path}", self.config.base_url);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        if let Some(timeout) = self.config.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &text);
            log::warn!("{method} {path} failed: {message} ({status})");
            return Err(ClientError::Http { status, message });
        }

        let text = if text.trim().is_empty() { "null" } else { &text };
        Ok(serde_json::from_str(text)?)
    }

    pub async fn api_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(Method::GET, path, None, None).await
    }

    pub async fn api_get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        self.send(Method::GET, path, Some(query), None).await
    }

    pub async fn api_post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_vec(body)?;
        self.send(Method::POST, path, None, Some(body)).await
    }

    pub async fn api_put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_vec(body)?;
        self.send(Method::PUT, path, None, Some(body)).await
    }

    pub async fn api_delete(&self, path: &str) -> Result<Value, ClientError> {
        self.send(Method::DELETE, path, None, None).await
    }
}

/// The server's `error` (or `message`) field, else the raw body, else the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let field = ["error", "message"]
            .into_iter()
            .find_map(|key| json.get(key).and_then(Value::as_str));
        if let Some(message) = field {
            return message.to_string();
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}
