//! Environment-adaptive request bridge.
//!
//! Every call is an HTTP POST of a JSON body to `https://<resource>/<event>`.
//! In a standalone browser a caller-supplied fallback short-circuits the
//! network entirely; on any failure the fallback is used instead of an error.

use crate::config::Config;
use crate::constants;
use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::environment::Environment;
use crate::events::NuiEvent;
use crate::platform;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    HTTP.get_or_init(|| {
        #[cfg(not(target_arch = "wasm32"))]
        {
            reqwest::Client::builder()
                .pool_max_idle_per_host(4)
                .tcp_nodelay(true)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new())
        }

        #[cfg(target_arch = "wasm32")]
        {
            reqwest::Client::new()
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid event name '{0}'")]
    InvalidEvent(String),
    #[error("payload is not serializable: {0}")]
    InvalidPayload(String),
    #[error("host unreachable: {0}")]
    NetworkUnavailable(String),
    #[error("host returned {status}: {body}")]
    HostError { status: u16, body: String },
    #[error("no response within {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("host rejected request: {0}")]
    Rejected(String),
    #[error("request cancelled")]
    Cancelled,
}

impl BridgeError {
    /// Short stable name, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::InvalidEvent(_) => "invalid-event",
            BridgeError::InvalidPayload(_) => "invalid-payload",
            BridgeError::NetworkUnavailable(_) => "network",
            BridgeError::HostError { .. } => "host",
            BridgeError::Timeout(_) => "timeout",
            BridgeError::MalformedResponse(_) => "malformed",
            BridgeError::Rejected(_) => "rejected",
            BridgeError::Cancelled => "cancelled",
        }
    }

    /// Failures a fallback value may stand in for.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BridgeError::NetworkUnavailable(_)
                | BridgeError::HostError { .. }
                | BridgeError::Timeout(_)
                | BridgeError::MalformedResponse(_)
                | BridgeError::Rejected(_)
        )
    }

    fn from_reqwest(e: reqwest::Error, limit: Option<Duration>) -> Self {
        if e.is_timeout() {
            BridgeError::Timeout(limit.unwrap_or_default())
        } else if e.is_decode() {
            BridgeError::MalformedResponse(e.to_string())
        } else {
            BridgeError::NetworkUnavailable(e.to_string())
        }
    }
}

/// Per-call options.
#[derive(Clone, Debug)]
pub struct FetchOptions<T> {
    /// Value resolved in standalone mode and on recoverable failures
    pub fallback: Option<T>,
    /// Overrides the bridge's default timeout
    pub timeout: Option<Duration>,
    /// Aborts the in-flight request when cancelled
    pub cancel: Option<CancellationToken>,
}

impl<T> Default for FetchOptions<T> {
    fn default() -> Self {
        FetchOptions {
            fallback: None,
            timeout: None,
            cancel: None,
        }
    }
}

impl<T> FetchOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fallback(mut self, value: T) -> Self {
        self.fallback = Some(value);
        self
    }

    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

fn validate_event(event: &str) -> Result<(), BridgeError> {
    if event.is_empty() || event.contains('/') || event.chars().any(char::is_whitespace) {
        Err(BridgeError::InvalidEvent(event.to_string()))
    } else {
        Ok(())
    }
}

fn truncate_body(mut body: String) -> String {
    let limit = constants::bridge::ERROR_BODY_LIMIT;
    if body.len() > limit {
        let mut cut = limit;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

#[derive(Clone, Debug)]
pub struct NuiBridge {
    base_url: String,
    environment: Environment,
    default_timeout: Option<Duration>,
    client: reqwest::Client,
}

impl NuiBridge {
    /// Bridge for `resource`, posting to `https://<resource>/<event>`.
    pub fn new(resource: &str, environment: Environment) -> Self {
        NuiBridge {
            base_url: format!("https://{resource}"),
            environment,
            default_timeout: Some(Duration::from_millis(
                constants::bridge::DEFAULT_TIMEOUT_MS,
            )),
            client: http_client().clone(),
        }
    }

    pub fn from_config(cfg: &Config, environment: Environment) -> Self {
        let bridge = NuiBridge::new(&cfg.resource, environment)
            .with_default_timeout(cfg.request_timeout);
        match &cfg.base_url {
            Some(base) => bridge.with_base_url(base.as_str()),
            None => bridge,
        }
    }

    /// Point the bridge somewhere other than `https://<resource>` (dev host).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        self.base_url = base.trim_end_matches('/').to_string();
        self
    }

    /// `None` lets calls without an explicit timeout wait indefinitely.
    pub fn with_default_timeout(mut self, limit: Option<Duration>) -> Self {
        self.default_timeout = limit;
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, event: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(event))
    }

    /// Post `event` and decode the response body as `T`.
    pub async fn fetch_nui<T, P>(
        &self,
        event: &str,
        payload: Option<&P>,
        opts: FetchOptions<T>,
    ) -> Result<T, BridgeError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        validate_event(event)?;
        let FetchOptions {
            fallback,
            timeout,
            cancel,
        } = opts;
        let fallback = match fallback {
            Some(fb) if !self.environment.is_embedded() => {
                log::debug!("[nui][bridge] {event}: standalone mode, using fallback");
                return Ok(fb);
            }
            other => other,
        };

        let payload = to_payload(payload)?;
        let outcome = self
            .exchange::<T>(event, payload, timeout, cancel.as_ref())
            .await;
        settle(event, outcome, fallback)
    }

    /// Call a typed endpoint. The response must be a `{ success, data }`
    /// envelope; `success: false` becomes [`BridgeError::Rejected`].
    pub async fn call<E: NuiEvent>(
        &self,
        payload: &E::Payload,
        opts: FetchOptions<E::Response>,
    ) -> Result<E::Response, BridgeError> {
        validate_event(E::NAME)?;
        let FetchOptions {
            fallback,
            timeout,
            cancel,
        } = opts;
        let fallback = match fallback {
            Some(fb) if !self.environment.is_embedded() => {
                log::debug!("[nui][bridge] {}: standalone mode, using fallback", E::NAME);
                return Ok(fb);
            }
            other => other,
        };

        let payload = to_payload(Some(payload))?;
        let outcome = self
            .exchange::<ResponseEnvelope<Value>>(E::NAME, payload, timeout, cancel.as_ref())
            .await
            .and_then(decode_envelope::<E>);
        settle(E::NAME, outcome, fallback)
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        event: &str,
        payload: Option<Value>,
        timeout: Option<Duration>,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, BridgeError> {
        let envelope = RequestEnvelope::new(event, payload);
        let bytes = self.dispatch(&envelope, timeout, cancel).await?;
        serde_json::from_slice(&bytes).map_err(|e| BridgeError::MalformedResponse(e.to_string()))
    }

    async fn dispatch(
        &self,
        envelope: &RequestEnvelope,
        timeout: Option<Duration>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<u8>, BridgeError> {
        let url = self.endpoint(&envelope.event_name);
        let body = envelope.body();
        let limit = timeout.or(self.default_timeout);

        log::debug!("[nui][bridge] POST {url}");
        let request = async {
            let res = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| BridgeError::from_reqwest(e, limit))?;

            let status = res.status();
            if !status.is_success() {
                let text = res.text().await.unwrap_or_default();
                return Err(BridgeError::HostError {
                    status: status.as_u16(),
                    body: truncate_body(text),
                });
            }

            let bytes = res
                .bytes()
                .await
                .map_err(|e| BridgeError::from_reqwest(e, limit))?;
            Ok(bytes.to_vec())
        };

        let bounded = async {
            match limit {
                Some(limit) => platform::timeout(limit, request)
                    .await
                    .unwrap_or_else(|_| Err(BridgeError::Timeout(limit))),
                None => request.await,
            }
        };

        match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(BridgeError::Cancelled),
                    out = bounded => out,
                }
            }
            None => bounded.await,
        }
    }
}

fn to_payload<P: Serialize + ?Sized>(payload: Option<&P>) -> Result<Option<Value>, BridgeError> {
    payload
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| BridgeError::InvalidPayload(e.to_string()))
}

fn decode_envelope<E: NuiEvent>(
    envelope: ResponseEnvelope<Value>,
) -> Result<E::Response, BridgeError> {
    let data = envelope
        .into_payload(E::DATA_KEY)
        .map_err(BridgeError::Rejected)?;
    serde_json::from_value(data.unwrap_or(Value::Null))
        .map_err(|e| BridgeError::MalformedResponse(format!("{}: {e}", E::NAME)))
}

/// Resolve a finished call: fallback on recoverable failures, error otherwise.
fn settle<T>(
    event: &str,
    outcome: Result<T, BridgeError>,
    fallback: Option<T>,
) -> Result<T, BridgeError> {
    match (outcome, fallback) {
        (Ok(v), _) => Ok(v),
        (Err(e), Some(fb)) if e.is_recoverable() => {
            log::warn!("[nui][bridge] {event} failed ({}): {e}; using fallback", e.kind());
            Ok(fb)
        }
        (Err(e), _) => {
            if matches!(e, BridgeError::Cancelled) {
                log::debug!("[nui][bridge] {event} cancelled");
            } else {
                log::error!("[nui][bridge] {event} failed ({}): {e}", e.kind());
            }
            Err(e)
        }
    }
}
