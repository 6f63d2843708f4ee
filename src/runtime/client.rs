//! Cookie-authenticated HTTP client with CSRF token refresh

use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::runtime::request::form_pairs;
use crate::runtime::{ClientError, Payload, Request, Result};

/// Called when the service rejects the session credential (HTTP 401)
pub type ExpiryCallback = Arc<dyn Fn() + Send + Sync>;

/// Settings shared by every generated binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Name of the session cookie that carries the credential
    pub cookie_name: String,
    /// Header used to send and receive the CSRF token
    pub csrf_header: String,
    /// Endpoint that hands out a fresh CSRF token when POSTed to
    pub refresh_url: String,
    /// Endpoint returning `{id, name}` for the authenticated user
    pub identity_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: ".ROBLOSECURITY".to_string(),
            csrf_header: "x-csrf-token".to_string(),
            refresh_url: "https://auth.roblox.com/v2/logout".to_string(),
            identity_url: "https://users.roblox.com/v1/users/authenticated".to_string(),
        }
    }
}

/// The authenticated user, as reported by the identity endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub name: String,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct SessionCredential(String);

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential([REDACTED])")
    }
}

enum Attempt {
    Completed(Option<Value>),
    RefreshRequired,
}

/// HTTP client used by all generated bindings.
///
/// Every request carries the session cookie and, once known, the CSRF token.
/// Successful responses are reduced to their JSON payload.
pub struct AuthenticatedClient {
    http: reqwest::Client,
    config: AuthConfig,
    credential: SessionCredential,
    csrf_token: RwLock<Option<String>>,
    on_expired: Option<ExpiryCallback>,
}

impl fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("config", &self.config)
            .field("credential", &self.credential)
            .field("has_csrf_token", &self.csrf_token().is_some())
            .finish()
    }
}

impl AuthenticatedClient {
    pub fn new(
        config: AuthConfig,
        credential: impl Into<String>,
        on_expired: Option<ExpiryCallback>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            http,
            config,
            credential: SessionCredential(credential.into()),
            csrf_token: RwLock::new(None),
            on_expired,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// CSRF token currently attached to outgoing requests
    pub fn csrf_token(&self) -> Option<String> {
        self.csrf_token
            .read()
            .map(|token| token.clone())
            .unwrap_or_default()
    }

    /// Send a request, refreshing the CSRF token and replaying once on a 403.
    ///
    /// Returns `Ok(None)` for empty bodies and for the token-refresh leg.
    pub async fn send(&self, request: Request) -> Result<Option<Value>> {
        match self.attempt(&request, true).await? {
            Attempt::Completed(payload) => Ok(payload),
            Attempt::RefreshRequired => {
                debug!(url = %request.url, "CSRF token rejected, refreshing");
                self.refresh().await?;
                match self.attempt(&request, false).await? {
                    Attempt::Completed(payload) => Ok(payload),
                    Attempt::RefreshRequired => {
                        Err(ClientError::from_status(StatusCode::FORBIDDEN, None))
                    }
                }
            }
        }
    }

    /// Look up the authenticated user
    pub async fn identity(&self) -> Result<Option<Identity>> {
        let payload = self
            .send(Request::get(self.config.identity_url.clone()))
            .await?;
        Ok(payload.map(serde_json::from_value).transpose()?)
    }

    /// Identity lookup that treats an expired credential as "no identity".
    ///
    /// The expiry callback has already fired by the time a 401 surfaces here.
    /// Any other failure is returned to the caller.
    pub async fn resolve_identity(&self) -> Result<Option<Identity>> {
        match self.identity().await {
            Err(err) if err.is_unauthorized() => {
                warn!(error = %err, "Identity lookup rejected the session credential");
                Ok(None)
            }
            other => other,
        }
    }

    async fn refresh(&self) -> Result<()> {
        let request = Request::post(self.config.refresh_url.clone());
        // The refresh endpoint never asks for another refresh.
        self.attempt(&request, false).await.map(|_| ())
    }

    async fn attempt(&self, request: &Request, allow_refresh: bool) -> Result<Attempt> {
        let response = self.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(Attempt::Completed(read_payload(response).await?));
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                if let Some(callback) = &self.on_expired {
                    callback();
                }
                Err(ClientError::from_status(status, None))
            }
            StatusCode::FORBIDDEN if self.is_refresh_endpoint(&request.url) => {
                let token = response
                    .headers()
                    .get(self.config.csrf_header.as_str())
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned);
                match token {
                    Some(token) => {
                        debug!(header = %self.config.csrf_header, "Stored refreshed CSRF token");
                        self.store_token(token);
                        Ok(Attempt::Completed(None))
                    }
                    None => Err(ClientError::Configuration(format!(
                        "Token refresh endpoint {} answered 403 without a '{}' header",
                        self.config.refresh_url, self.config.csrf_header
                    ))),
                }
            }
            StatusCode::FORBIDDEN if allow_refresh => Ok(Attempt::RefreshRequired),
            _ => Err(status_error(response).await),
        }
    }

    async fn execute(&self, request: &Request) -> Result<Response> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            ClientError::Configuration(format!("Invalid HTTP method '{}'", request.method))
        })?;

        let mut builder = self.http.request(method, &request.url).header(
            COOKIE,
            format!("{}={}", self.config.cookie_name, self.credential.0),
        );
        if let Some(token) = self.csrf_token() {
            builder = builder.header(self.config.csrf_header.as_str(), token);
        }
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.payload {
            Some(Payload::Json(value)) => builder.json(value),
            Some(Payload::Form(value)) => builder.form(&form_pairs(value)),
            None => builder,
        };

        Ok(builder.send().await?)
    }

    fn store_token(&self, token: String) {
        if let Ok(mut slot) = self.csrf_token.write() {
            *slot = Some(token);
        }
    }

    fn is_refresh_endpoint(&self, url: &str) -> bool {
        url.trim_end_matches('/') == self.config.refresh_url.trim_end_matches('/')
    }
}

async fn read_payload(response: Response) -> Result<Option<Value>> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(
        serde_json::from_str(&body).unwrap_or(Value::String(body)),
    ))
}

async fn status_error(response: Response) -> ClientError {
    let status = response.status();
    let detail = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<Value>(&body).ok())
        .and_then(|body| {
            body.get("errors")?
                .get(0)?
                .get("message")?
                .as_str()
                .map(str::to_owned)
        });
    ClientError::from_status(status, detail.as_deref())
}
