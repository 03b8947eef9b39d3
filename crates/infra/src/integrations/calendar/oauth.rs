//! Access tokens for the Google Calendar API
//!
//! Two providers:
//! - [`ServiceAccountTokenProvider`] signs an RS256 JWT assertion with the
//!   service-account key, exchanges it at the key's token endpoint and caches
//!   the access token until shortly before it expires.
//! - [`StaticTokenProvider`] hands out a pre-issued token.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rendezvous_domain::constants::{GOOGLE_CALENDAR_SCOPE, GOOGLE_TOKEN_URI};
use rendezvous_domain::{RendezvousError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::types::TokenResponse;
use crate::errors::InfraError;
use crate::http::HttpClient;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion (Google caps it at one hour).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before the backend would reject them.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for calendar requests.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Always returns the same token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// The fields of a Google service-account JSON key used for token exchange.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Read a key file downloaded from the Google Cloud console.
    ///
    /// # Errors
    /// Returns `RendezvousError::Config` if the file is missing or is not a
    /// service-account key.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RendezvousError::Config(format!(
                "Service account file not readable: {}: {e}",
                path.display()
            ))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            RendezvousError::Config(format!(
                "Invalid service account file {}: {e}",
                path.display()
            ))
        })
    }
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

struct CachedToken {
    token: String,
    refresh_after: Instant,
}

/// Service-account (two-legged) OAuth flow with an in-memory token cache.
pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http: HttpClient,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    /// # Errors
    /// Returns `RendezvousError::Config` if the private key is not a valid
    /// RSA PEM.
    pub fn new(key: ServiceAccountKey, http: HttpClient) -> Result<Self> {
        let encoding_key =
            EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(InfraError::from)?;

        Ok(Self {
            key,
            encoding_key,
            http,
            scope: GOOGLE_CALENDAR_SCOPE.to_string(),
            cached: Mutex::new(None),
        })
    }

    pub fn from_file(path: impl Into<PathBuf>, http: HttpClient) -> Result<Self> {
        Self::new(ServiceAccountKey::from_file(&path.into())?, http)
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn signed_assertion(&self) -> Result<String> {
        let iat = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.key.private_key_id);

        encode(&header, &claims, &self.encoding_key).map_err(|e| InfraError::from(e).into())
    }

    async fn exchange(&self) -> Result<CachedToken> {
        let assertion = self.signed_assertion()?;
        let request = self
            .http
            .request(Method::POST, &self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())]);

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message =
                format!("token exchange rejected (HTTP {}): {}", status.as_u16(), body.trim());
            // invalid_grant / unauthorized_client come back as 400 or 401
            return Err(if status.is_client_error() {
                RendezvousError::PermissionDenied(message)
            } else {
                RendezvousError::Transient(message)
            });
        }

        let token: TokenResponse = response.json().await.map_err(InfraError::from)?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        info!(
            client_email = %self.key.client_email,
            expires_in = token.expires_in,
            "Obtained calendar access token"
        );

        Ok(CachedToken { token: token.access_token, refresh_after: Instant::now() + lifetime })
    }
}

impl std::fmt::Debug for ServiceAccountTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokenProvider")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String> {
        // Held across the exchange so concurrent callers share one refresh.
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_after {
                return Ok(token.token.clone());
            }
            debug!("Cached calendar access token expired, refreshing");
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
