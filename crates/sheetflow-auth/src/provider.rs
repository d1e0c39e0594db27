//! Token sources
//!
//! `TokenProvider` performs the JWT-bearer exchange and keeps the result in a
//! lifecycle-scoped `moka` cache that expires ahead of the token itself.

use crate::account::ServiceAccount;
use crate::error::AuthError;
use crate::{DEFAULT_TOKEN_URL, JWT_BEARER_GRANT, SPREADSHEETS_SCOPE};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use moka::Expiry;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Bearer token with its validity window
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    issued_at: DateTime<Utc>,
    lifetime: Duration,
    cache_for: Duration,
}

impl AccessToken {
    /// Create token valid for `lifetime` from `issued_at`
    #[must_use]
    pub fn new(secret: impl Into<String>, issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            issued_at,
            lifetime,
            cache_for: lifetime,
        }
    }

    /// Shorten the cache lifetime by `margin` so a token is never served stale
    #[must_use]
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.cache_for = self.lifetime.saturating_sub(margin);
        self
    }

    /// Raw bearer value
    #[inline]
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Moment the token stops being accepted
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        let lifetime = chrono::Duration::from_std(self.lifetime).unwrap_or(chrono::Duration::MAX);
        self.issued_at
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the token is expired at `now`
    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Anything able to hand out bearer tokens
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current token, fetching a new one when needed
    async fn access_token(&self) -> Result<AccessToken, AuthError>;

    /// Drop any cached token
    async fn invalidate(&self) {}
}

#[async_trait]
impl<T: TokenSource + ?Sized> TokenSource for Arc<T> {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        (**self).access_token().await
    }

    async fn invalidate(&self) {
        (**self).invalidate().await;
    }
}

/// Fixed token, for tests and pre-issued credentials
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        Ok(AccessToken::new(
            self.0.clone(),
            Utc::now(),
            Duration::from_secs(3600),
        ))
    }
}

/// Token exchange settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token endpoint (assertion audience)
    pub token_url: String,
    /// Requested scope
    pub scope: String,
    /// Assertion lifetime
    pub assertion_lifetime: Duration,
    /// How long before expiry a cached token is discarded
    pub refresh_margin: Duration,
    /// HTTP request timeout
    pub timeout: Duration,
}

impl AuthConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With token endpoint
    #[inline]
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// With refresh margin
    #[inline]
    #[must_use]
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// With HTTP timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            scope: SPREADSHEETS_SCOPE.to_string(),
            assertion_lifetime: Duration::from_secs(3600),
            refresh_margin: Duration::from_secs(60),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

struct TokenExpiry;

impl Expiry<String, AccessToken> for TokenExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &AccessToken,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.cache_for)
    }
}

/// Service-account token provider with an expiring cache
pub struct TokenProvider {
    account: ServiceAccount,
    config: AuthConfig,
    client: reqwest::Client,
    cache: Cache<String, AccessToken>,
}

impl TokenProvider {
    /// Create provider for a service account
    #[must_use]
    pub fn new(account: ServiceAccount, config: AuthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(account, config, client)
    }

    /// Create provider sharing an existing HTTP client
    #[must_use]
    pub fn with_client(account: ServiceAccount, config: AuthConfig, client: reqwest::Client) -> Self {
        Self {
            account,
            config,
            client,
            cache: Cache::builder()
                .max_capacity(4)
                .expire_after(TokenExpiry)
                .build(),
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Perform the assertion exchange, bypassing the cache
    ///
    /// # Errors
    /// `InvalidKey` if signing fails, `Http` if the endpoint is unreachable,
    /// `TokenExchange` if the response carries no access token.
    pub async fn fetch(&self) -> Result<AccessToken, AuthError> {
        let issued_at = Utc::now();
        let lifetime = i64::try_from(self.config.assertion_lifetime.as_secs()).unwrap_or(3600);
        let claims = self.account.claims(
            &self.config.token_url,
            &self.config.scope,
            issued_at.timestamp(),
            lifetime,
        );
        let assertion = self.account.sign(&claims)?;

        tracing::debug!(
            issuer = %self.account.client_email(),
            endpoint = %self.config.token_url,
            "exchanging service-account assertion"
        );

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: Option<TokenResponse> = serde_json::from_str(&body).ok();
        let Some(TokenResponse {
            access_token: Some(secret),
            expires_in,
        }) = parsed.filter(|_| status.is_success())
        else {
            tracing::error!(%status, "token endpoint returned no access token");
            return Err(AuthError::TokenExchange(format!("{status}: {body}")));
        };

        let lifetime = expires_in.map_or(self.config.assertion_lifetime, Duration::from_secs);
        Ok(AccessToken::new(secret, issued_at, lifetime)
            .with_refresh_margin(self.config.refresh_margin))
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("account", &self.account)
            .field("config", &self.config)
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl TokenSource for TokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let token = self.cached().await?;
        if !token.is_expired_at(Utc::now()) {
            return Ok(token);
        }
        tracing::warn!(expired_at = %token.expires_at(), "cached token already expired");
        self.invalidate().await;
        self.cached().await
    }

    async fn invalidate(&self) {
        self.cache.invalidate(&self.config.scope).await;
    }
}

impl TokenProvider {
    async fn cached(&self) -> Result<AccessToken, AuthError> {
        self.cache
            .try_get_with(self.config.scope.clone(), self.fetch())
            .await
            .map_err(|e| (*e).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_expiry_window() {
        let issued = DateTime::<Utc>::from_timestamp(1_000, 0).unwrap();
        let token = AccessToken::new("t", issued, Duration::from_secs(3600));

        assert_eq!(token.expires_at().timestamp(), 4_600);
        assert!(!token.is_expired_at(issued));
        assert!(token.is_expired_at(DateTime::<Utc>::from_timestamp(4_600, 0).unwrap()));
    }

    #[test]
    fn refresh_margin_never_underflows() {
        let token = AccessToken::new("t", Utc::now(), Duration::from_secs(30))
            .with_refresh_margin(Duration::from_secs(60));
        assert_eq!(token.cache_for, Duration::ZERO);
    }

    #[test]
    fn debug_hides_secret() {
        let token = AccessToken::new("ya29.secret", Utc::now(), Duration::from_secs(1));
        assert!(!format!("{token:?}").contains("ya29"));
    }

    #[tokio::test]
    async fn static_token_hands_out_value() {
        let source = StaticToken("fixed".to_string());
        assert_eq!(source.access_token().await.unwrap().secret(), "fixed");
    }

    #[test]
    fn default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.scope, SPREADSHEETS_SCOPE);
        assert_eq!(config.assertion_lifetime, Duration::from_secs(3600));
    }
}
