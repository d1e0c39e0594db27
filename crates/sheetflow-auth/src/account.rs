//! Service-account credentials and signed assertions

use crate::error::AuthError;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims of the JWT-bearer assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Issuer (service-account email)
    pub iss: String,
    /// Requested scope
    pub scope: String,
    /// Audience (token endpoint)
    pub aud: String,
    /// Expiry, seconds since epoch
    pub exp: i64,
    /// Issued-at, seconds since epoch
    pub iat: i64,
}

/// Service-account email and PKCS8 private key
#[derive(Clone)]
pub struct ServiceAccount {
    client_email: String,
    private_key: String,
}

impl ServiceAccount {
    /// Create credentials, unescaping literal `\n` sequences in the key
    ///
    /// Keys copied into environment files usually arrive on one line with
    /// escaped newlines; PEM parsing needs the real ones back.
    ///
    /// # Errors
    /// `AuthError::Configuration` if either value is empty.
    pub fn new(
        client_email: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let client_email = client_email.into();
        let private_key = private_key.into();

        if client_email.trim().is_empty() {
            return Err(AuthError::configuration(
                "service-account client email is not set",
            ));
        }
        if private_key.trim().is_empty() {
            return Err(AuthError::configuration(
                "service-account private key is not set",
            ));
        }

        Ok(Self {
            client_email: client_email.trim().to_string(),
            private_key: private_key.replace("\\n", "\n"),
        })
    }

    /// Service-account email
    #[inline]
    #[must_use]
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Claims for an assertion issued at `issued_at`
    #[must_use]
    pub fn claims(
        &self,
        audience: &str,
        scope: &str,
        issued_at: i64,
        lifetime_secs: i64,
    ) -> AssertionClaims {
        AssertionClaims {
            iss: self.client_email.clone(),
            scope: scope.to_string(),
            aud: audience.to_string(),
            exp: issued_at + lifetime_secs,
            iat: issued_at,
        }
    }

    /// Sign claims with the account key (RS256)
    ///
    /// # Errors
    /// `AuthError::InvalidKey` if the key is not a usable RSA PEM.
    pub fn sign(&self, claims: &AssertionClaims) -> Result<String, AuthError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(|e| {
            AuthError::InvalidKey(format!("check the private key format: {e}"))
        })?;

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &key)
            .map_err(|e| AuthError::InvalidKey(e.to_string()))
    }
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_email() {
        let err = ServiceAccount::new("  ", "key").unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn rejects_missing_key() {
        let err = ServiceAccount::new("svc@example.com", "").unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn unescapes_newlines() {
        let account =
            ServiceAccount::new("svc@example.com", "-----BEGIN-----\\nabc\\n-----END-----")
                .unwrap();
        assert_eq!(account.private_key, "-----BEGIN-----\nabc\n-----END-----");
    }

    #[test]
    fn claims_expire_after_lifetime() {
        let account = ServiceAccount::new("svc@example.com", "k").unwrap();
        let claims = account.claims("https://aud", "scope", 1_000, 3600);

        assert_eq!(claims.iss, "svc@example.com");
        assert_eq!(claims.aud, "https://aud");
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 4_600);
    }

    #[test]
    fn debug_redacts_key() {
        let account = ServiceAccount::new("svc@example.com", "secret-material").unwrap();
        let rendered = format!("{account:?}");
        assert!(!rendered.contains("secret-material"));
    }

    #[test]
    fn garbage_key_fails_to_sign() {
        let account = ServiceAccount::new("svc@example.com", "not a pem").unwrap();
        let claims = account.claims("aud", "scope", 0, 60);
        assert!(matches!(account.sign(&claims), Err(AuthError::InvalidKey(_))));
    }
}
