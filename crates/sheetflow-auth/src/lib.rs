//! SheetFlow Auth
//!
//! Exchanges a Google service-account key for short-lived bearer tokens
//! using the OAuth2 JWT-bearer grant.
//!
//! # Flow
//!
//! ```text
//! ServiceAccount ──sign──▶ assertion (RS256 JWT) ──POST──▶ token endpoint
//!                                                              │
//!                       TokenProvider cache ◀── AccessToken ◀──┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetflow_auth::{AuthConfig, ServiceAccount, TokenProvider, TokenSource};
//!
//! # async fn example() -> Result<(), sheetflow_auth::AuthError> {
//! let account = ServiceAccount::new("svc@project.iam.gserviceaccount.com", key_pem)?;
//! let provider = TokenProvider::new(account, AuthConfig::default());
//!
//! let token = provider.access_token().await?;
//! println!("bearer {}", token.secret());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod account;
pub mod error;
pub mod provider;

pub use account::{AssertionClaims, ServiceAccount};
pub use error::AuthError;
pub use provider::{AccessToken, AuthConfig, StaticToken, TokenProvider, TokenSource};

/// OAuth2 token endpoint used by service accounts
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Read/write scope for spreadsheets
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Grant type for the assertion exchange
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
