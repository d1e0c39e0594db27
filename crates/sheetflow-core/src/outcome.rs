//! Uniform `{success, error?}` result shape for callers

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Flat success flag plus optional message
///
/// Presentation code inspects the flag instead of handling errors; any
/// `Result` converts into one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the action completed
    pub success: bool,
    /// Human-readable failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    /// Successful outcome
    #[inline]
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed outcome with message
    #[inline]
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }

    /// Whether the action completed
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl<T, E: Display> From<Result<T, E>> for Outcome {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => {
                tracing::error!(error = %e, "action failed");
                Self::failure(e.to_string())
            }
        }
    }
}
