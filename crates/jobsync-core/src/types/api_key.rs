//! API key credential type.

use std::fmt;

use crate::error::{Error, InvalidInputError};

/// Static API-key credential sent with every request.
///
/// The key is never exposed in Debug output so it cannot leak through
/// `tracing` fields or panics.
///
/// # Example
///
/// ```
/// use jobsync_core::ApiKey;
///
/// let key = ApiKey::new("jobboerse-jobsuche").unwrap();
/// assert_eq!(format!("{:?}", key), "ApiKey([REDACTED])");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or cannot be sent as an HTTP
    /// header value.
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();

        if key.trim().is_empty() {
            return Err(InvalidInputError::ApiKey {
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if key.chars().any(|c| !c.is_ascii() || c.is_ascii_control()) {
            return Err(InvalidInputError::ApiKey {
                reason: "must be printable ASCII".to_string(),
            }
            .into());
        }

        Ok(Self(key))
    }

    /// Returns the key.
    ///
    /// Use this only when building request headers. Never log this value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&format_args!("[REDACTED]")).finish()
    }
}
