//! Natural key type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// The source-issued stable identifier of a posting.
///
/// Keys are trimmed on construction, so two keys that differ only in
/// surrounding whitespace compare equal. This is what makes dedup lookups
/// whitespace-insensitive.
///
/// # Example
///
/// ```
/// use jobsync_core::NaturalKey;
///
/// let key = NaturalKey::new("  10000-1199999999-S \n").unwrap();
/// assert_eq!(key.as_str(), "10000-1199999999-S");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NaturalKey(String);

impl NaturalKey {
    /// Create a key from a string, trimming incidental whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is left after trimming.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let trimmed = s.as_ref().trim();

        if trimmed.is_empty() {
            return Err(InvalidInputError::NaturalKey {
                value: s.as_ref().to_string(),
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NaturalKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NaturalKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<NaturalKey> for String {
    fn from(key: NaturalKey) -> Self {
        key.0
    }
}

impl AsRef<str> for NaturalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
