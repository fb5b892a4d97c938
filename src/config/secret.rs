//! Backend credentials held in memory
//!
//! `direct.secret` and `cloud.api_key` are read into a [`SecretString`]. The
//! value is zeroed on drop, `Debug` prints it redacted, and request code has to
//! call `expose_secret()` to read it.
//!
//! ```rust
//! use assetlift::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let api_key = secret_string("AIza-example".to_string());
//! assert_eq!(api_key.expose_secret().as_str(), "AIza-example");
//! assert!(!format!("{api_key:?}").contains("AIza"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use serde::Deserialize;
use zeroize::Zeroize;

/// Credential text; only ever handled inside a [`Secret`]
#[derive(Clone, Zeroize, Deserialize)]
#[zeroize(drop)]
#[serde(transparent)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl SecretValue {
    /// Empty or whitespace-only credentials count as unset
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Credential as stored in [`LiftConfig`](super::LiftConfig)
pub type SecretString = Secret<SecretValue>;

/// Wraps a value read from the environment or a test fixture
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue(value))
}
