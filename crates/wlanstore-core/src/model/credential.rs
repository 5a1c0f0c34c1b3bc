// ── Sensitive profile values ──
//
// Pre-shared keys, WEP keys and enterprise passwords are held behind
// `SecretString` so they never leak through `Debug` or tracing fields.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel that replaces a credential on masked copies.
pub const MASK: &str = "*";

/// A credential value. Serializes in clear; callers mask before handing
/// profiles out.
pub struct Credential(SecretString);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// The masking sentinel as a credential.
    pub fn mask() -> Self {
        Self::new(MASK)
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    /// Whether this value is the masking sentinel rather than a real secret.
    pub fn is_mask(&self) -> bool {
        self.expose() == MASK
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Credential {}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mask() {
            f.write_str("Credential(*)")
        } else {
            f.write_str("Credential([REDACTED])")
        }
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Replace a non-empty credential with the sentinel.
pub(crate) fn mask_in_place(slot: &mut Option<Credential>) {
    if slot.as_ref().is_some_and(|c| !c.is_empty()) {
        *slot = Some(Credential::mask());
    }
}
