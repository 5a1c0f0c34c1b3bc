// ── Identifier types ──
//
// Network ids are process-local, caller uids carry their user partition,
// and MAC addresses are normalized on construction so equality is textual.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ── NetworkId ───────────────────────────────────────────────────────

/// Process-local profile identifier, assigned on first add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(i32);

impl NetworkId {
    /// Sentinel returned where no profile is referenced.
    pub const INVALID: Self = Self(-1);

    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NetworkId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .map(Self)
            .map_err(|e| CoreError::invalid("network_id", e.to_string()))
    }
}

// ── UserId / Uid ────────────────────────────────────────────────────

/// A device user. Each user owns one private store partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u32);

impl UserId {
    /// The user that is in the foreground at boot.
    pub const SYSTEM: Self = Self(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller identity. The user partition is encoded in the high range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(u32);

impl Uid {
    /// Uids per user partition.
    pub const PER_USER_RANGE: u32 = 100_000;
    /// The platform system identity; always privileged.
    pub const SYSTEM: Self = Self(1000);
    /// Marks "no caller".
    pub const INVALID: Self = Self(u32::MAX);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Compose a uid from a user and an app id within that user.
    pub const fn from_parts(user: UserId, app_id: u32) -> Self {
        Self(user.0 * Self::PER_USER_RANGE + app_id % Self::PER_USER_RANGE)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn user_id(self) -> UserId {
        UserId(self.0 / Self::PER_USER_RANGE)
    }

    pub const fn app_id(self) -> u32 {
        self.0 % Self::PER_USER_RANGE
    }
}

impl Default for Uid {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    const PLACEHOLDER: &'static str = "02:00:00:00:00:00";

    /// Create a normalized MAC address from any common format.
    /// Accepts colon-separated, dash-separated, or bare hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let lowered = raw.as_ref().trim().to_lowercase().replace('-', ":");
        if lowered.len() == 12 && !lowered.contains(':') {
            let pairs: Vec<&str> = (0..6).filter_map(|i| lowered.get(i * 2..i * 2 + 2)).collect();
            return Self(pairs.join(":"));
        }
        Self(lowered)
    }

    /// Parse and validate six hex octets.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let mac = Self::new(raw);
        if mac.octets().is_none() {
            return Err(CoreError::invalid("mac_address", format!("not a MAC: {mac}")));
        }
        Ok(mac)
    }

    pub fn from_octets(octets: [u8; 6]) -> Self {
        let parts: Vec<String> = octets.iter().map(|b| format!("{b:02x}")).collect();
        Self(parts.join(":"))
    }

    /// The "unset" value reported in place of a hidden or missing address.
    pub fn placeholder() -> Self {
        Self(Self::PLACEHOLDER.to_owned())
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == Self::PLACEHOLDER
    }

    pub fn octets(&self) -> Option<[u8; 6]> {
        let mut out = [0u8; 6];
        let mut parts = self.0.split(':');
        for slot in &mut out {
            let part = parts.next()?;
            if part.len() != 2 {
                return None;
            }
            *slot = u8::from_str_radix(part, 16).ok()?;
        }
        parts.next().is_none().then_some(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MacAddress {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
