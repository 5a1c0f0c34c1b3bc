// ── Filter predicates for profile snapshots ──

use crate::model::{NetworkProfile, quote_ssid};

/// Filter predicate over profiles.
pub enum ProfileFilter {
    All,
    Saved,
    Ephemeral,
    Passpoint,
    /// Selection is temporarily or permanently disabled.
    Disabled,
    Hidden,
    /// Plain or quoted SSID.
    Ssid(String),
    Custom(Box<dyn Fn(&NetworkProfile) -> bool + Send + Sync>),
}

impl ProfileFilter {
    pub fn matches(&self, profile: &NetworkProfile) -> bool {
        match self {
            Self::All => true,
            Self::Saved => profile.is_saved(),
            Self::Ephemeral => profile.ephemeral,
            Self::Passpoint => profile.passpoint,
            Self::Disabled => !profile.selection.is_enabled(),
            Self::Hidden => profile.hidden_ssid,
            Self::Ssid(ssid) => profile.ssid == quote_ssid(ssid),
            Self::Custom(f) => f(profile),
        }
    }
}
