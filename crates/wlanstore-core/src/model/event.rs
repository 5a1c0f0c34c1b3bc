// ── Profile change notifications ──

use std::sync::Arc;

use serde::Serialize;
use strum::Display;

use super::ids::UserId;
use super::profile::NetworkProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChangeReason {
    Added,
    ConfigChange,
    Removed,
}

/// Emitted on every add, update and remove. The profile is always a
/// masked copy.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileChange {
    pub reason: ChangeReason,
    pub profile: Arc<NetworkProfile>,
    /// Foreground user when the change happened.
    pub user: UserId,
}
