// ── Network selection status ──
//
// Each profile carries a small state machine deciding whether network
// selection may pick it. Failures are counted per reason; a reason takes
// effect once its count reaches the configured threshold.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::config::SelectionPolicy;
use crate::model::ScanDetail;

/// Why a profile was disabled. Declaration order matters: every reason from
/// `AuthenticationNoCredentials` on is permanent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DisableReason {
    Enable,
    BadLink,
    AssociationRejection,
    AuthenticationFailure,
    DhcpFailure,
    DnsFailure,
    NoInternetTemporary,
    WpsStart,
    TlsVersionMismatch,
    AuthenticationNoCredentials,
    NoInternetPermanent,
    ByWifiManager,
    ByUserSwitch,
    ByWrongPassword,
    AuthenticationNoSubscription,
}

impl DisableReason {
    pub fn is_temporary(self) -> bool {
        self > Self::Enable && self < Self::AuthenticationNoCredentials
    }

    pub fn is_permanent(self) -> bool {
        self >= Self::AuthenticationNoCredentials
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    Enabled,
    TemporarilyDisabled,
    PermanentlyDisabled,
}

/// The externally observable result of recording a reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Counted, below threshold, nothing visible changed.
    Unchanged,
    Enabled,
    TemporarilyDisabled(DisableReason),
    PermanentlyDisabled(DisableReason),
}

/// Candidate chosen by the last network selection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub scan: ScanDetail,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionStatus {
    state: SelectionState,
    reason: Option<DisableReason>,
    /// Elapsed-time millis when the current disable took effect.
    disable_time_ms: Option<u64>,
    failure_counts: BTreeMap<DisableReason, u32>,

    pub has_ever_connected: bool,
    /// Config key of the profile the user preferred over this one.
    pub connect_choice: Option<String>,
    pub connect_choice_time_ms: Option<i64>,
    pub candidate: Option<Candidate>,
    pub seen_in_last_qualified_network_selection: bool,
    pub not_recommended: bool,
}

impl SelectionStatus {
    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn disable_reason(&self) -> Option<DisableReason> {
        self.reason
    }

    pub fn disable_time_ms(&self) -> Option<u64> {
        self.disable_time_ms
    }

    pub fn failure_count(&self, reason: DisableReason) -> u32 {
        self.failure_counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn is_enabled(&self) -> bool {
        self.state == SelectionState::Enabled
    }

    pub fn is_temporarily_disabled(&self) -> bool {
        self.state == SelectionState::TemporarilyDisabled
    }

    pub fn is_permanently_disabled(&self) -> bool {
        self.state == SelectionState::PermanentlyDisabled
    }

    /// Record a failure (or an explicit enable) observed at `now_ms`
    /// elapsed time.
    pub fn record(&mut self, reason: DisableReason, policy: &SelectionPolicy, now_ms: u64) -> Transition {
        if reason == DisableReason::Enable {
            self.enable();
            return Transition::Enabled;
        }

        let count = self.failure_counts.entry(reason).or_insert(0);
        *count = count.saturating_add(1);
        if *count < policy.get(reason).threshold {
            return Transition::Unchanged;
        }

        self.reason = Some(reason);
        self.disable_time_ms = Some(now_ms);
        if reason.is_temporary() {
            self.state = SelectionState::TemporarilyDisabled;
            Transition::TemporarilyDisabled(reason)
        } else {
            self.state = SelectionState::PermanentlyDisabled;
            Transition::PermanentlyDisabled(reason)
        }
    }

    /// Re-enable a temporarily disabled profile whose timeout has passed.
    /// Returns whether the profile was re-enabled.
    pub fn try_enable(&mut self, policy: &SelectionPolicy, now_ms: u64) -> bool {
        if self.state != SelectionState::TemporarilyDisabled {
            return false;
        }
        let (Some(reason), Some(since)) = (self.reason, self.disable_time_ms) else {
            return false;
        };
        let Some(timeout) = policy.get(reason).timeout_ms else {
            return false;
        };
        if now_ms >= since.saturating_add(timeout) {
            self.enable();
            return true;
        }
        false
    }

    fn enable(&mut self) {
        self.state = SelectionState::Enabled;
        self.reason = None;
        self.disable_time_ms = None;
        self.failure_counts.clear();
    }

    /// Forget accumulated failures without touching the current state.
    pub fn clear_failure_counts(&mut self) {
        self.failure_counts.clear();
    }

    pub fn set_connect_choice(&mut self, config_key: String, now_wall_ms: i64) {
        self.connect_choice = Some(config_key);
        self.connect_choice_time_ms = Some(now_wall_ms);
    }

    pub fn clear_connect_choice(&mut self) {
        self.connect_choice = None;
        self.connect_choice_time_ms = None;
    }
}
