// ── External collaborators ──
//
// Everything the repository consults but does not own: time, storage,
// permissions, the credential key store, SIM identity, the last-resort
// watchdog, and lifecycle listeners. All calls are synchronous and must
// not block; implementations hand slow work off elsewhere.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{MacAddress, NetworkId, NetworkProfile, Uid, UserId};
use crate::selection::DisableReason;

// ── Clock ───────────────────────────────────────────────────────────

pub trait Clock: Send + Sync {
    /// Monotonic milliseconds since an arbitrary fixed point (boot).
    fn elapsed_millis(&self) -> u64;
    /// Milliseconds since the Unix epoch.
    fn wall_clock_millis(&self) -> i64;
}

/// Real clock: monotonic time from process start, wall time from the OS.
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn wall_clock_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

// ── Persistence ─────────────────────────────────────────────────────

/// Everything the shared and current-user partitions hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreData {
    pub shared: Vec<NetworkProfile>,
    pub user: Vec<NetworkProfile>,
    /// Quoted SSID -> wall-clock millis of the deletion.
    pub deleted_ephemeral_ssids: BTreeMap<String, i64>,
    /// Config key -> persistent randomized MAC.
    pub randomized_macs: BTreeMap<String, MacAddress>,
}

/// What a per-user partition holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStoreData {
    pub profiles: Vec<NetworkProfile>,
    pub deleted_ephemeral_ssids: BTreeMap<String, i64>,
}

/// Durable storage for profiles. Format and atomicity are the gateway's
/// business.
pub trait PersistenceGateway: Send + Sync {
    fn are_stores_present(&self) -> bool;

    /// First read after construction. Missing stores yield empty data.
    fn read(&mut self) -> Result<StoreData, CoreError>;

    /// Persist both partitions. `buffered` only affects batching.
    fn write(&mut self, data: StoreData, buffered: bool) -> Result<(), CoreError>;

    /// Point the user partition at `user` without reading it.
    fn set_user_stores(&mut self, user: UserId);

    fn switch_user_stores_and_read(&mut self, user: UserId) -> Result<UserStoreData, CoreError>;
}

// ── Permissions ─────────────────────────────────────────────────────

/// Which administrative identity `is_profile_or_device_owner` asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerPolicy {
    /// Only the device owner.
    DeviceOwner,
    /// A profile owner or the device owner.
    ProfileOwner,
}

pub trait PermissionOracle: Send + Sync {
    fn check_network_settings_permission(&self, uid: Uid) -> bool;
    fn check_network_setup_wizard_permission(&self, uid: Uid) -> bool;
    fn is_profile_or_device_owner(&self, uid: Uid, policy: OwnerPolicy) -> bool;

    fn is_system_ui(&self, _uid: Uid) -> bool {
        false
    }

    fn is_user_unlocked(&self, _user: UserId) -> bool {
        true
    }

    /// Whether profiles created by the device owner are locked against
    /// everyone else.
    fn device_owner_configs_lockdown(&self) -> bool {
        false
    }
}

// ── Credentials ─────────────────────────────────────────────────────

/// Installs enterprise certificates and keys for a profile.
pub trait KeyStore: Send + Sync {
    fn update_network_keys(
        &mut self,
        profile: &NetworkProfile,
        existing: Option<&NetworkProfile>,
    ) -> Result<(), CoreError>;
}

/// A key store with nothing to install.
#[derive(Debug, Default)]
pub struct NoopKeyStore;

impl KeyStore for NoopKeyStore {
    fn update_network_keys(
        &mut self,
        _profile: &NetworkProfile,
        _existing: Option<&NetworkProfile>,
    ) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Derives an EAP identity from the SIM for PEAP-wrapped SIM profiles.
pub trait SimIdentityProvider: Send + Sync {
    fn sim_identity(&self, profile: &NetworkProfile) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct NoSimIdentity;

impl SimIdentityProvider for NoSimIdentity {
    fn sim_identity(&self, _profile: &NetworkProfile) -> Option<String> {
        None
    }
}

// ── Watchdog ────────────────────────────────────────────────────────

pub trait LastResortWatchdog: Send + Sync {
    /// When true, the current association-rejection report is not counted.
    fn should_ignore_ssid_update(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct NeverIgnore;

impl LastResortWatchdog for NeverIgnore {
    fn should_ignore_ssid_update(&self) -> bool {
        false
    }
}

// ── MAC generation ──────────────────────────────────────────────────

/// Produces a persistent randomized MAC for a profile identity.
pub trait MacGenerator: Send + Sync {
    fn generate(&self, config_key: &str) -> Option<MacAddress>;
}

// ── Listeners ───────────────────────────────────────────────────────

/// Lifecycle callbacks, fired for saved profiles only.
pub trait SavedNetworkListener: Send + Sync {
    fn on_saved_network_added(&self, _id: NetworkId) {}
    fn on_saved_network_updated(&self, _id: NetworkId) {}
    fn on_saved_network_removed(&self, _id: NetworkId) {}
    fn on_saved_network_enabled(&self, _id: NetworkId) {}
    fn on_saved_network_temporarily_disabled(&self, _id: NetworkId, _reason: DisableReason) {}
    fn on_saved_network_permanently_disabled(&self, _id: NetworkId, _reason: DisableReason) {}
}
