// ── Configuration repository ──
//
// The single owner of every known profile. All mutation goes through
// `&mut self`; callers that need concurrency wrap the repository in a
// `ProfileService`. Impl blocks are split by concern across the child
// modules.

mod dump;
mod masking;
mod removal;
mod scan;
mod status;
mod update;
mod users;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::RepositoryConfig;
use crate::error::CoreError;
use crate::external::{
    Clock, KeyStore, LastResortWatchdog, MacGenerator, NeverIgnore, NoSimIdentity, NoopKeyStore,
    OwnerPolicy, PermissionOracle, PersistenceGateway, SavedNetworkListener, SimIdentityProvider,
    SystemClock,
};
use crate::mac_randomizer::{MacAddressRandomizer, Sha256MacGenerator};
use crate::model::{ChangeReason, NetworkId, NetworkProfile, ProfileChange, Uid, UserId};
use crate::scan::ScanDetailCache;

pub use dump::RepositoryDump;
pub(crate) use masking::Masking;
pub(crate) use status::replace_hotlist;

const CHANGE_CHANNEL_SIZE: usize = 256;

// ── Dependencies ────────────────────────────────────────────────────

/// The external collaborators a repository is built from.
pub struct Dependencies {
    pub clock: Arc<dyn Clock>,
    pub store: Box<dyn PersistenceGateway>,
    pub permissions: Arc<dyn PermissionOracle>,
    pub key_store: Box<dyn KeyStore>,
    pub sim_identity: Box<dyn SimIdentityProvider>,
    pub watchdog: Arc<dyn LastResortWatchdog>,
    pub mac_generator: Box<dyn MacGenerator>,
}

impl Dependencies {
    /// Real clock, randomly keyed MAC generator, and no-op key store, SIM
    /// provider and watchdog.
    pub fn new(store: Box<dyn PersistenceGateway>, permissions: Arc<dyn PermissionOracle>) -> Self {
        Self {
            clock: Arc::new(SystemClock::new()),
            store,
            permissions,
            key_store: Box::new(NoopKeyStore),
            sim_identity: Box::new(NoSimIdentity),
            watchdog: Arc::new(NeverIgnore),
            mac_generator: Box::new(Sha256MacGenerator::random()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_key_store(mut self, key_store: Box<dyn KeyStore>) -> Self {
        self.key_store = key_store;
        self
    }

    pub fn with_sim_identity(mut self, sim_identity: Box<dyn SimIdentityProvider>) -> Self {
        self.sim_identity = sim_identity;
        self
    }

    pub fn with_watchdog(mut self, watchdog: Arc<dyn LastResortWatchdog>) -> Self {
        self.watchdog = watchdog;
        self
    }

    pub fn with_mac_generator(mut self, generator: Box<dyn MacGenerator>) -> Self {
        self.mac_generator = generator;
        self
    }
}

// ── Bookkeeping ─────────────────────────────────────────────────────

/// The network the user picked most recently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastSelected {
    pub network_id: NetworkId,
    pub config_key: String,
    /// Elapsed-time millis of the selection.
    pub selected_at_ms: u64,
}

// ── ConfigurationRepository ─────────────────────────────────────────

pub struct ConfigurationRepository {
    config: RepositoryConfig,
    clock: Arc<dyn Clock>,
    store: Box<dyn PersistenceGateway>,
    permissions: Arc<dyn PermissionOracle>,
    key_store: Box<dyn KeyStore>,
    sim_identity: Box<dyn SimIdentityProvider>,
    watchdog: Arc<dyn LastResortWatchdog>,
    randomizer: MacAddressRandomizer,
    listeners: Vec<Box<dyn SavedNetworkListener>>,
    changes: broadcast::Sender<ProfileChange>,

    profiles: IndexMap<NetworkId, NetworkProfile>,
    scan_caches: HashMap<NetworkId, ScanDetailCache>,
    next_network_id: i32,
    last_selected: Option<LastSelected>,
    /// Quoted SSID -> wall-clock millis of the deletion.
    deleted_ephemeral: BTreeMap<String, i64>,
    flaky_ssids: Arc<ArcSwap<BTreeSet<String>>>,

    current_user: UserId,
    /// The first store read has completed.
    loaded: bool,
    /// The current user's partition has been read.
    user_store_loaded: bool,
    /// An unlock arrived before the first read.
    deferred_unlock_read: bool,
}

impl ConfigurationRepository {
    pub fn new(config: RepositoryConfig, deps: Dependencies) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_SIZE);
        Self {
            config,
            clock: deps.clock,
            store: deps.store,
            permissions: deps.permissions,
            key_store: deps.key_store,
            sim_identity: deps.sim_identity,
            watchdog: deps.watchdog,
            randomizer: MacAddressRandomizer::new(deps.mac_generator),
            listeners: Vec::new(),
            changes,
            profiles: IndexMap::new(),
            scan_caches: HashMap::new(),
            next_network_id: 0,
            last_selected: None,
            deleted_ephemeral: BTreeMap::new(),
            flaky_ssids: Arc::new(ArcSwap::from_pointee(BTreeSet::new())),
            current_user: UserId::SYSTEM,
            loaded: false,
            user_store_loaded: false,
            deferred_unlock_read: false,
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn add_listener(&mut self, listener: Box<dyn SavedNetworkListener>) {
        self.listeners.push(listener);
    }

    /// Receive a masked copy of every added, changed or removed profile.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ProfileChange> {
        self.changes.subscribe()
    }

    pub(crate) fn change_sender(&self) -> broadcast::Sender<ProfileChange> {
        self.changes.clone()
    }

    /// Shared handle to the flaky-randomization SSID hotlist. Replacing its
    /// contents takes effect on the next query.
    pub fn flaky_ssid_hotlist(&self) -> Arc<ArcSwap<BTreeSet<String>>> {
        Arc::clone(&self.flaky_ssids)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn current_user(&self) -> UserId {
        self.current_user
    }

    pub fn last_selected(&self) -> Option<&LastSelected> {
        self.last_selected.as_ref()
    }

    pub fn last_selected_network_id(&self) -> NetworkId {
        self.last_selected
            .as_ref()
            .map_or(NetworkId::INVALID, |s| s.network_id)
    }

    pub fn last_selected_network_config_key(&self) -> Option<&str> {
        self.last_selected.as_ref().map(|s| s.config_key.as_str())
    }

    pub fn last_selected_time_ms(&self) -> Option<u64> {
        self.last_selected.as_ref().map(|s| s.selected_at_ms)
    }

    // ── Internal helpers ─────────────────────────────────────────────

    fn profile_mut(&mut self, id: NetworkId) -> Result<&mut NetworkProfile, CoreError> {
        self.profiles
            .get_mut(&id)
            .ok_or(CoreError::NetworkNotFound { id })
    }

    fn profile_by_config_key(&self, config_key: &str) -> Option<&NetworkProfile> {
        self.profiles.values().find(|p| p.config_key() == config_key)
    }

    fn allocate_network_id(&mut self) -> NetworkId {
        let id = NetworkId::new(self.next_network_id);
        self.next_network_id += 1;
        id
    }

    fn now_wall(&self) -> i64 {
        self.clock.wall_clock_millis()
    }

    fn now_elapsed(&self) -> u64 {
        self.clock.elapsed_millis()
    }

    fn is_privileged(&self, uid: Uid) -> bool {
        uid == Uid::SYSTEM || self.permissions.check_network_settings_permission(uid)
    }

    fn is_device_owner(&self, uid: Uid) -> bool {
        self.permissions
            .is_profile_or_device_owner(uid, OwnerPolicy::DeviceOwner)
    }

    /// Creation is open to the foreground user's apps and system identities.
    fn can_create_network(&self, uid: Uid) -> bool {
        uid == Uid::SYSTEM
            || uid.user_id() == self.current_user
            || self.permissions.is_system_ui(uid)
    }

    fn can_modify_network(&self, profile: &NetworkProfile, uid: Uid) -> bool {
        if uid == Uid::SYSTEM || self.is_device_owner(uid) {
            return true;
        }
        if self.is_device_owner(profile.creator_uid) {
            return !self.permissions.device_owner_configs_lockdown()
                && self.permissions.check_network_settings_permission(uid);
        }
        uid == profile.creator_uid || self.permissions.check_network_settings_permission(uid)
    }

    fn can_modify_proxy_settings(&self, uid: Uid) -> bool {
        self.permissions.check_network_settings_permission(uid)
            || self.permissions.check_network_setup_wizard_permission(uid)
            || self
                .permissions
                .is_profile_or_device_owner(uid, OwnerPolicy::ProfileOwner)
            || self.is_device_owner(uid)
    }

    fn can_change_mac_randomization(&self, uid: Uid) -> bool {
        self.permissions.check_network_settings_permission(uid)
            || self.permissions.check_network_setup_wizard_permission(uid)
    }

    /// Publish a masked change event. Having no subscribers is fine.
    fn emit_change(&self, reason: ChangeReason, profile: &NetworkProfile) {
        let masked = self.mask(profile, Masking::BROADCAST);
        let _ = self.changes.send(ProfileChange {
            reason,
            profile: Arc::new(masked),
            user: self.current_user,
        });
    }

    fn notify_saved(&self, profile: &NetworkProfile, f: impl Fn(&dyn SavedNetworkListener, NetworkId)) {
        if !profile.is_saved() {
            return;
        }
        for listener in &self.listeners {
            f(listener.as_ref(), profile.network_id);
        }
    }

    /// Write both partitions. Failures are logged, never surfaced to the
    /// mutation that triggered them.
    fn persist(&mut self, buffered: bool) {
        if !self.loaded {
            return;
        }
        if let Err(e) = self.write_store(buffered) {
            warn!(error = %e, "failed to write profile store");
        } else {
            debug!(buffered, "profile store written");
        }
    }
}
