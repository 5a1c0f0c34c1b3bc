// Shared in-memory fakes for repository integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use wlanstore_core::external::{
    Clock, KeyStore, LastResortWatchdog, MacGenerator, OwnerPolicy, PermissionOracle,
    PersistenceGateway, SavedNetworkListener, SimIdentityProvider, StoreData, UserStoreData,
};
use wlanstore_core::{
    ConfigurationRepository, CoreError, Dependencies, DisableReason, MacAddress, NetworkId,
    NetworkProfile, RepositoryConfig, Uid, UserId,
};

// ── Well-known callers ──────────────────────────────────────────────

pub const APP: Uid = Uid::from_parts(UserId::SYSTEM, 10_001);
pub const OTHER_APP: Uid = Uid::from_parts(UserId::SYSTEM, 10_002);
pub const SETTINGS: Uid = Uid::from_parts(UserId::SYSTEM, 1_010);
pub const WIZARD: Uid = Uid::from_parts(UserId::SYSTEM, 1_011);
pub const DEVICE_OWNER: Uid = Uid::from_parts(UserId::SYSTEM, 10_050);
pub const PROFILE_OWNER: Uid = Uid::from_parts(UserId::SYSTEM, 10_060);
pub const GUEST: UserId = UserId::new(10);
pub const GUEST_APP: Uid = Uid::from_parts(GUEST, 10_001);

pub const WALL_START: i64 = 1_700_000_000_000;

// ── Clock ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct FakeClock {
    elapsed: AtomicU64,
    wall: AtomicI64,
}

impl FakeClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            elapsed: AtomicU64::new(0),
            wall: AtomicI64::new(WALL_START),
        })
    }

    pub fn advance(&self, millis: u64) {
        self.elapsed.fetch_add(millis, Ordering::SeqCst);
        self.wall
            .fetch_add(i64::try_from(millis).unwrap(), Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn elapsed_millis(&self) -> u64 {
        self.elapsed.load(Ordering::SeqCst)
    }

    fn wall_clock_millis(&self) -> i64 {
        self.wall.load(Ordering::SeqCst)
    }
}

// ── Store ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct StoreState {
    pub shared: Vec<NetworkProfile>,
    pub randomized_macs: BTreeMap<String, MacAddress>,
    pub shared_deleted: BTreeMap<String, i64>,
    pub users: BTreeMap<UserId, UserStoreData>,
    pub active_user: Option<UserId>,
    pub writes: usize,
    pub fail_reads: bool,
}

/// Store backed by shared memory so tests can look at what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub fn shared_ssids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.shared.iter().map(|p| p.ssid.clone()).collect()
    }

    pub fn user_ssids(&self, user: UserId) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .users
            .get(&user)
            .map(|u| u.profiles.iter().map(|p| p.ssid.clone()).collect())
            .unwrap_or_default()
    }

    pub fn seed_user(&self, user: UserId, profiles: Vec<NetworkProfile>) {
        let mut state = self.state.lock().unwrap();
        state.users.entry(user).or_default().profiles = profiles;
    }

    pub fn seed_shared(&self, profiles: Vec<NetworkProfile>) {
        self.state.lock().unwrap().shared = profiles;
    }
}

impl PersistenceGateway for MemoryStore {
    fn are_stores_present(&self) -> bool {
        let state = self.state.lock().unwrap();
        !state.shared.is_empty() || !state.users.is_empty()
    }

    fn read(&mut self) -> Result<StoreData, CoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(CoreError::Persistence {
                message: "disk on fire".into(),
            });
        }
        let user = state
            .active_user
            .and_then(|u| state.users.get(&u))
            .cloned()
            .unwrap_or_default();
        let mut deleted = state.shared_deleted.clone();
        deleted.extend(user.deleted_ephemeral_ssids);
        Ok(StoreData {
            shared: state.shared.clone(),
            user: user.profiles,
            deleted_ephemeral_ssids: deleted,
            randomized_macs: state.randomized_macs.clone(),
        })
    }

    fn write(&mut self, data: StoreData, _buffered: bool) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.shared = data.shared;
        state.randomized_macs = data.randomized_macs;
        if let Some(user) = state.active_user {
            state.users.insert(
                user,
                UserStoreData {
                    profiles: data.user,
                    deleted_ephemeral_ssids: data.deleted_ephemeral_ssids,
                },
            );
        } else {
            state.shared_deleted = data.deleted_ephemeral_ssids;
        }
        state.writes += 1;
        Ok(())
    }

    fn set_user_stores(&mut self, user: UserId) {
        self.state.lock().unwrap().active_user = Some(user);
    }

    fn switch_user_stores_and_read(&mut self, user: UserId) -> Result<UserStoreData, CoreError> {
        let mut state = self.state.lock().unwrap();
        state.active_user = Some(user);
        Ok(state.users.get(&user).cloned().unwrap_or_default())
    }
}

// ── Permissions ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakePermissions {
    pub settings: BTreeSet<Uid>,
    pub setup_wizard: BTreeSet<Uid>,
    pub device_owner: Option<Uid>,
    pub profile_owner: Option<Uid>,
    pub system_ui: BTreeSet<Uid>,
    pub locked_users: Mutex<BTreeSet<UserId>>,
    pub lockdown: AtomicBool,
}

impl FakePermissions {
    pub fn standard() -> Self {
        Self {
            settings: BTreeSet::from([SETTINGS]),
            setup_wizard: BTreeSet::from([WIZARD]),
            device_owner: Some(DEVICE_OWNER),
            profile_owner: Some(PROFILE_OWNER),
            ..Self::default()
        }
    }

    pub fn lock(&self, user: UserId) {
        self.locked_users.lock().unwrap().insert(user);
    }

    pub fn unlock(&self, user: UserId) {
        self.locked_users.lock().unwrap().remove(&user);
    }
}

impl PermissionOracle for FakePermissions {
    fn check_network_settings_permission(&self, uid: Uid) -> bool {
        self.settings.contains(&uid)
    }

    fn check_network_setup_wizard_permission(&self, uid: Uid) -> bool {
        self.setup_wizard.contains(&uid)
    }

    fn is_profile_or_device_owner(&self, uid: Uid, policy: OwnerPolicy) -> bool {
        let device_owner = self.device_owner == Some(uid);
        match policy {
            OwnerPolicy::DeviceOwner => device_owner,
            OwnerPolicy::ProfileOwner => device_owner || self.profile_owner == Some(uid),
        }
    }

    fn is_system_ui(&self, uid: Uid) -> bool {
        self.system_ui.contains(&uid)
    }

    fn is_user_unlocked(&self, user: UserId) -> bool {
        !self.locked_users.lock().unwrap().contains(&user)
    }

    fn device_owner_configs_lockdown(&self) -> bool {
        self.lockdown.load(Ordering::SeqCst)
    }
}

// ── Other collaborators ─────────────────────────────────────────────

/// Fails every update while `fail` is set.
#[derive(Debug, Default)]
pub struct FakeKeyStore {
    pub fail: Arc<AtomicBool>,
}

impl KeyStore for FakeKeyStore {
    fn update_network_keys(
        &mut self,
        profile: &NetworkProfile,
        _existing: Option<&NetworkProfile>,
    ) -> Result<(), CoreError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(CoreError::KeyStoreUpdateFailed {
                config_key: profile.config_key(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Debug)]
pub struct FixedSimIdentity(pub Option<String>);

impl SimIdentityProvider for FixedSimIdentity {
    fn sim_identity(&self, _profile: &NetworkProfile) -> Option<String> {
        self.0.clone()
    }
}

#[derive(Debug, Default)]
pub struct FlagWatchdog {
    pub ignore: AtomicBool,
}

impl LastResortWatchdog for FlagWatchdog {
    fn should_ignore_ssid_update(&self) -> bool {
        self.ignore.load(Ordering::SeqCst)
    }
}

/// Counts calls and derives the MAC from the call number.
#[derive(Debug, Default)]
pub struct CountingMacGenerator {
    pub calls: Arc<AtomicU64>,
}

impl MacGenerator for CountingMacGenerator {
    fn generate(&self, _config_key: &str) -> Option<MacAddress> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let low = u8::try_from(n % 256).unwrap();
        Some(MacAddress::from_octets([0x02, 0x11, 0x22, 0x33, 0x44, low]))
    }
}

/// Records listener callbacks as `"<event>:<id>"` strings.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingListener {
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    fn push(&self, event: &str, id: NetworkId) {
        self.events.lock().unwrap().push(format!("{event}:{id}"));
    }
}

impl SavedNetworkListener for RecordingListener {
    fn on_saved_network_added(&self, id: NetworkId) {
        self.push("added", id);
    }
    fn on_saved_network_updated(&self, id: NetworkId) {
        self.push("updated", id);
    }
    fn on_saved_network_removed(&self, id: NetworkId) {
        self.push("removed", id);
    }
    fn on_saved_network_enabled(&self, id: NetworkId) {
        self.push("enabled", id);
    }
    fn on_saved_network_temporarily_disabled(&self, id: NetworkId, reason: DisableReason) {
        self.push(&format!("temp_disabled({reason})"), id);
    }
    fn on_saved_network_permanently_disabled(&self, id: NetworkId, reason: DisableReason) {
        self.push(&format!("perm_disabled({reason})"), id);
    }
}

// ── Harness ─────────────────────────────────────────────────────────

pub struct Harness {
    pub repo: ConfigurationRepository,
    pub clock: Arc<FakeClock>,
    pub store: MemoryStore,
    pub permissions: Arc<FakePermissions>,
    pub key_store_fail: Arc<AtomicBool>,
    pub watchdog: Arc<FlagWatchdog>,
    pub mac_calls: Arc<AtomicU64>,
    pub listener: RecordingListener,
}

pub struct HarnessBuilder {
    config: RepositoryConfig,
    store: MemoryStore,
    permissions: FakePermissions,
    sim_identity: Option<String>,
    load: bool,
}

impl HarnessBuilder {
    pub fn config(mut self, config: RepositoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn permissions(mut self, permissions: FakePermissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn sim_identity(mut self, identity: &str) -> Self {
        self.sim_identity = Some(identity.to_owned());
        self
    }

    pub fn unloaded(mut self) -> Self {
        self.load = false;
        self
    }

    pub fn build(self) -> Harness {
        let clock = FakeClock::new();
        let permissions = Arc::new(self.permissions);
        let key_store = FakeKeyStore::default();
        let key_store_fail = Arc::clone(&key_store.fail);
        let watchdog = Arc::new(FlagWatchdog::default());
        let generator = CountingMacGenerator::default();
        let mac_calls = Arc::clone(&generator.calls);

        let deps = Dependencies::new(Box::new(self.store.clone()), permissions.clone())
            .with_clock(clock.clone())
            .with_key_store(Box::new(key_store))
            .with_sim_identity(Box::new(FixedSimIdentity(self.sim_identity)))
            .with_watchdog(watchdog.clone())
            .with_mac_generator(Box::new(generator));
        let mut repo = ConfigurationRepository::new(self.config, deps);
        let listener = RecordingListener::default();
        repo.add_listener(Box::new(listener.clone()));
        if self.load {
            repo.load_from_store().unwrap();
        }

        Harness {
            repo,
            clock,
            store: self.store,
            permissions,
            key_store_fail,
            watchdog,
            mac_calls,
            listener,
        }
    }
}

pub fn harness() -> HarnessBuilder {
    HarnessBuilder {
        config: RepositoryConfig::default(),
        store: MemoryStore::default(),
        permissions: FakePermissions::standard(),
        sim_identity: None,
        load: true,
    }
}
