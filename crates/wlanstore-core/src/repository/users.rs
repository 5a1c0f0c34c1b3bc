// ── Store lifecycle and user partitions ──
//
// The shared partition is readable at boot. A user's private partition can
// only be read once that user is unlocked, so reads of it may be deferred
// until `handle_user_unlock`.

use tracing::{debug, info, warn};

use super::ConfigurationRepository;
use crate::error::CoreError;
use crate::external::StoreData;
use crate::model::{NetworkId, NetworkProfile, NetworkStatus, UserId};

impl ConfigurationRepository {
    /// First read of the persisted state. Opens the load gate on success.
    pub fn load_from_store(&mut self) -> Result<(), CoreError> {
        let user = self.current_user;
        if self.deferred_unlock_read || self.permissions.is_user_unlocked(user) {
            self.store.set_user_stores(user);
            self.user_store_loaded = true;
        }
        if !self.store.are_stores_present() {
            info!("no profile stores present, starting empty");
        }
        let data = self.store.read()?;

        self.profiles.clear();
        self.scan_caches.clear();
        self.last_selected = None;
        self.randomizer.load(data.randomized_macs);
        for mut profile in data.shared {
            profile.shared = true;
            self.hydrate(profile);
        }
        if self.user_store_loaded {
            for mut profile in data.user {
                profile.shared = false;
                self.hydrate(profile);
            }
        }
        self.deleted_ephemeral = data.deleted_ephemeral_ssids;
        self.clear_sim_identities();

        self.loaded = true;
        self.deferred_unlock_read = false;
        info!(
            user = user.get(),
            profiles = self.profiles.len(),
            user_store_loaded = self.user_store_loaded,
            "profile store loaded"
        );
        Ok(())
    }

    /// Write both partitions now.
    pub fn save_to_store(&mut self, buffered: bool) -> Result<(), CoreError> {
        if !self.loaded {
            return Err(CoreError::StoreNotLoaded);
        }
        self.write_store(buffered)
    }

    pub(super) fn write_store(&mut self, buffered: bool) -> Result<(), CoreError> {
        let mut data = StoreData {
            deleted_ephemeral_ssids: self.deleted_ephemeral.clone(),
            randomized_macs: self.randomizer.durable_map().clone(),
            ..StoreData::default()
        };
        for profile in self.profiles.values().filter(|p| is_persisted(p)) {
            if !profile.shared && profile.creator_uid.user_id() == self.current_user {
                data.user.push(profile.clone());
            } else {
                data.shared.push(profile.clone());
            }
        }
        self.store.write(data, buffered)
    }

    /// Insert a profile read from a store under a fresh id. Duplicate config
    /// keys are dropped.
    fn hydrate(&mut self, mut profile: NetworkProfile) -> Option<NetworkId> {
        let key = profile.config_key();
        if self.profile_by_config_key(&key).is_some() {
            warn!(config_key = %key, "duplicate profile in store, skipped");
            return None;
        }
        profile.network_id = self.allocate_network_id();
        if profile.status == NetworkStatus::Current {
            profile.status = NetworkStatus::Enabled;
        }
        if profile.randomized_mac.is_placeholder() {
            profile.randomized_mac = self.randomizer.assign(&key);
        }
        let id = profile.network_id;
        self.profiles.insert(id, profile);
        Some(id)
    }

    // ── User lifecycle ───────────────────────────────────────────────

    /// Make `user` the foreground user. Returns the ids of profiles that
    /// are no longer visible.
    pub fn handle_user_switch(&mut self, user: UserId) -> Vec<NetworkId> {
        if user == self.current_user {
            return Vec::new();
        }
        if !self.loaded {
            debug!(user = user.get(), "user switch before load, deferred");
            self.current_user = user;
            return Vec::new();
        }

        // A locked outgoing user has no writable partition
        if self.permissions.is_user_unlocked(self.current_user) {
            self.persist(true);
        }
        let removed = self.drop_private_profiles(|owner| owner != user);
        self.deleted_ephemeral.clear();
        self.current_user = user;
        self.user_store_loaded = false;

        if self.permissions.is_user_unlocked(user) {
            if let Err(e) = self.switch_and_read(user) {
                warn!(user = user.get(), error = %e, "failed to read user store after switch");
            }
        } else {
            debug!(user = user.get(), "user locked, store read deferred to unlock");
        }
        info!(user = user.get(), removed = removed.len(), "user switched");
        removed
    }

    pub fn handle_user_unlock(&mut self, user: UserId) {
        if !self.loaded {
            if user == self.current_user {
                self.deferred_unlock_read = true;
            }
            return;
        }
        if user != self.current_user || self.user_store_loaded {
            return;
        }
        match self.switch_and_read(user) {
            Ok(()) => {
                info!(user = user.get(), "user store loaded after unlock");
                self.persist(true);
            }
            Err(e) => warn!(user = user.get(), error = %e, "failed to read user store after unlock"),
        }
    }

    /// Save and forget the foreground user's private profiles. Returns
    /// their ids.
    pub fn handle_user_stop(&mut self, user: UserId) -> Vec<NetworkId> {
        if user != self.current_user || !self.loaded {
            return Vec::new();
        }
        self.persist(true);
        let removed = self.drop_private_profiles(|owner| owner == user);
        self.user_store_loaded = false;
        info!(user = user.get(), removed = removed.len(), "user stopped");
        removed
    }

    fn switch_and_read(&mut self, user: UserId) -> Result<(), CoreError> {
        let data = self.store.switch_user_stores_and_read(user)?;

        let legacy: Vec<NetworkId> = self
            .profiles
            .values()
            .filter(|p| p.legacy_passpoint && p.creator_uid.user_id() == user)
            .map(|p| p.network_id)
            .collect();
        for id in legacy {
            self.forget(id);
        }

        for mut profile in data.profiles {
            profile.shared = false;
            self.hydrate(profile);
        }
        self.deleted_ephemeral.extend(data.deleted_ephemeral_ssids);
        self.user_store_loaded = true;
        self.clear_sim_identities();
        Ok(())
    }

    /// Drop private profiles whose owning user satisfies `pred`, without
    /// change events.
    fn drop_private_profiles(&mut self, pred: impl Fn(UserId) -> bool) -> Vec<NetworkId> {
        let ids: Vec<NetworkId> = self
            .profiles
            .values()
            .filter(|p| !p.shared && pred(p.creator_uid.user_id()))
            .map(|p| p.network_id)
            .collect();
        for id in &ids {
            self.forget(*id);
        }
        ids
    }

    fn forget(&mut self, id: NetworkId) {
        self.profiles.shift_remove(&id);
        self.scan_caches.remove(&id);
        if self.last_selected_network_id() == id {
            self.last_selected = None;
        }
    }

    // ── SIM credentials ──────────────────────────────────────────────

    /// Drop cached SIM identities after a SIM change and write the result.
    pub fn reset_sim_networks(&mut self) {
        if self.clear_sim_identities() {
            self.persist(true);
        }
    }

    fn clear_sim_identities(&mut self) -> bool {
        let mut changed = false;
        for profile in self.profiles.values_mut() {
            let Some(enterprise) = profile.enterprise.as_ref() else {
                continue;
            };
            if enterprise.is_sim_based() {
                if let Some(enterprise) = profile.enterprise.as_mut() {
                    enterprise.identity.clear();
                    enterprise.anonymous_identity.clear();
                    changed = true;
                }
            } else if enterprise.is_peap_wrapped_sim() {
                let Some(identity) = self.sim_identity.sim_identity(profile) else {
                    continue;
                };
                if let Some(enterprise) = profile.enterprise.as_mut() {
                    enterprise.identity = identity;
                    changed = true;
                }
            }
        }
        if changed {
            debug!("SIM identities reset");
        }
        changed
    }
}

/// Profiles the store keeps: user-saved ones and legacy passpoint entries.
fn is_persisted(profile: &NetworkProfile) -> bool {
    profile.is_saved() || profile.legacy_passpoint
}
