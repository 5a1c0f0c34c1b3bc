// ── Add, update, remove, enable, disable ──

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{ConfigurationRepository, LastSelected};
use crate::command::requests::{NetworkUpdateResult, ProfileDraft};
use crate::error::CoreError;
use crate::model::{
    ChangeReason, Credential, MacAddress, NetworkId, NetworkProfile, NetworkStatus, Uid,
    quote_ssid,
};
use crate::selection::{DisableReason, SelectionStatus};
use crate::validate::{normalize_passphrase, normalize_wep_key, validate_profile};

impl ConfigurationRepository {
    /// Add a new profile or update an existing one from a draft.
    ///
    /// The draft is matched by `network_id` when given, otherwise by the
    /// config key it would produce.
    pub fn add_or_update_network(
        &mut self,
        draft: ProfileDraft,
        caller: Uid,
        caller_package: Option<&str>,
    ) -> Result<NetworkUpdateResult, CoreError> {
        if !self.loaded {
            warn!(uid = %caller, "add_or_update_network before store load");
            return Err(CoreError::StoreNotLoaded);
        }
        if draft.ip_configuration.is_none() {
            return Err(CoreError::invalid("ip_configuration", "must not be null"));
        }

        let existing_id = match draft.network_id.filter(|id| id.is_valid()) {
            Some(id) => {
                if !self.profiles.contains_key(&id) {
                    return Err(CoreError::NetworkNotFound { id });
                }
                Some(id)
            }
            None => {
                let key = draft
                    .lookup_key()
                    .ok_or_else(|| CoreError::invalid("ssid", "required when adding a network"))?;
                self.profile_by_config_key(&key).map(|p| p.network_id)
            }
        };
        let existing = existing_id.and_then(|id| self.profiles.get(&id)).cloned();

        match &existing {
            Some(profile) if !self.can_modify_network(profile, caller) => {
                warn!(uid = %caller, network_id = %profile.network_id, "modification denied");
                return Err(CoreError::denied(caller, "modify network"));
            }
            None if !self.can_create_network(caller) => {
                warn!(uid = %caller, "creation denied for background user");
                return Err(CoreError::denied(caller, "add network"));
            }
            _ => {}
        }

        let base = existing.clone().unwrap_or_default();
        let mut merged = base.clone();
        let requested_mac_setting = draft.mac_randomization_setting;
        apply_draft(&mut merged, draft);
        validate_profile(&merged)?;

        if requested_mac_setting.is_some_and(|s| s != base.mac_randomization_setting)
            && !self.can_change_mac_randomization(caller)
        {
            warn!(uid = %caller, "MAC randomization setting change denied");
            return Err(CoreError::denied(caller, "change MAC randomization setting"));
        }

        let proxy_changed = match &existing {
            Some(old) => old.ip_configuration.proxy != merged.ip_configuration.proxy,
            None => merged.ip_configuration.proxy.is_configured(),
        };
        if proxy_changed && !self.can_modify_proxy_settings(caller) {
            warn!(uid = %caller, "proxy change denied");
            return Err(CoreError::denied(caller, "modify proxy settings"));
        }
        let ip_changed = existing
            .as_ref()
            .is_some_and(|old| old.ip_configuration.ip_assignment != merged.ip_configuration.ip_assignment);

        let credential_changed = match &existing {
            Some(old) => credentials_differ(old, &merged),
            None => true,
        };
        if credential_changed {
            merged.selection.has_ever_connected = false;
        }

        if merged.enterprise.is_some() {
            if let Err(e) = self.key_store.update_network_keys(&merged, existing.as_ref()) {
                warn!(config_key = %merged.config_key(), error = %e, "key store update failed");
                return Err(CoreError::KeyStoreUpdateFailed {
                    config_key: merged.config_key(),
                });
            }
        }

        let now = wall_to_datetime(self.now_wall());
        let is_new = existing.is_none();
        if is_new {
            merged.network_id = self.allocate_network_id();
            merged.creator_uid = caller;
            merged.creator_name = caller_package.map(str::to_owned);
            merged.creation_time = now;
            merged.status = NetworkStatus::Disabled;
            merged.selection = SelectionStatus::default();
            if merged.randomized_mac.is_placeholder() {
                merged.randomized_mac = self.randomizer.assign(&merged.config_key());
            }
        }
        merged.last_update_uid = caller;
        merged.last_update_name = caller_package.map(str::to_owned);
        merged.update_time = now;

        let network_id = merged.network_id;
        debug!(
            network_id = %network_id,
            config_key = %merged.config_key(),
            uid = %caller,
            is_new,
            credential_changed,
            "profile committed"
        );

        if is_new && merged.is_saved() {
            self.deleted_ephemeral.remove(&merged.ssid);
        }
        if is_new {
            self.emit_change(ChangeReason::Added, &merged);
            self.notify_saved(&merged, |l, id| l.on_saved_network_added(id));
        } else {
            self.emit_change(ChangeReason::ConfigChange, &merged);
            self.notify_saved(&merged, |l, id| l.on_saved_network_updated(id));
        }
        let persisted = merged.is_saved();
        self.profiles.insert(network_id, merged);
        if persisted {
            self.persist(true);
        }

        Ok(NetworkUpdateResult {
            network_id,
            is_new,
            ip_changed,
            proxy_changed,
            credential_changed,
        })
    }

    /// Remove a profile. Only its creator or a privileged caller may.
    pub fn remove_network(&mut self, id: NetworkId, caller: Uid) -> Result<(), CoreError> {
        let profile = self
            .profiles
            .get(&id)
            .ok_or(CoreError::NetworkNotFound { id })?;
        if !self.can_modify_network(profile, caller) {
            warn!(uid = %caller, network_id = %id, "removal denied");
            return Err(CoreError::denied(caller, "remove network"));
        }
        if let Some(removed) = self.remove_internal(id) {
            if removed.is_saved() {
                self.persist(true);
            }
        }
        Ok(())
    }

    /// Drop a profile and every reference to it. Does not write the store.
    pub(super) fn remove_internal(&mut self, id: NetworkId) -> Option<NetworkProfile> {
        let removed = self.profiles.shift_remove(&id)?;
        self.scan_caches.remove(&id);

        let key = removed.config_key();
        for other in self.profiles.values_mut() {
            if other.selection.connect_choice.as_deref() == Some(key.as_str()) {
                other.selection.clear_connect_choice();
            }
            other.linked_configurations.remove(&key);
        }
        if self.last_selected_network_id() == id {
            self.last_selected = None;
        }

        debug!(network_id = %id, config_key = %key, "profile removed");
        self.emit_change(ChangeReason::Removed, &removed);
        self.notify_saved(&removed, |l, id| l.on_saved_network_removed(id));
        Some(removed)
    }

    /// Enable a profile for selection, optionally disabling all others.
    ///
    /// The last-selected bookkeeping is updated even when the caller is not
    /// allowed to modify the profile.
    pub fn enable_network(
        &mut self,
        id: NetworkId,
        disable_others: bool,
        caller: Uid,
    ) -> Result<(), CoreError> {
        let profile = self
            .profiles
            .get(&id)
            .ok_or(CoreError::NetworkNotFound { id })?;
        let config_key = profile.config_key();
        let allowed = self.can_modify_network(profile, caller);

        self.last_selected = Some(LastSelected {
            network_id: id,
            config_key,
            selected_at_ms: self.now_elapsed(),
        });

        if !allowed {
            warn!(uid = %caller, network_id = %id, "enable denied");
            return Err(CoreError::denied(caller, "enable network"));
        }

        let now = self.now_elapsed();
        let policy = self.config.selection_policy.clone();
        let profile = self.profile_mut(id)?;
        profile.selection.record(DisableReason::Enable, &policy, now);
        profile.status = NetworkStatus::Enabled;
        if disable_others {
            for (other_id, other) in &mut self.profiles {
                if *other_id != id {
                    other.status = NetworkStatus::Disabled;
                }
            }
        }

        if let Some(profile) = self.profiles.get(&id) {
            debug!(network_id = %id, disable_others, "network enabled");
            self.emit_change(ChangeReason::ConfigChange, profile);
            self.notify_saved(profile, |l, id| l.on_saved_network_enabled(id));
        }
        self.persist(true);
        Ok(())
    }

    /// Permanently disable a profile on behalf of the user.
    ///
    /// Clears the last-selected bookkeeping for this profile even when the
    /// caller is not allowed to modify it.
    pub fn disable_network(&mut self, id: NetworkId, caller: Uid) -> Result<(), CoreError> {
        let profile = self
            .profiles
            .get(&id)
            .ok_or(CoreError::NetworkNotFound { id })?;
        let allowed = self.can_modify_network(profile, caller);

        if self.last_selected_network_id() == id {
            self.last_selected = None;
        }
        if !allowed {
            warn!(uid = %caller, network_id = %id, "disable denied");
            return Err(CoreError::denied(caller, "disable network"));
        }

        let now = self.now_elapsed();
        let policy = self.config.selection_policy.clone();
        let profile = self.profile_mut(id)?;
        profile
            .selection
            .record(DisableReason::ByWifiManager, &policy, now);
        profile.status = NetworkStatus::Disabled;

        if let Some(profile) = self.profiles.get(&id) {
            debug!(network_id = %id, "network disabled by user");
            self.emit_change(ChangeReason::ConfigChange, profile);
            self.notify_saved(profile, |l, id| {
                l.on_saved_network_permanently_disabled(id, DisableReason::ByWifiManager);
            });
        }
        self.persist(true);
        Ok(())
    }
}

// ── Draft merging ───────────────────────────────────────────────────

/// Copy every field the draft sets onto `target`. Masked credentials keep
/// the stored value.
fn apply_draft(target: &mut NetworkProfile, draft: ProfileDraft) {
    if let Some(ssid) = draft.ssid {
        target.ssid = quote_ssid(&ssid);
    }
    if let Some(bssid) = draft.bssid {
        target.bssid = (!bssid.is_empty()).then(|| MacAddress::new(bssid));
    }
    if let Some(hidden) = draft.hidden_ssid {
        target.hidden_ssid = hidden;
    }
    if let Some(v) = draft.allowed_key_management {
        target.allowed_key_management = v;
    }
    if let Some(v) = draft.allowed_protocols {
        target.allowed_protocols = v;
    }
    if let Some(v) = draft.allowed_auth_algorithms {
        target.allowed_auth_algorithms = v;
    }
    if let Some(v) = draft.allowed_pairwise_ciphers {
        target.allowed_pairwise_ciphers = v;
    }
    if let Some(v) = draft.allowed_group_ciphers {
        target.allowed_group_ciphers = v;
    }
    if let Some(v) = draft.require_pmf {
        target.require_pmf = v;
    }
    if let Some(psk) = draft.pre_shared_key.filter(|k| !k.is_mask()) {
        target.pre_shared_key = Some(Credential::new(normalize_passphrase(psk.expose())));
    }
    if let Some(keys) = draft.wep_keys {
        for (slot, key) in target.wep_keys.iter_mut().zip(keys) {
            if let Some(k) = key.filter(|k| !k.is_mask()) {
                *slot = Some(Credential::new(normalize_wep_key(k.expose())));
            }
        }
    }
    if let Some(index) = draft.wep_tx_key_index {
        target.wep_tx_key_index = index;
    }
    if let Some(mut enterprise) = draft.enterprise {
        if enterprise.password.as_ref().is_some_and(Credential::is_mask) {
            enterprise.password = target
                .enterprise
                .as_ref()
                .and_then(|e| e.password.clone());
        }
        target.enterprise = Some(enterprise);
    }

    if let Some(v) = draft.ephemeral {
        target.ephemeral = v;
    }
    if let Some(v) = draft.passpoint {
        target.passpoint = v;
    }
    if let Some(v) = draft.fqdn {
        target.fqdn = Some(v);
    }
    if let Some(v) = draft.from_suggestion {
        target.from_suggestion = v;
    }
    if let Some(v) = draft.from_specifier {
        target.from_specifier = v;
    }
    if let Some(v) = draft.shared {
        target.shared = v;
    }
    if let Some(v) = draft.legacy_passpoint {
        target.legacy_passpoint = v;
    }
    if let Some(ip) = draft.ip_configuration {
        target.ip_configuration = ip;
    }
    if let Some(setting) = draft.mac_randomization_setting {
        target.mac_randomization_setting = setting;
    }
}

/// Whether any field that affects authentication differs.
fn credentials_differ(old: &NetworkProfile, new: &NetworkProfile) -> bool {
    old.pre_shared_key != new.pre_shared_key
        || old.wep_keys != new.wep_keys
        || old.wep_tx_key_index != new.wep_tx_key_index
        || old.allowed_key_management != new.allowed_key_management
        || old.allowed_protocols != new.allowed_protocols
        || old.allowed_auth_algorithms != new.allowed_auth_algorithms
        || old.allowed_pairwise_ciphers != new.allowed_pairwise_ciphers
        || old.allowed_group_ciphers != new.allowed_group_ciphers
        || old.hidden_ssid != new.hidden_ssid
        || old.require_pmf != new.require_pmf
        || old.enterprise != new.enterprise
}

fn wall_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}
