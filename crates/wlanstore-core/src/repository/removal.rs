// ── Bulk removal and ephemeral bookkeeping ──

use tracing::{debug, info};

use super::ConfigurationRepository;
use crate::model::{NetworkId, NetworkProfile, Uid, UserId, quote_ssid};

impl ConfigurationRepository {
    /// Remove every profile the given app created.
    pub fn remove_networks_for_app(&mut self, uid: Uid, package: &str) -> Vec<NetworkId> {
        let removed = self.remove_where(|p| {
            p.creator_uid == uid && p.creator_name.as_deref() == Some(package)
        });
        if !removed.is_empty() {
            info!(uid = %uid, package, removed = removed.len(), "removed networks for app");
        }
        removed
    }

    /// Remove every profile created by an app of `user`.
    pub fn remove_networks_for_user(&mut self, user: UserId) -> Vec<NetworkId> {
        let removed = self.remove_where(|p| p.creator_uid.user_id() == user);
        if !removed.is_empty() {
            info!(user = user.get(), removed = removed.len(), "removed networks for user");
        }
        removed
    }

    pub fn remove_all_ephemeral_or_passpoint_configured_networks(&mut self) -> bool {
        !self
            .remove_where(NetworkProfile::is_ephemeral_or_passpoint)
            .is_empty()
    }

    pub fn remove_passpoint_configured_network(&mut self, fqdn: &str) -> bool {
        !self
            .remove_where(|p| p.passpoint && p.fqdn.as_deref() == Some(fqdn))
            .is_empty()
    }

    /// Remove profiles matching `pred` and write the store when any of them
    /// was persisted.
    fn remove_where(&mut self, pred: impl Fn(&NetworkProfile) -> bool) -> Vec<NetworkId> {
        let ids: Vec<NetworkId> = self
            .profiles
            .values()
            .filter(|p| pred(p))
            .map(|p| p.network_id)
            .collect();
        let mut write = false;
        for id in &ids {
            if let Some(removed) = self.remove_internal(*id) {
                write |= removed.is_saved() || removed.legacy_passpoint;
            }
        }
        if write {
            self.persist(true);
        }
        ids
    }

    // ── Deleted ephemeral networks ───────────────────────────────────

    /// Remember that the user dismissed the ephemeral or passpoint network
    /// with this SSID, and drop connect choices that point at it. The
    /// profile itself stays. Returns its id, or `None` (recording nothing)
    /// when no such profile exists.
    pub fn disable_ephemeral_network(&mut self, ssid: &str) -> Option<NetworkId> {
        let quoted = quote_ssid(ssid);
        let (id, key) = self
            .profiles
            .values()
            .find(|p| p.is_ephemeral_or_passpoint() && p.ssid == quoted)
            .map(|p| (p.network_id, p.config_key()))?;

        let now = self.now_wall();
        self.deleted_ephemeral.insert(quoted.clone(), now);
        for profile in self.profiles.values_mut() {
            if profile.selection.connect_choice.as_deref() == Some(key.as_str()) {
                profile.selection.clear_connect_choice();
            }
        }
        debug!(network_id = %id, ssid = %quoted, "ephemeral network dismissed");
        self.persist(true);
        Some(id)
    }

    /// Whether the user dismissed this ephemeral network within the expiry
    /// window. Expired entries are pruned.
    pub fn was_ephemeral_network_deleted(&mut self, ssid: &str) -> bool {
        let now = self.now_wall();
        let expiry = i64::try_from(self.config.deleted_ephemeral_expiry_ms).unwrap_or(i64::MAX);
        self.deleted_ephemeral
            .retain(|_, deleted_at| now.saturating_sub(*deleted_at) <= expiry);
        self.deleted_ephemeral.contains_key(&quote_ssid(ssid))
    }
}
