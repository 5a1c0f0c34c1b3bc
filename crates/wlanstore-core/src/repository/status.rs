// ── Narrow single-field mutators ──

use std::collections::BTreeSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, info};

use super::ConfigurationRepository;
use crate::error::CoreError;
use crate::model::{
    ChangeReason, MacAddress, MacRandomizationSetting, NetworkId, NetworkStatus, ScanDetail, Uid,
    quote_ssid,
};
use crate::selection::{Candidate, DisableReason, Transition};

impl ConfigurationRepository {
    /// Record a selection failure (or an explicit enable) for a profile.
    ///
    /// Returns `false` when the watchdog asked to ignore this
    /// association-rejection report; nothing changes in that case.
    pub fn update_network_selection_status(
        &mut self,
        id: NetworkId,
        reason: DisableReason,
    ) -> Result<bool, CoreError> {
        if !self.profiles.contains_key(&id) {
            return Err(CoreError::NetworkNotFound { id });
        }
        if reason == DisableReason::AssociationRejection && self.watchdog.should_ignore_ssid_update() {
            debug!(network_id = %id, "watchdog suppressed association rejection");
            return Ok(false);
        }

        let now = self.now_elapsed();
        let Some(profile) = self.profiles.get_mut(&id) else {
            return Err(CoreError::NetworkNotFound { id });
        };
        let transition = profile
            .selection
            .record(reason, &self.config.selection_policy, now);
        match transition {
            Transition::Unchanged => return Ok(true),
            Transition::Enabled => profile.status = NetworkStatus::Enabled,
            Transition::PermanentlyDisabled(_) => profile.status = NetworkStatus::Disabled,
            Transition::TemporarilyDisabled(_) => {}
        }
        self.after_transition(id, transition);
        Ok(true)
    }

    /// Re-enable a temporarily disabled profile whose timeout has passed.
    pub fn try_enable_network(&mut self, id: NetworkId) -> bool {
        let now = self.now_elapsed();
        let Some(profile) = self.profiles.get_mut(&id) else {
            return false;
        };
        if !profile.selection.try_enable(&self.config.selection_policy, now) {
            return false;
        }
        profile.status = NetworkStatus::Enabled;
        self.after_transition(id, Transition::Enabled);
        true
    }

    fn after_transition(&mut self, id: NetworkId, transition: Transition) {
        let Some(profile) = self.profiles.get(&id) else {
            return;
        };
        debug!(network_id = %id, ?transition, "selection status changed");
        self.emit_change(ChangeReason::ConfigChange, profile);
        match transition {
            Transition::Enabled => self.notify_saved(profile, |l, id| l.on_saved_network_enabled(id)),
            Transition::TemporarilyDisabled(reason) => {
                self.notify_saved(profile, |l, id| l.on_saved_network_temporarily_disabled(id, reason));
            }
            Transition::PermanentlyDisabled(reason) => {
                self.notify_saved(profile, |l, id| l.on_saved_network_permanently_disabled(id, reason));
            }
            Transition::Unchanged => {}
        }
        if profile.is_saved() {
            self.persist(false);
        }
    }

    pub fn update_network_not_recommended(
        &mut self,
        id: NetworkId,
        not_recommended: bool,
    ) -> Result<(), CoreError> {
        self.profile_mut(id)?.selection.not_recommended = not_recommended;
        Ok(())
    }

    pub fn update_last_connect_uid(&mut self, id: NetworkId, uid: Uid) -> Result<(), CoreError> {
        self.profile_mut(id)?.last_connect_uid = uid;
        Ok(())
    }

    /// Record a successful connection: history counters, `Current` status
    /// and a cleared failure count.
    pub fn update_network_after_connect(&mut self, id: NetworkId) -> Result<(), CoreError> {
        let now = self.now_wall();
        let profile = self.profile_mut(id)?;
        profile.last_connected = Some(now);
        profile.num_association = profile.num_association.saturating_add(1);
        profile.selection.has_ever_connected = true;
        profile.selection.clear_failure_counts();
        profile.status = NetworkStatus::Current;
        let saved = profile.is_saved();
        info!(network_id = %id, "connected");
        if saved {
            self.persist(false);
        }
        Ok(())
    }

    /// A `Current` profile drops back to `Enabled`.
    pub fn update_network_after_disconnect(&mut self, id: NetworkId) -> Result<(), CoreError> {
        let profile = self.profile_mut(id)?;
        if profile.status == NetworkStatus::Current {
            profile.status = NetworkStatus::Enabled;
        }
        let saved = profile.is_saved();
        if saved {
            self.persist(false);
        }
        Ok(())
    }

    /// Record that the user preferred `choice_config_key` over this profile.
    pub fn set_network_connect_choice(
        &mut self,
        id: NetworkId,
        choice_config_key: &str,
    ) -> Result<(), CoreError> {
        let now = self.now_wall();
        self.profile_mut(id)?
            .selection
            .set_connect_choice(choice_config_key.to_owned(), now);
        Ok(())
    }

    pub fn clear_network_connect_choice(&mut self, id: NetworkId) -> Result<(), CoreError> {
        self.profile_mut(id)?.selection.clear_connect_choice();
        Ok(())
    }

    pub fn set_network_default_gw_mac_address(
        &mut self,
        id: NetworkId,
        mac: MacAddress,
    ) -> Result<(), CoreError> {
        self.profile_mut(id)?.default_gw_mac = Some(mac);
        Ok(())
    }

    /// Overwrite the in-memory randomized MAC. The durable map is untouched.
    pub fn set_network_randomized_mac_address(
        &mut self,
        id: NetworkId,
        mac: MacAddress,
    ) -> Result<(), CoreError> {
        self.profile_mut(id)?.randomized_mac = mac;
        Ok(())
    }

    pub fn set_network_candidate_scan_result(
        &mut self,
        id: NetworkId,
        scan: ScanDetail,
        score: i32,
    ) -> Result<(), CoreError> {
        self.profile_mut(id)?.selection.candidate = Some(Candidate { scan, score });
        Ok(())
    }

    pub fn clear_network_candidate_scan_result(&mut self, id: NetworkId) -> Result<(), CoreError> {
        self.profile_mut(id)?.selection.candidate = None;
        Ok(())
    }

    pub fn set_network_seen_in_last_qualified_selection(
        &mut self,
        id: NetworkId,
        seen: bool,
    ) -> Result<(), CoreError> {
        self.profile_mut(id)?
            .selection
            .seen_in_last_qualified_network_selection = seen;
        Ok(())
    }

    // ── Flaky randomization hotlist ──────────────────────────────────

    /// Replace the SSIDs known to misbehave with randomized MACs.
    pub fn set_flaky_ssid_hotlist<I, S>(&self, ssids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        replace_hotlist(&self.flaky_ssids, ssids);
    }

    /// True when the profile's SSID is hotlisted and it uses persistent
    /// randomization.
    pub fn is_in_flaky_randomization_ssid_hotlist(&self, id: NetworkId) -> bool {
        self.profiles.get(&id).is_some_and(|p| {
            p.mac_randomization_setting == MacRandomizationSetting::Persistent
                && self.flaky_ssids.load().contains(&p.ssid)
        })
    }
}

/// Swap in a new hotlist. SSIDs are stored quoted.
pub(crate) fn replace_hotlist<I, S>(hotlist: &ArcSwap<BTreeSet<String>>, ssids: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let set = ssids.into_iter().map(|s| quote_ssid(s.as_ref())).collect();
    hotlist.store(Arc::new(set));
}
