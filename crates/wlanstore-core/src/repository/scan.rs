// ── Scan correlation, linking and PNO lists ──

use std::collections::BTreeSet;

use tracing::debug;

use super::ConfigurationRepository;
use crate::error::CoreError;
use crate::linker::{self, LinkDecision};
use crate::model::{NetworkId, NetworkProfile, ScanDetail};
use crate::pno::{self, PnoNetwork};
use crate::scan::{ScanDetailCache, matches_profile};

impl ConfigurationRepository {
    /// Record a sighting in the profile's cache, creating the cache on first
    /// use, then re-evaluate the profile's links.
    pub fn save_to_scan_detail_cache_for_network(
        &mut self,
        id: NetworkId,
        detail: ScanDetail,
    ) -> Result<(), CoreError> {
        if !self.profiles.contains_key(&id) {
            return Err(CoreError::NetworkNotFound { id });
        }
        let (max, trim) = (
            self.config.scan_cache_max_entries,
            self.config.scan_cache_trim_entries,
        );
        self.scan_caches
            .entry(id)
            .or_insert_with(|| ScanDetailCache::new(id, max, trim))
            .put(detail);
        self.attempt_network_linking(id)
    }

    /// Find the profile a sighting belongs to and cache the sighting there.
    pub fn get_configured_network_for_scan_detail_and_cache(
        &mut self,
        detail: &ScanDetail,
    ) -> Option<NetworkProfile> {
        let profile = self
            .profiles
            .values()
            .find(|p| matches_profile(p, detail))?
            .clone();
        self.save_to_scan_detail_cache_for_network(profile.network_id, detail.clone())
            .ok()?;
        Some(profile)
    }

    pub fn scan_detail_cache_for_network(&self, id: NetworkId) -> Option<&ScanDetailCache> {
        self.scan_caches.get(&id)
    }

    // ── Linking ──────────────────────────────────────────────────────

    /// Re-evaluate links between `id` and every other profile. Links are
    /// kept symmetric.
    pub fn attempt_network_linking(&mut self, id: NetworkId) -> Result<(), CoreError> {
        let target = self
            .profiles
            .get(&id)
            .ok_or(CoreError::NetworkNotFound { id })?;
        let target_cache = self.scan_caches.get(&id);
        let target_key = target.config_key();

        let decisions: Vec<(NetworkId, String, LinkDecision)> = self
            .profiles
            .values()
            .filter(|other| other.network_id != id)
            .map(|other| {
                let decision = linker::decide(
                    target,
                    target_cache,
                    other,
                    self.scan_caches.get(&other.network_id),
                    &self.config,
                );
                (other.network_id, other.config_key(), decision)
            })
            .filter(|(_, _, decision)| *decision != LinkDecision::Leave)
            .collect();

        for (other_id, other_key, decision) in decisions {
            let linked = decision == LinkDecision::Link;
            if let Some(target) = self.profiles.get_mut(&id) {
                toggle_link(&mut target.linked_configurations, &other_key, linked);
            }
            if let Some(other) = self.profiles.get_mut(&other_id) {
                toggle_link(&mut other.linked_configurations, &target_key, linked);
            }
            debug!(network_id = %id, other = %other_id, linked, "link re-evaluated");
        }
        Ok(())
    }

    // ── Channel sets ─────────────────────────────────────────────────

    /// Frequencies for a partial scan targeting `id`, after re-evaluating
    /// its links. `None` when the profile or its cache is unknown.
    pub fn fetch_channel_set_for_network_for_partial_scan(
        &mut self,
        id: NetworkId,
        age_ms: u64,
        current_frequency: Option<u32>,
    ) -> Option<BTreeSet<u32>> {
        self.attempt_network_linking(id).ok()?;
        let cap = self.config.max_num_active_channels_for_partial_scans;
        self.channel_set(id, age_ms, current_frequency, Some(cap))
    }

    fn channel_set(
        &self,
        id: NetworkId,
        age_ms: u64,
        current_frequency: Option<u32>,
        cap: Option<usize>,
    ) -> Option<BTreeSet<u32>> {
        let profile = self.profiles.get(&id)?;
        let cache = self.scan_caches.get(&id)?;
        let now = self.now_wall();

        let linked = profile
            .linked_configurations
            .iter()
            .filter_map(|key| self.profile_by_config_key(key))
            .filter_map(|p| self.scan_caches.get(&p.network_id))
            .flat_map(|c| c.frequencies_seen_within(now, age_ms));
        let candidates = current_frequency
            .into_iter()
            .chain(cache.frequencies_seen_within(now, age_ms))
            .chain(linked);

        let mut channels = BTreeSet::new();
        for frequency in candidates {
            if cap.is_some_and(|cap| channels.len() >= cap) {
                break;
            }
            channels.insert(frequency);
        }
        Some(channels)
    }

    // ── PNO ──────────────────────────────────────────────────────────

    /// Ranked background-scan candidates with their frequency hints.
    pub fn retrieve_pno_network_list(&self) -> Vec<PnoNetwork> {
        let candidates: Vec<&NetworkProfile> = self
            .profiles
            .values()
            .filter(|p| pno::is_pno_candidate(p))
            .collect();
        pno::rank(candidates, self.config.pno_recency_sorting_enabled)
            .into_iter()
            .map(|p| PnoNetwork {
                ssid: p.ssid.clone(),
                config_key: p.config_key(),
                hidden: p.hidden_ssid,
                frequencies: self.pno_frequencies(p.network_id),
            })
            .collect()
    }

    fn pno_frequencies(&self, id: NetworkId) -> Vec<u32> {
        if !self.config.pno_frequency_culling_enabled {
            return Vec::new();
        }
        self.channel_set(id, self.config.max_pno_scan_frequency_age_ms, None, None)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default()
    }

    /// Quoted SSIDs of hidden networks, ranked like the PNO list.
    pub fn retrieve_hidden_network_list(&self) -> Vec<String> {
        let candidates: Vec<&NetworkProfile> = self
            .profiles
            .values()
            .filter(|p| pno::is_hidden_candidate(p))
            .collect();
        pno::rank(candidates, self.config.pno_recency_sorting_enabled)
            .into_iter()
            .map(|p| p.ssid.clone())
            .collect()
    }
}

fn toggle_link(links: &mut BTreeSet<String>, key: &str, linked: bool) {
    if linked {
        links.insert(key.to_owned());
    } else {
        links.remove(key);
    }
}
