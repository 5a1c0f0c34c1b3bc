// ── Read accessors and masking tiers ──
//
// Tier 1 masks credentials for unprivileged callers and the randomized MAC
// for anyone but the creator or a privileged caller. Tier 2 is tier 1
// restricted to saved profiles. Tier 3 returns cleartext for internal use.

use super::ConfigurationRepository;
use crate::model::credential::mask_in_place;
use crate::model::{MacAddress, MacRandomizationSetting, NetworkId, NetworkProfile, Uid};

/// Which parts of a profile to hide on a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Masking {
    pub credentials: bool,
    pub mac: bool,
}

impl Masking {
    pub const NONE: Self = Self {
        credentials: false,
        mac: false,
    };
    /// Change events go to every user.
    pub const BROADCAST: Self = Self {
        credentials: true,
        mac: true,
    };
    pub const CREDENTIALS_ONLY: Self = Self {
        credentials: true,
        mac: false,
    };
}

impl ConfigurationRepository {
    /// A copy of `profile` with the requested parts hidden.
    pub(crate) fn mask(&self, profile: &NetworkProfile, masking: Masking) -> NetworkProfile {
        let mut copy = profile.clone();
        if masking.credentials {
            mask_in_place(&mut copy.pre_shared_key);
            for key in &mut copy.wep_keys {
                mask_in_place(key);
            }
            if let Some(enterprise) = copy.enterprise.as_mut() {
                mask_in_place(&mut enterprise.password);
            }
        }
        if masking.mac {
            copy.randomized_mac = MacAddress::placeholder();
        }
        if !self.config.mac_randomization_supported {
            copy.mac_randomization_setting = MacRandomizationSetting::None;
        }
        copy
    }

    fn masking_for(&self, profile: &NetworkProfile, uid: Uid) -> Masking {
        let privileged = self.is_privileged(uid);
        Masking {
            credentials: !privileged,
            mac: !(privileged || uid == profile.creator_uid),
        }
    }

    fn masked_for(&self, profile: &NetworkProfile, uid: Uid) -> NetworkProfile {
        self.mask(profile, self.masking_for(profile, uid))
    }

    // ── Tier 1 ───────────────────────────────────────────────────────

    /// Every profile, as `uid` may see it.
    pub fn configured_networks(&self, uid: Uid) -> Vec<NetworkProfile> {
        if !self.loaded {
            return Vec::new();
        }
        self.profiles
            .values()
            .map(|p| self.masked_for(p, uid))
            .collect()
    }

    pub fn configured_network(&self, id: NetworkId, uid: Uid) -> Option<NetworkProfile> {
        if !self.loaded {
            return None;
        }
        self.profiles.get(&id).map(|p| self.masked_for(p, uid))
    }

    // ── Tier 2 ───────────────────────────────────────────────────────

    /// Profiles the user saved: no ephemeral, passpoint, suggestion or
    /// specifier profiles.
    pub fn saved_networks(&self, uid: Uid) -> Vec<NetworkProfile> {
        if !self.loaded {
            return Vec::new();
        }
        self.profiles
            .values()
            .filter(|p| p.is_saved())
            .map(|p| self.masked_for(p, uid))
            .collect()
    }

    // ── Tier 3 ───────────────────────────────────────────────────────

    pub fn configured_network_with_password(&self, id: NetworkId) -> Option<NetworkProfile> {
        if !self.loaded {
            return None;
        }
        self.profiles.get(&id).map(|p| self.mask(p, Masking::NONE))
    }

    pub fn configured_networks_with_passwords(&self) -> Vec<NetworkProfile> {
        if !self.loaded {
            return Vec::new();
        }
        self.profiles
            .values()
            .map(|p| self.mask(p, Masking::NONE))
            .collect()
    }

    /// The stored profile exactly as held, for internal consumers.
    pub fn configured_network_without_masking(&self, id: NetworkId) -> Option<NetworkProfile> {
        if !self.loaded {
            return None;
        }
        self.profiles.get(&id).cloned()
    }

    /// What every reader may see: all profiles with credentials and MACs
    /// hidden.
    pub(crate) fn broadcast_snapshot(&self) -> Vec<NetworkProfile> {
        if !self.loaded {
            return Vec::new();
        }
        self.profiles
            .values()
            .map(|p| self.mask(p, Masking::BROADCAST))
            .collect()
    }

    pub fn network_count(&self) -> usize {
        self.profiles.len()
    }
}
