use std::collections::BTreeMap;

use serde::Serialize;

use super::{ConfigurationRepository, LastSelected, Masking};
use crate::model::{NetworkId, NetworkProfile, UserId};

/// Diagnostic snapshot of the repository. Credentials are masked.
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryDump {
    pub current_user: UserId,
    pub loaded: bool,
    pub user_store_loaded: bool,
    pub next_network_id: i32,
    pub last_selected: Option<LastSelected>,
    pub deleted_ephemeral_ssids: BTreeMap<String, i64>,
    pub scan_cache_sizes: BTreeMap<NetworkId, usize>,
    pub profiles: Vec<NetworkProfile>,
}

impl ConfigurationRepository {
    pub fn dump(&self) -> RepositoryDump {
        RepositoryDump {
            current_user: self.current_user,
            loaded: self.loaded,
            user_store_loaded: self.user_store_loaded,
            next_network_id: self.next_network_id,
            last_selected: self.last_selected.clone(),
            deleted_ephemeral_ssids: self.deleted_ephemeral.clone(),
            scan_cache_sizes: self
                .scan_caches
                .iter()
                .map(|(id, cache)| (*id, cache.len()))
                .collect(),
            profiles: self
                .profiles
                .values()
                .map(|p| self.mask(p, Masking::CREDENTIALS_ONLY))
                .collect(),
        }
    }
}
