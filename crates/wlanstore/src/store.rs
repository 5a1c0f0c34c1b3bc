//! JSON file backend for the profile repository.
//!
//! One file holds the shared partition, the randomized-MAC map, and every
//! user's private partition keyed by user id. Writes go to a sibling temp
//! file and are renamed into place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use wlanstore_core::{
    ConfigurationRepository, CoreError, Dependencies, MacAddress, NetworkProfile, OwnerPolicy,
    PermissionOracle, PersistenceGateway, RepositoryConfig, StoreData, Uid, UserId, UserStoreData,
};

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreFile {
    shared: Vec<NetworkProfile>,
    randomized_macs: BTreeMap<String, MacAddress>,
    users: BTreeMap<String, UserStoreData>,
}

pub struct JsonFileStore {
    path: PathBuf,
    active_user: Option<UserId>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            active_user: None,
        }
    }

    fn load_file(&self) -> Result<StoreFile, CoreError> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let raw = std::fs::read_to_string(&self.path).map_err(|e| persistence(&self.path, &e))?;
        if raw.trim().is_empty() {
            return Ok(StoreFile::default());
        }
        serde_json::from_str(&raw).map_err(|e| persistence(&self.path, &e))
    }

    fn save_file(&self, file: &StoreFile) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| persistence(parent, &e))?;
        }
        let json = serde_json::to_string_pretty(file).map_err(|e| persistence(&self.path, &e))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| persistence(&tmp, &e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| persistence(&self.path, &e))?;
        Ok(())
    }
}

fn persistence(path: &Path, err: &dyn std::fmt::Display) -> CoreError {
    CoreError::Persistence {
        message: format!("{}: {err}", path.display()),
    }
}

impl PersistenceGateway for JsonFileStore {
    fn are_stores_present(&self) -> bool {
        self.path.exists()
    }

    fn read(&mut self) -> Result<StoreData, CoreError> {
        let mut file = self.load_file()?;
        let user = self
            .active_user
            .and_then(|u| file.users.remove(&u.to_string()))
            .unwrap_or_default();
        debug!(
            path = %self.path.display(),
            shared = file.shared.len(),
            user = user.profiles.len(),
            "store read"
        );
        Ok(StoreData {
            shared: file.shared,
            user: user.profiles,
            deleted_ephemeral_ssids: user.deleted_ephemeral_ssids,
            randomized_macs: file.randomized_macs,
        })
    }

    fn write(&mut self, data: StoreData, _buffered: bool) -> Result<(), CoreError> {
        let mut file = self.load_file()?;
        file.shared = data.shared;
        file.randomized_macs = data.randomized_macs;
        if let Some(user) = self.active_user {
            file.users.insert(
                user.to_string(),
                UserStoreData {
                    profiles: data.user,
                    deleted_ephemeral_ssids: data.deleted_ephemeral_ssids,
                },
            );
        }
        self.save_file(&file)?;
        debug!(path = %self.path.display(), "store written");
        Ok(())
    }

    fn set_user_stores(&mut self, user: UserId) {
        self.active_user = Some(user);
    }

    fn switch_user_stores_and_read(&mut self, user: UserId) -> Result<UserStoreData, CoreError> {
        self.active_user = Some(user);
        let mut file = self.load_file()?;
        Ok(file.users.remove(&user.to_string()).unwrap_or_default())
    }
}

// ── Permissions ─────────────────────────────────────────────────────

/// The operator at the terminal acts as the system identity and holds the
/// settings and setup-wizard permissions. Every other uid holds nothing.
#[derive(Debug, Default)]
pub struct LocalOperator;

impl LocalOperator {
    pub const UID: Uid = Uid::SYSTEM;
}

impl PermissionOracle for LocalOperator {
    fn check_network_settings_permission(&self, uid: Uid) -> bool {
        uid == Self::UID
    }

    fn check_network_setup_wizard_permission(&self, uid: Uid) -> bool {
        uid == Self::UID
    }

    fn is_profile_or_device_owner(&self, _uid: Uid, _policy: OwnerPolicy) -> bool {
        false
    }
}

/// A repository over the JSON store at `path`.
pub fn open_repository(path: &Path, config: RepositoryConfig) -> ConfigurationRepository {
    info!(path = %path.display(), "opening profile store");
    let deps = Dependencies::new(Box::new(JsonFileStore::new(path)), Arc::new(LocalOperator));
    ConfigurationRepository::new(config, deps)
}
