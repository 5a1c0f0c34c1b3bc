// ── Typed request and result structs for profile updates ──
//
// A draft names only the fields the caller wants to set. `None` keeps the
// stored value on update and takes the default on add.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{
    AuthAlgorithm, Credential, EnterpriseConfig, GroupCipher, IpConfiguration, KeyMgmt,
    MacRandomizationSetting, NetworkId, PairwiseCipher, Protocol, SecurityType, quote_ssid,
};

// ── Draft ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDraft {
    /// Profile to update. `None` adds, or updates the profile with the
    /// same config key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<NetworkId>,
    /// Plain or quoted SSID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bssid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_ssid: Option<bool>,

    // Security
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_key_management: Option<BTreeSet<KeyMgmt>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_protocols: Option<BTreeSet<Protocol>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_auth_algorithms: Option<BTreeSet<AuthAlgorithm>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_pairwise_ciphers: Option<BTreeSet<PairwiseCipher>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_group_ciphers: Option<BTreeSet<GroupCipher>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_pmf: Option<bool>,
    /// Passphrase (plain or quoted) or 64 hex digits. `*` is ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_shared_key: Option<Credential>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wep_keys: Option<[Option<Credential>; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wep_tx_key_index: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<EnterpriseConfig>,

    // Classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passpoint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_suggestion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_specifier: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_passpoint: Option<bool>,

    /// Always applied. An explicit `None` is rejected.
    pub ip_configuration: Option<IpConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_randomization_setting: Option<MacRandomizationSetting>,
}

impl Default for ProfileDraft {
    fn default() -> Self {
        Self {
            network_id: None,
            ssid: None,
            bssid: None,
            hidden_ssid: None,
            allowed_key_management: None,
            allowed_protocols: None,
            allowed_auth_algorithms: None,
            allowed_pairwise_ciphers: None,
            allowed_group_ciphers: None,
            require_pmf: None,
            pre_shared_key: None,
            wep_keys: None,
            wep_tx_key_index: None,
            enterprise: None,
            ephemeral: None,
            passpoint: None,
            fqdn: None,
            from_suggestion: None,
            from_specifier: None,
            shared: None,
            legacy_passpoint: None,
            ip_configuration: Some(IpConfiguration::default()),
            mac_randomization_setting: None,
        }
    }
}

impl ProfileDraft {
    /// An open network.
    pub fn open(ssid: &str) -> Self {
        Self {
            ssid: Some(ssid.to_owned()),
            ..Self::default()
        }
    }

    /// A WPA/WPA2 personal network.
    pub fn psk(ssid: &str, passphrase: &str) -> Self {
        Self {
            ssid: Some(ssid.to_owned()),
            allowed_key_management: Some(SecurityType::Psk.default_key_mgmt()),
            pre_shared_key: Some(Credential::new(passphrase)),
            ..Self::default()
        }
    }

    /// A WPA3 personal network.
    pub fn sae(ssid: &str, passphrase: &str) -> Self {
        Self {
            ssid: Some(ssid.to_owned()),
            allowed_key_management: Some(SecurityType::Sae.default_key_mgmt()),
            pre_shared_key: Some(Credential::new(passphrase)),
            require_pmf: Some(true),
            ..Self::default()
        }
    }

    /// A WEP network keyed in slot 0.
    pub fn wep(ssid: &str, key: &str) -> Self {
        Self {
            ssid: Some(ssid.to_owned()),
            allowed_key_management: Some(SecurityType::Wep.default_key_mgmt()),
            wep_keys: Some([Some(Credential::new(key)), None, None, None]),
            wep_tx_key_index: Some(0),
            ..Self::default()
        }
    }

    /// An 802.1X enterprise network.
    pub fn eap(ssid: &str, enterprise: EnterpriseConfig) -> Self {
        Self {
            ssid: Some(ssid.to_owned()),
            allowed_key_management: Some(SecurityType::Eap.default_key_mgmt()),
            enterprise: Some(enterprise),
            ..Self::default()
        }
    }

    /// An update to an existing profile that changes nothing yet.
    pub fn for_network(id: NetworkId) -> Self {
        Self {
            network_id: Some(id),
            ..Self::default()
        }
    }

    /// The config key the draft would produce on a fresh profile, used to
    /// find an existing match. `None` when the draft names no SSID.
    pub(crate) fn lookup_key(&self) -> Option<String> {
        if self.passpoint == Some(true) {
            if let Some(fqdn) = &self.fqdn {
                return Some(format!("{}{}", quote_ssid(fqdn), SecurityType::Eap));
            }
        }
        let ssid = self.ssid.as_deref()?;
        let key_mgmt = self.allowed_key_management.clone().unwrap_or_default();
        let has_wep_keys = self.wep_keys.as_ref().is_some_and(|keys| {
            keys.iter()
                .any(|k| k.as_ref().is_some_and(|k| !k.is_empty() && !k.is_mask()))
        });
        let security = SecurityType::from_key_mgmt(&key_mgmt, has_wep_keys);
        Some(format!("{}{security}", quote_ssid(ssid)))
    }
}

// ── Result ──────────────────────────────────────────────────────────

/// Outcome of a successful `add_or_update_network`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkUpdateResult {
    pub network_id: NetworkId,
    pub is_new: bool,
    pub ip_changed: bool,
    pub proxy_changed: bool,
    pub credential_changed: bool,
}
