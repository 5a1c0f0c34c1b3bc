// ── Network profile domain types ──

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::credential::Credential;
use super::ids::{MacAddress, NetworkId, Uid};
use super::ip::IpConfiguration;
use super::security::{AuthAlgorithm, GroupCipher, KeyMgmt, PairwiseCipher, Protocol, SecurityType};
use crate::selection::SelectionStatus;

/// Connection-level status, independent of the selection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NetworkStatus {
    Current,
    Enabled,
    #[default]
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MacRandomizationSetting {
    None,
    #[default]
    Persistent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EapMethod {
    #[default]
    None,
    Peap,
    Tls,
    Ttls,
    Pwd,
    Sim,
    Aka,
    AkaPrime,
    UnauthTls,
}

impl EapMethod {
    pub fn is_sim_family(self) -> bool {
        matches!(self, Self::Sim | Self::Aka | Self::AkaPrime)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase2Method {
    #[default]
    None,
    Pap,
    Mschap,
    Mschapv2,
    Gtc,
    Sim,
    Aka,
    AkaPrime,
}

impl Phase2Method {
    pub fn is_sim_family(self) -> bool {
        matches!(self, Self::Sim | Self::Aka | Self::AkaPrime)
    }
}

/// 802.1X settings for enterprise profiles.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnterpriseConfig {
    pub eap_method: EapMethod,
    pub phase2_method: Phase2Method,
    pub identity: String,
    pub anonymous_identity: String,
    pub password: Option<Credential>,
    pub ca_certificate_alias: Option<String>,
    pub client_certificate_alias: Option<String>,
    pub domain_suffix_match: Option<String>,
    pub realm: Option<String>,
    pub plmn: Option<String>,
}

impl EnterpriseConfig {
    /// EAP-SIM, EAP-AKA or EAP-AKA' at the outer layer.
    pub fn is_sim_based(&self) -> bool {
        self.eap_method.is_sim_family()
    }

    /// PEAP tunnelling a SIM-family inner method.
    pub fn is_peap_wrapped_sim(&self) -> bool {
        self.eap_method == EapMethod::Peap && self.phase2_method.is_sim_family()
    }
}

/// A stored Wi-Fi network profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct NetworkProfile {
    pub network_id: NetworkId,

    // Credentials
    /// Quoted SSID, e.g. `"home"`.
    pub ssid: String,
    pub bssid: Option<MacAddress>,
    pub hidden_ssid: bool,
    pub allowed_key_management: BTreeSet<KeyMgmt>,
    pub allowed_protocols: BTreeSet<Protocol>,
    pub allowed_auth_algorithms: BTreeSet<AuthAlgorithm>,
    pub allowed_pairwise_ciphers: BTreeSet<PairwiseCipher>,
    pub allowed_group_ciphers: BTreeSet<GroupCipher>,
    pub require_pmf: bool,
    pub pre_shared_key: Option<Credential>,
    pub wep_keys: [Option<Credential>; 4],
    pub wep_tx_key_index: u8,
    pub enterprise: Option<EnterpriseConfig>,

    // Classification
    pub ephemeral: bool,
    pub passpoint: bool,
    pub fqdn: Option<String>,
    pub from_suggestion: bool,
    pub from_specifier: bool,
    pub shared: bool,
    pub legacy_passpoint: bool,

    // Ownership / audit
    pub creator_uid: Uid,
    pub creator_name: Option<String>,
    pub last_update_uid: Uid,
    pub last_update_name: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    pub last_connect_uid: Uid,

    pub status: NetworkStatus,
    pub selection: SelectionStatus,

    // Networking extras
    pub randomized_mac: MacAddress,
    pub mac_randomization_setting: MacRandomizationSetting,
    pub default_gw_mac: Option<MacAddress>,
    /// Config keys of profiles believed to be the same physical network.
    pub linked_configurations: BTreeSet<String>,
    pub ip_configuration: IpConfiguration,

    // Connection history
    pub num_association: u32,
    /// Wall-clock millis of the last successful connection.
    pub last_connected: Option<i64>,
}

impl NetworkProfile {
    pub fn security_type(&self) -> SecurityType {
        SecurityType::from_key_mgmt(&self.allowed_key_management, self.has_wep_keys())
    }

    /// Identity string: quoted SSID (or FQDN for passpoint) followed by
    /// the security class, e.g. `"home"WPA_PSK`.
    pub fn config_key(&self) -> String {
        if self.passpoint {
            if let Some(fqdn) = &self.fqdn {
                return format!("{}{}", quote_ssid(fqdn), SecurityType::Eap);
            }
        }
        format!("{}{}", self.ssid, self.security_type())
    }

    pub fn has_wep_keys(&self) -> bool {
        self.wep_keys
            .iter()
            .any(|k| k.as_ref().is_some_and(|k| !k.is_empty()))
    }

    /// Saved profiles are the ones a user configured and the store persists.
    pub fn is_saved(&self) -> bool {
        !(self.ephemeral || self.passpoint || self.from_suggestion || self.from_specifier)
    }

    pub fn is_ephemeral_or_passpoint(&self) -> bool {
        self.ephemeral || self.passpoint
    }

    pub fn is_sim_based(&self) -> bool {
        self.enterprise.as_ref().is_some_and(EnterpriseConfig::is_sim_based)
    }

    pub fn unquoted_ssid(&self) -> &str {
        unquote_ssid(&self.ssid)
    }
}

/// Quote a plain SSID. Already-quoted input is returned unchanged.
pub fn quote_ssid(raw: &str) -> String {
    if is_quoted(raw) {
        raw.to_owned()
    } else {
        format!("\"{raw}\"")
    }
}

pub fn unquote_ssid(ssid: &str) -> &str {
    if is_quoted(ssid) {
        ssid.get(1..ssid.len() - 1).unwrap_or(ssid)
    } else {
        ssid
    }
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn psk_profile(ssid: &str) -> NetworkProfile {
        NetworkProfile {
            ssid: quote_ssid(ssid),
            allowed_key_management: BTreeSet::from([KeyMgmt::WpaPsk]),
            pre_shared_key: Some(Credential::new("\"password\"")),
            ..NetworkProfile::default()
        }
    }

    #[test]
    fn config_key_joins_ssid_and_security() {
        assert_eq!(psk_profile("home").config_key(), "\"home\"WPA_PSK");

        let open = NetworkProfile {
            ssid: quote_ssid("cafe"),
            ..NetworkProfile::default()
        };
        assert_eq!(open.config_key(), "\"cafe\"NONE");
    }

    #[test]
    fn wep_keys_make_a_wep_profile() {
        let mut wep = NetworkProfile {
            ssid: quote_ssid("old"),
            allowed_key_management: BTreeSet::from([KeyMgmt::None]),
            ..NetworkProfile::default()
        };
        wep.wep_keys[0] = Some(Credential::new("\"abcde\""));
        assert_eq!(wep.security_type(), SecurityType::Wep);
        assert_eq!(wep.config_key(), "\"old\"WEP");
    }

    #[test]
    fn passpoint_key_uses_fqdn() {
        let hs = NetworkProfile {
            passpoint: true,
            fqdn: Some("example.com".into()),
            allowed_key_management: BTreeSet::from([KeyMgmt::WpaEap]),
            ..NetworkProfile::default()
        };
        assert_eq!(hs.config_key(), "\"example.com\"WPA_EAP");
        assert!(!hs.is_saved());
    }

    #[test]
    fn ssid_quoting_is_idempotent() {
        assert_eq!(quote_ssid("x"), "\"x\"");
        assert_eq!(quote_ssid("\"x\""), "\"x\"");
        assert_eq!(unquote_ssid("\"x\""), "x");
        assert_eq!(unquote_ssid("x"), "x");
    }

    #[test]
    fn new_profile_defaults() {
        let p = NetworkProfile::default();
        assert_eq!(p.network_id, NetworkId::INVALID);
        assert_eq!(p.status, NetworkStatus::Disabled);
        assert!(p.selection.is_enabled());
        assert!(p.randomized_mac.is_placeholder());
        assert_eq!(p.mac_randomization_setting, MacRandomizationSetting::Persistent);
    }

    #[test]
    fn peap_sim_is_not_sim_based() {
        let peap = EnterpriseConfig {
            eap_method: EapMethod::Peap,
            phase2_method: Phase2Method::Aka,
            ..EnterpriseConfig::default()
        };
        assert!(!peap.is_sim_based());
        assert!(peap.is_peap_wrapped_sim());
    }
}
