// ── Security classification ──
//
// Profiles declare key-management and cipher sets; scan results advertise
// capability strings. Both collapse into a `SecurityType` so matching and
// linking can compare them directly.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Key-management schemes a profile may allow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyMgmt {
    None,
    WpaPsk,
    WpaEap,
    Ieee8021x,
    Sae,
    Owe,
    SuiteB192,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Protocol {
    Wpa,
    Rsn,
    Osen,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthAlgorithm {
    Open,
    Shared,
    Leap,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairwiseCipher {
    None,
    Tkip,
    Ccmp,
    Gcmp256,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupCipher {
    Wep40,
    Wep104,
    Tkip,
    Ccmp,
    Gcmp256,
}

/// The security class used for de-duplication, matching and linking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[non_exhaustive]
pub enum SecurityType {
    #[strum(serialize = "NONE")]
    Open,
    #[strum(serialize = "WEP")]
    Wep,
    #[strum(serialize = "WPA_PSK")]
    Psk,
    #[strum(serialize = "SAE")]
    Sae,
    #[strum(serialize = "WPA_EAP")]
    Eap,
    #[strum(serialize = "OWE")]
    Owe,
    #[strum(serialize = "SUITE_B_192")]
    EapSuiteB,
}

impl SecurityType {
    /// Derive the class from a key-management set and whether WEP keys are present.
    pub fn from_key_mgmt(key_mgmt: &BTreeSet<KeyMgmt>, has_wep_keys: bool) -> Self {
        if key_mgmt.contains(&KeyMgmt::SuiteB192) {
            Self::EapSuiteB
        } else if key_mgmt.contains(&KeyMgmt::Sae) {
            Self::Sae
        } else if key_mgmt.contains(&KeyMgmt::Owe) {
            Self::Owe
        } else if key_mgmt.contains(&KeyMgmt::WpaPsk) {
            Self::Psk
        } else if key_mgmt.contains(&KeyMgmt::WpaEap) || key_mgmt.contains(&KeyMgmt::Ieee8021x) {
            Self::Eap
        } else if has_wep_keys {
            Self::Wep
        } else {
            Self::Open
        }
    }

    /// The key-management set a bare security class implies.
    pub fn default_key_mgmt(self) -> BTreeSet<KeyMgmt> {
        let mgmt = match self {
            Self::Open | Self::Wep => KeyMgmt::None,
            Self::Psk => KeyMgmt::WpaPsk,
            Self::Sae => KeyMgmt::Sae,
            Self::Eap => KeyMgmt::WpaEap,
            Self::Owe => KeyMgmt::Owe,
            Self::EapSuiteB => KeyMgmt::SuiteB192,
        };
        BTreeSet::from([mgmt])
    }

    /// Pre-shared-key, SAE and enterprise networks may be linked to each other.
    pub fn is_linkable(self) -> bool {
        matches!(self, Self::Psk | Self::Sae | Self::Eap)
    }

    pub fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::Owe)
    }
}

/// Parse the security classes a scan result advertises.
///
/// Capability strings look like `[WPA2-PSK-CCMP][RSN-SAE-CCMP][ESS]`. A
/// transition-mode AP advertises more than one class.
pub fn scan_security_types(capabilities: &str) -> BTreeSet<SecurityType> {
    let caps = capabilities.to_ascii_uppercase();
    let mut out = BTreeSet::new();

    if caps.contains("WEP") {
        out.insert(SecurityType::Wep);
    }
    if caps.contains("PSK") {
        out.insert(SecurityType::Psk);
    }
    if caps.contains("SAE") {
        out.insert(SecurityType::Sae);
    }
    let suite_b = caps.contains("SUITE-B-192") || caps.contains("SUITE_B_192");
    if suite_b {
        out.insert(SecurityType::EapSuiteB);
    } else if caps.contains("EAP") {
        out.insert(SecurityType::Eap);
    }
    if caps.contains("OWE_TRANSITION") {
        out.insert(SecurityType::Open);
        out.insert(SecurityType::Owe);
    } else if caps.contains("OWE") {
        out.insert(SecurityType::Owe);
    }

    if out.is_empty() {
        out.insert(SecurityType::Open);
    }
    out
}
