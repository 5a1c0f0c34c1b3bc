// ── Scan observations ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ids::MacAddress;
use super::security::{SecurityType, scan_security_types};

/// One sighting of an access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDetail {
    /// SSID as broadcast, without quotes.
    pub ssid: String,
    pub bssid: MacAddress,
    /// Bracketed capability flags, e.g. `[WPA2-PSK-CCMP][ESS]`.
    pub capabilities: String,
    pub frequency_mhz: u32,
    pub level_dbm: i32,
    /// Wall-clock milliseconds of the sighting.
    pub seen_millis: i64,
}

impl ScanDetail {
    pub fn new(
        ssid: impl Into<String>,
        bssid: MacAddress,
        capabilities: impl Into<String>,
        frequency_mhz: u32,
        level_dbm: i32,
        seen_millis: i64,
    ) -> Self {
        Self {
            ssid: ssid.into(),
            bssid,
            capabilities: capabilities.into(),
            frequency_mhz,
            level_dbm,
            seen_millis,
        }
    }

    /// The SSID in the quoted form profiles store.
    pub fn quoted_ssid(&self) -> String {
        format!("\"{}\"", self.ssid)
    }

    pub fn security_types(&self) -> BTreeSet<SecurityType> {
        scan_security_types(&self.capabilities)
    }
}
