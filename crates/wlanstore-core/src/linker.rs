// ── Profile linking ──
//
// Two credentialed profiles are "linked" when the evidence says they are
// the same physical network (dual-band APs broadcasting two SSIDs, for
// instance). Links widen the channel set used for partial scans.

use crate::config::RepositoryConfig;
use crate::model::NetworkProfile;
use crate::scan::ScanDetailCache;

/// BSSIDs sharing this many leading characters count as the same AP.
const BSSID_PREFIX_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDecision {
    Link,
    Unlink,
    /// Not enough evidence either way; keep whatever is recorded.
    Leave,
}

/// Only PSK, SAE and EAP profiles that are not ephemeral take part.
pub fn is_linkable(profile: &NetworkProfile) -> bool {
    !profile.ephemeral && profile.security_type().is_linkable()
}

/// Decide whether `a` and `b` should be linked.
pub fn decide(
    a: &NetworkProfile,
    a_cache: Option<&ScanDetailCache>,
    b: &NetworkProfile,
    b_cache: Option<&ScanDetailCache>,
    config: &RepositoryConfig,
) -> LinkDecision {
    if a.network_id == b.network_id || a.config_key() == b.config_key() {
        return LinkDecision::Leave;
    }
    if !is_linkable(a) || !is_linkable(b) {
        return LinkDecision::Leave;
    }
    if config.only_link_same_credential_configurations && a.pre_shared_key != b.pre_shared_key {
        return LinkDecision::Leave;
    }

    if let (Some(gw_a), Some(gw_b)) = (&a.default_gw_mac, &b.default_gw_mac) {
        return if gw_a == gw_b {
            LinkDecision::Link
        } else {
            LinkDecision::Unlink
        };
    }

    let (Some(a_cache), Some(b_cache)) = (a_cache, b_cache) else {
        return LinkDecision::Leave;
    };
    let max = config.link_max_scan_cache_entries;
    if a_cache.len() > max || b_cache.len() > max {
        return LinkDecision::Leave;
    }

    let shared_ap = a_cache.values().any(|x| {
        b_cache
            .values()
            .any(|y| bssid_prefix_matches(x.bssid.as_str(), y.bssid.as_str()))
    });
    if shared_ap {
        LinkDecision::Link
    } else {
        LinkDecision::Unlink
    }
}

fn bssid_prefix_matches(a: &str, b: &str) -> bool {
    match (a.get(..BSSID_PREFIX_LEN), b.get(..BSSID_PREFIX_LEN)) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::{Credential, KeyMgmt, MacAddress, NetworkId, ScanDetail, quote_ssid};

    fn profile(id: i32, ssid: &str, mgmt: KeyMgmt) -> NetworkProfile {
        NetworkProfile {
            network_id: NetworkId::new(id),
            ssid: quote_ssid(ssid),
            allowed_key_management: BTreeSet::from([mgmt]),
            pre_shared_key: (mgmt == KeyMgmt::WpaPsk).then(|| Credential::new("\"password\"")),
            ..NetworkProfile::default()
        }
    }

    fn cache_with(id: i32, bssids: &[&str]) -> ScanDetailCache {
        let mut cache = ScanDetailCache::new(NetworkId::new(id), 192, 128);
        for (i, bssid) in bssids.iter().enumerate() {
            cache.put(ScanDetail::new(
                "x",
                MacAddress::new(bssid),
                "[WPA2-PSK-CCMP][ESS]",
                2412,
                -50,
                i64::try_from(i).unwrap(),
            ));
        }
        cache
    }

    #[test]
    fn matching_gateways_link() {
        let config = RepositoryConfig::default();
        let mut a = profile(0, "a", KeyMgmt::WpaPsk);
        let mut b = profile(1, "b", KeyMgmt::WpaPsk);
        a.default_gw_mac = Some(MacAddress::new("0f:67:ad:ef:09:34"));
        b.default_gw_mac = Some(MacAddress::new("0f:67:ad:ef:09:34"));
        assert_eq!(decide(&a, None, &b, None, &config), LinkDecision::Link);

        b.default_gw_mac = Some(MacAddress::new("0f:67:ad:ef:09:35"));
        assert_eq!(decide(&a, None, &b, None, &config), LinkDecision::Unlink);
    }

    #[test]
    fn bssid_prefix_links_without_gateway_evidence() {
        let config = RepositoryConfig::default();
        let a = profile(0, "a", KeyMgmt::WpaPsk);
        let b = profile(1, "b", KeyMgmt::WpaPsk);
        let ca = cache_with(0, &["d2:11:19:34:a5:20"]);
        let cb = cache_with(1, &["D2:11:19:34:A5:21"]);
        assert_eq!(decide(&a, Some(&ca), &b, Some(&cb), &config), LinkDecision::Link);

        let cc = cache_with(1, &["d2:11:19:34:a6:20"]);
        assert_eq!(decide(&a, Some(&ca), &b, Some(&cc), &config), LinkDecision::Unlink);
    }

    #[test]
    fn oversized_cache_disables_bssid_linking() {
        let config = RepositoryConfig::default();
        let a = profile(0, "a", KeyMgmt::WpaPsk);
        let b = profile(1, "b", KeyMgmt::WpaPsk);
        let ca = cache_with(
            0,
            &[
                "d2:11:19:34:a5:20",
                "d2:11:19:34:a5:21",
                "d2:11:19:34:a5:22",
                "d2:11:19:34:a5:23",
                "d2:11:19:34:a5:24",
                "d2:11:19:34:a5:25",
                "d2:11:19:34:a5:26",
            ],
        );
        let cb = cache_with(1, &["d2:11:19:34:a5:2f"]);
        assert_eq!(decide(&a, Some(&ca), &b, Some(&cb), &config), LinkDecision::Leave);
    }

    #[test]
    fn open_profiles_never_link() {
        let config = RepositoryConfig::default();
        let a = profile(0, "a", KeyMgmt::None);
        let b = profile(1, "b", KeyMgmt::None);
        let ca = cache_with(0, &["d2:11:19:34:a5:20"]);
        let cb = cache_with(1, &["d2:11:19:34:a5:21"]);
        assert_eq!(decide(&a, Some(&ca), &b, Some(&cb), &config), LinkDecision::Leave);
    }

    #[test]
    fn different_psks_stay_apart() {
        let config = RepositoryConfig::default();
        let mut a = profile(0, "a", KeyMgmt::WpaPsk);
        let mut b = profile(1, "b", KeyMgmt::WpaPsk);
        b.pre_shared_key = Some(Credential::new("\"other-password\""));
        a.default_gw_mac = Some(MacAddress::new("0f:67:ad:ef:09:34"));
        b.default_gw_mac = a.default_gw_mac.clone();
        assert_eq!(decide(&a, None, &b, None, &config), LinkDecision::Leave);

        let lenient = RepositoryConfig {
            only_link_same_credential_configurations: false,
            ..RepositoryConfig::default()
        };
        assert_eq!(decide(&a, None, &b, None, &lenient), LinkDecision::Link);
    }

    #[test]
    fn different_sae_passwords_stay_apart() {
        let config = RepositoryConfig::default();
        let mut a = profile(0, "a", KeyMgmt::Sae);
        let mut b = profile(1, "b", KeyMgmt::Sae);
        a.pre_shared_key = Some(Credential::new("\"password\""));
        b.pre_shared_key = Some(Credential::new("\"other-password\""));
        a.default_gw_mac = Some(MacAddress::new("0f:67:ad:ef:09:34"));
        b.default_gw_mac = a.default_gw_mac.clone();
        assert_eq!(decide(&a, None, &b, None, &config), LinkDecision::Leave);

        b.pre_shared_key = a.pre_shared_key.clone();
        assert_eq!(decide(&a, None, &b, None, &config), LinkDecision::Link);
    }
}
