use crate::model::{NetworkProfile, ScanDetail};

/// A sighting belongs to a profile when the SSIDs agree and the profile's
/// security class is among the classes the AP advertises.
pub fn matches_profile(profile: &NetworkProfile, scan: &ScanDetail) -> bool {
    if profile.ssid != scan.quoted_ssid() {
        return false;
    }
    scan.security_types().contains(&profile.security_type())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::{Credential, KeyMgmt, MacAddress, quote_ssid};

    fn scan(ssid: &str, caps: &str) -> ScanDetail {
        ScanDetail::new(ssid, MacAddress::new("d2:11:19:34:a5:20"), caps, 2412, -50, 0)
    }

    fn psk(ssid: &str) -> NetworkProfile {
        NetworkProfile {
            ssid: quote_ssid(ssid),
            allowed_key_management: BTreeSet::from([KeyMgmt::WpaPsk]),
            pre_shared_key: Some(Credential::new("\"password\"")),
            ..NetworkProfile::default()
        }
    }

    #[test]
    fn ssid_and_security_must_agree() {
        let home = psk("home");
        assert!(matches_profile(&home, &scan("home", "[WPA2-PSK-CCMP][ESS]")));
        assert!(!matches_profile(&home, &scan("home", "[ESS]")));
        assert!(!matches_profile(&home, &scan("work", "[WPA2-PSK-CCMP][ESS]")));
    }

    #[test]
    fn transition_ap_matches_either_class() {
        let home = psk("home");
        assert!(matches_profile(&home, &scan("home", "[RSN-PSK+SAE-CCMP][ESS]")));
    }

    #[test]
    fn open_profile_matches_open_ap() {
        let open = NetworkProfile {
            ssid: quote_ssid("cafe"),
            ..NetworkProfile::default()
        };
        assert!(matches_profile(&open, &scan("cafe", "[ESS]")));
        assert!(!matches_profile(&open, &scan("cafe", "[WEP]")));
    }
}
