// ── Profile validation ──
//
// Runs on the merged profile right before commit, so partial drafts are
// judged together with the values they keep.

use crate::error::CoreError;
use crate::model::{Credential, NetworkProfile, SecurityType};

const SSID_MAX_BYTES: usize = 32;
const PSK_ASCII_MIN: usize = 8;
const PSK_ASCII_MAX: usize = 63;
const PSK_HEX_LEN: usize = 64;
const WEP_ASCII_LENS: [usize; 3] = [5, 13, 16];
const WEP_HEX_LENS: [usize; 3] = [10, 26, 32];
const WEP_KEY_SLOTS: u8 = 4;

pub fn validate_profile(profile: &NetworkProfile) -> Result<(), CoreError> {
    validate_ssid(&profile.ssid)?;

    match profile.security_type() {
        SecurityType::Psk => {
            if let Some(psk) = &profile.pre_shared_key {
                validate_psk(psk)?;
            }
        }
        SecurityType::Sae => {
            if let Some(psk) = &profile.pre_shared_key {
                if quoted_inner(psk.expose()).is_none_or(str::is_empty) {
                    return Err(CoreError::invalid("pre_shared_key", "SAE password must be a quoted string"));
                }
            }
        }
        _ => {}
    }

    for key in profile.wep_keys.iter().flatten() {
        validate_wep_key(key)?;
    }
    if profile.wep_tx_key_index >= WEP_KEY_SLOTS {
        return Err(CoreError::invalid(
            "wep_tx_key_index",
            format!("{} is not a key slot", profile.wep_tx_key_index),
        ));
    }
    Ok(())
}

fn validate_ssid(ssid: &str) -> Result<(), CoreError> {
    let Some(inner) = quoted_inner(ssid) else {
        return Err(CoreError::invalid("ssid", "must be quoted"));
    };
    if inner.is_empty() || inner.len() > SSID_MAX_BYTES {
        return Err(CoreError::invalid(
            "ssid",
            format!("length {} outside 1..={SSID_MAX_BYTES}", inner.len()),
        ));
    }
    Ok(())
}

fn validate_psk(psk: &Credential) -> Result<(), CoreError> {
    let raw = psk.expose();
    if let Some(inner) = quoted_inner(raw) {
        if !inner.is_ascii() || !(PSK_ASCII_MIN..=PSK_ASCII_MAX).contains(&inner.len()) {
            return Err(CoreError::invalid(
                "pre_shared_key",
                format!("passphrase must be {PSK_ASCII_MIN}..={PSK_ASCII_MAX} ASCII characters"),
            ));
        }
        return Ok(());
    }
    if raw.len() == PSK_HEX_LEN && is_hex(raw) {
        return Ok(());
    }
    Err(CoreError::invalid(
        "pre_shared_key",
        "expected a quoted passphrase or 64 hex digits",
    ))
}

fn validate_wep_key(key: &Credential) -> Result<(), CoreError> {
    let raw = key.expose();
    if raw.is_empty() {
        return Ok(());
    }
    let ok = match quoted_inner(raw) {
        Some(inner) => inner.is_ascii() && WEP_ASCII_LENS.contains(&inner.len()),
        None => is_hex(raw) && WEP_HEX_LENS.contains(&raw.len()),
    };
    if ok {
        Ok(())
    } else {
        Err(CoreError::invalid("wep_keys", "WEP key has an invalid length"))
    }
}

/// Normalize a caller-supplied passphrase: 64 hex digits stay raw, anything
/// else is quoted.
pub(crate) fn normalize_passphrase(raw: &str) -> String {
    if quoted_inner(raw).is_some() || (raw.len() == PSK_HEX_LEN && is_hex(raw)) {
        raw.to_owned()
    } else {
        format!("\"{raw}\"")
    }
}

/// WEP keys: hex of a valid length stays raw, anything else is quoted.
pub(crate) fn normalize_wep_key(raw: &str) -> String {
    if raw.is_empty() || quoted_inner(raw).is_some() || (is_hex(raw) && WEP_HEX_LENS.contains(&raw.len())) {
        raw.to_owned()
    } else {
        format!("\"{raw}\"")
    }
}

fn quoted_inner(s: &str) -> Option<&str> {
    s.strip_prefix('"')?.strip_suffix('"')
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::{KeyMgmt, quote_ssid};

    fn psk_profile(psk: &str) -> NetworkProfile {
        NetworkProfile {
            ssid: quote_ssid("home"),
            allowed_key_management: BTreeSet::from([KeyMgmt::WpaPsk]),
            pre_shared_key: Some(Credential::new(psk)),
            ..NetworkProfile::default()
        }
    }

    #[test]
    fn psk_lengths() {
        assert!(validate_profile(&psk_profile("\"password\"")).is_ok());
        assert!(validate_profile(&psk_profile("\"short\"")).is_err());
        assert!(validate_profile(&psk_profile(&"a".repeat(64))).is_ok());
        assert!(validate_profile(&psk_profile(&"g".repeat(64))).is_err());
        let long = format!("\"{}\"", "x".repeat(64));
        assert!(validate_profile(&psk_profile(&long)).is_err());
    }

    #[test]
    fn ssid_bounds() {
        let mut p = psk_profile("\"password\"");
        p.ssid = quote_ssid(&"s".repeat(33));
        assert!(validate_profile(&p).is_err());
        p.ssid = "\"\"".into();
        assert!(validate_profile(&p).is_err());
    }

    #[test]
    fn wep_keys_and_index() {
        let mut p = NetworkProfile {
            ssid: quote_ssid("old"),
            ..NetworkProfile::default()
        };
        p.wep_keys[0] = Some(Credential::new("\"abcde\""));
        p.wep_keys[1] = Some(Credential::new("0123456789"));
        assert!(validate_profile(&p).is_ok());

        p.wep_keys[2] = Some(Credential::new("\"abcdef\""));
        assert!(validate_profile(&p).is_err());

        p.wep_keys[2] = None;
        p.wep_tx_key_index = 4;
        assert!(validate_profile(&p).is_err());
    }

    #[test]
    fn passphrase_normalization() {
        assert_eq!(normalize_passphrase("password"), "\"password\"");
        assert_eq!(normalize_passphrase("\"password\""), "\"password\"");
        let hex = "ab".repeat(32);
        assert_eq!(normalize_passphrase(&hex), hex);
        assert_eq!(normalize_wep_key("abcde"), "\"abcde\"");
        assert_eq!(normalize_wep_key("0123456789"), "0123456789");
    }
}
