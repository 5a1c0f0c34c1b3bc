// ── Repository tuning ──
//
// Every threshold, cache bound and feature flag the repository consults.
// The core never reads files; `wlanstore-config` layers this struct from
// disk and environment and hands it in.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::selection::DisableReason;

const MINUTE_MS: u64 = 60 * 1000;
const DAY_MS: u64 = 24 * 60 * MINUTE_MS;

/// Threshold and timeout for one disable reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonPolicy {
    pub reason: DisableReason,
    /// Failures needed before the reason takes effect.
    pub threshold: u32,
    /// How long a temporary disable lasts. `None` never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// The per-reason table driving the selection status machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    pub reasons: Vec<ReasonPolicy>,
}

impl SelectionPolicy {
    /// Look up the policy for a reason. Reasons missing from the table take
    /// effect on the first failure and never time out.
    pub fn get(&self, reason: DisableReason) -> ReasonPolicy {
        self.reasons
            .iter()
            .find(|p| p.reason == reason)
            .copied()
            .unwrap_or(ReasonPolicy {
                reason,
                threshold: 1,
                timeout_ms: None,
            })
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        let reasons = DisableReason::iter()
            .filter(|r| *r != DisableReason::Enable)
            .map(|reason| {
                let (threshold, timeout_ms) = match reason {
                    DisableReason::BadLink => (1, Some(15 * MINUTE_MS)),
                    DisableReason::AssociationRejection
                    | DisableReason::AuthenticationFailure
                    | DisableReason::DhcpFailure
                    | DisableReason::DnsFailure => (5, Some(5 * MINUTE_MS)),
                    DisableReason::NoInternetTemporary => (1, Some(10 * MINUTE_MS)),
                    DisableReason::WpsStart => (1, Some(0)),
                    DisableReason::TlsVersionMismatch => (6, None),
                    _ => (1, None),
                };
                ReasonPolicy {
                    reason,
                    threshold,
                    timeout_ms,
                }
            })
            .collect();
        Self { reasons }
    }
}

/// Tunables for a `ConfigurationRepository`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RepositoryConfig {
    pub selection_policy: SelectionPolicy,
    /// Scan cache size that triggers a trim.
    pub scan_cache_max_entries: usize,
    /// Scan cache size after a trim.
    pub scan_cache_trim_entries: usize,
    /// BSSID-prefix linking is skipped for profiles seen on more APs than this.
    pub link_max_scan_cache_entries: usize,
    /// PSK profiles only link when their keys match.
    pub only_link_same_credential_configurations: bool,
    pub max_num_active_channels_for_partial_scans: usize,
    pub pno_frequency_culling_enabled: bool,
    pub pno_recency_sorting_enabled: bool,
    pub max_pno_scan_frequency_age_ms: u64,
    pub deleted_ephemeral_expiry_ms: u64,
    pub mac_randomization_supported: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            selection_policy: SelectionPolicy::default(),
            scan_cache_max_entries: 192,
            scan_cache_trim_entries: 128,
            link_max_scan_cache_entries: 6,
            only_link_same_credential_configurations: true,
            max_num_active_channels_for_partial_scans: 6,
            pno_frequency_culling_enabled: true,
            pno_recency_sorting_enabled: false,
            max_pno_scan_frequency_age_ms: 30 * DAY_MS,
            deleted_ephemeral_expiry_ms: DAY_MS,
            mac_randomization_supported: true,
        }
    }
}
