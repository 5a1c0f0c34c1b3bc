// ── Preferred-network-offload ranking ──

use std::cmp::Ordering;

use serde::Serialize;

use crate::model::NetworkProfile;

/// One entry handed to the background-scan engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PnoNetwork {
    /// Quoted SSID.
    pub ssid: String,
    pub config_key: String,
    pub hidden: bool,
    /// Frequency hints in MHz, ascending.
    pub frequencies: Vec<u32>,
}

/// Profiles eligible for the PNO list: enabled and neither ephemeral nor
/// passpoint.
pub fn is_pno_candidate(profile: &NetworkProfile) -> bool {
    !profile.is_ephemeral_or_passpoint() && profile.selection.is_enabled()
}

pub fn is_hidden_candidate(profile: &NetworkProfile) -> bool {
    profile.hidden_ssid && !profile.is_ephemeral_or_passpoint()
}

/// Ranking shared by the PNO and hidden lists. Lower sorts first.
pub fn compare(a: &NetworkProfile, b: &NetworkProfile, recency_sorting: bool) -> Ordering {
    let recency = if recency_sorting {
        b.last_connected.cmp(&a.last_connected)
    } else {
        Ordering::Equal
    };
    recency
        .then_with(|| b.num_association.cmp(&a.num_association))
        .then_with(|| {
            b.selection
                .seen_in_last_qualified_network_selection
                .cmp(&a.selection.seen_in_last_qualified_network_selection)
        })
        .then_with(|| a.network_id.cmp(&b.network_id))
}

/// Sort profiles into ranking order.
pub fn rank<'a>(mut profiles: Vec<&'a NetworkProfile>, recency_sorting: bool) -> Vec<&'a NetworkProfile> {
    profiles.sort_by(|a, b| compare(a, b, recency_sorting));
    profiles
}
