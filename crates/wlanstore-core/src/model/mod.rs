// ── Profile domain model ──
//
// Plain value types. Readers only ever receive copies of these, so the
// repository's caches and masking cannot be bypassed by mutation.

pub mod credential;
pub mod event;
pub mod ids;
pub mod ip;
pub mod profile;
pub mod scan;
pub mod security;

// ── Re-exports ──────────────────────────────────────────────────────

pub use credential::{Credential, MASK};
pub use event::{ChangeReason, ProfileChange};
pub use ids::{MacAddress, NetworkId, Uid, UserId};
pub use ip::{IpAssignment, IpConfiguration, ProxySettings};
pub use profile::{
    EapMethod, EnterpriseConfig, MacRandomizationSetting, NetworkProfile, NetworkStatus,
    Phase2Method, quote_ssid, unquote_ssid,
};
pub use scan::ScanDetail;
pub use security::{
    AuthAlgorithm, GroupCipher, KeyMgmt, PairwiseCipher, Protocol, SecurityType,
    scan_security_types,
};
