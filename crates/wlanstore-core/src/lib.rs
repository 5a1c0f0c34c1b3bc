// wlanstore-core: authoritative in-process repository of Wi-Fi network profiles.

pub mod command;
pub mod config;
pub mod error;
pub mod external;
pub mod linker;
pub mod mac_randomizer;
pub mod model;
pub mod pno;
pub mod repository;
pub mod scan;
pub mod selection;
pub mod service;
pub mod stream;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::requests::{NetworkUpdateResult, ProfileDraft};
pub use command::{Command, CommandResult};
pub use config::{ReasonPolicy, RepositoryConfig, SelectionPolicy};
pub use error::CoreError;
pub use external::{
    Clock, KeyStore, LastResortWatchdog, MacGenerator, OwnerPolicy, PermissionOracle,
    PersistenceGateway, SavedNetworkListener, SimIdentityProvider, StoreData, SystemClock,
    UserStoreData,
};
pub use pno::PnoNetwork;
pub use repository::{ConfigurationRepository, Dependencies, LastSelected, RepositoryDump};
pub use scan::ScanDetailCache;
pub use selection::{DisableReason, SelectionState, SelectionStatus};
pub use service::ProfileService;
pub use stream::{ProfileFilter, ProfileSnapshot, ProfileStream};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Identifiers
    MacAddress, NetworkId, Uid, UserId,
    // Profiles
    Credential, EnterpriseConfig, MacRandomizationSetting, NetworkProfile, NetworkStatus,
    // Security
    KeyMgmt, SecurityType,
    // Scans and events
    ChangeReason, ProfileChange, ScanDetail,
    // Helpers
    quote_ssid, unquote_ssid,
};
