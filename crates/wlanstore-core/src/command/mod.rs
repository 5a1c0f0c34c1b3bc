// ── Command API ──
//
// Every repository operation, reads included, has a `Command` variant so
// that a `ProfileService` can serialize them through one channel.

pub mod requests;

use std::collections::BTreeSet;

use crate::error::CoreError;
use crate::model::{MacAddress, NetworkId, NetworkProfile, ScanDetail, Uid, UserId};
use crate::pno::PnoNetwork;
use crate::repository::{LastSelected, RepositoryDump};
use crate::selection::DisableReason;

pub use requests::{NetworkUpdateResult, ProfileDraft};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All operations a `ProfileService` can run against its repository.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Store lifecycle ──────────────────────────────────────────────
    LoadFromStore,
    SaveToStore {
        buffered: bool,
    },
    HandleUserSwitch {
        user: UserId,
    },
    HandleUserUnlock {
        user: UserId,
    },
    HandleUserStop {
        user: UserId,
    },

    // ── Reads ────────────────────────────────────────────────────────
    ConfiguredNetworks {
        caller: Uid,
    },
    ConfiguredNetwork {
        id: NetworkId,
        caller: Uid,
    },
    SavedNetworks {
        caller: Uid,
    },
    ConfiguredNetworkWithPassword {
        id: NetworkId,
    },
    ConfiguredNetworksWithPasswords,
    ConfiguredNetworkWithoutMasking {
        id: NetworkId,
    },
    LastSelected,
    Dump,

    // ── Profile CRUD ─────────────────────────────────────────────────
    AddOrUpdateNetwork {
        draft: Box<ProfileDraft>,
        caller: Uid,
        package: Option<String>,
    },
    RemoveNetwork {
        id: NetworkId,
        caller: Uid,
    },
    EnableNetwork {
        id: NetworkId,
        disable_others: bool,
        caller: Uid,
    },
    DisableNetwork {
        id: NetworkId,
        caller: Uid,
    },

    // ── Selection status and narrow mutators ─────────────────────────
    UpdateSelectionStatus {
        id: NetworkId,
        reason: DisableReason,
    },
    TryEnableNetwork {
        id: NetworkId,
    },
    UpdateNotRecommended {
        id: NetworkId,
        not_recommended: bool,
    },
    UpdateLastConnectUid {
        id: NetworkId,
        uid: Uid,
    },
    SetConnectChoice {
        id: NetworkId,
        choice_config_key: String,
    },
    ClearConnectChoice {
        id: NetworkId,
    },
    SetDefaultGwMacAddress {
        id: NetworkId,
        mac: MacAddress,
    },
    SetRandomizedMacAddress {
        id: NetworkId,
        mac: MacAddress,
    },
    NetworkConnected {
        id: NetworkId,
    },
    NetworkDisconnected {
        id: NetworkId,
    },
    SetSeenInLastQualifiedSelection {
        id: NetworkId,
        seen: bool,
    },
    IsInFlakyRandomizationHotlist {
        id: NetworkId,
    },

    // ── Scan results ─────────────────────────────────────────────────
    SaveScanDetail {
        id: NetworkId,
        detail: ScanDetail,
    },
    MatchScanDetail {
        detail: ScanDetail,
    },
    SetCandidateScanResult {
        id: NetworkId,
        scan: ScanDetail,
        score: i32,
    },
    ClearCandidateScanResult {
        id: NetworkId,
    },
    AttemptNetworkLinking {
        id: NetworkId,
    },
    FetchPartialScanChannels {
        id: NetworkId,
        age_ms: u64,
        current_frequency: Option<u32>,
    },
    RetrievePnoNetworkList,
    RetrieveHiddenNetworkList,

    // ── Bulk removal ─────────────────────────────────────────────────
    RemoveNetworksForApp {
        uid: Uid,
        package: String,
    },
    RemoveNetworksForUser {
        user: UserId,
    },
    RemoveAllEphemeralOrPasspoint,
    RemovePasspointNetwork {
        fqdn: String,
    },
    DisableEphemeralNetwork {
        ssid: String,
    },
    WasEphemeralNetworkDeleted {
        ssid: String,
    },
    ResetSimNetworks,
}

impl Command {
    /// Whether the command can change repository state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::ConfiguredNetworks { .. }
                | Self::ConfiguredNetwork { .. }
                | Self::SavedNetworks { .. }
                | Self::ConfiguredNetworkWithPassword { .. }
                | Self::ConfiguredNetworksWithPasswords
                | Self::ConfiguredNetworkWithoutMasking { .. }
                | Self::LastSelected
                | Self::Dump
                | Self::IsInFlakyRandomizationHotlist { .. }
                | Self::RetrievePnoNetworkList
                | Self::RetrieveHiddenNetworkList
        )
    }
}

/// Result of a command execution.
#[derive(Debug)]
pub enum CommandResult {
    Ok,
    Bool(bool),
    Update(NetworkUpdateResult),
    NetworkId(Option<NetworkId>),
    NetworkIds(Vec<NetworkId>),
    Profile(Option<Box<NetworkProfile>>),
    Profiles(Vec<NetworkProfile>),
    Channels(Option<BTreeSet<u32>>),
    PnoNetworks(Vec<PnoNetwork>),
    Ssids(Vec<String>),
    LastSelected(Option<LastSelected>),
    Dump(Box<RepositoryDump>),
}
