// ── Profile service ──
//
// Single-writer actor around a `ConfigurationRepository`. One task owns
// the repository and runs commands in arrival order; readers get masked
// snapshots through a watch channel and change events through broadcast.

use std::collections::BTreeSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::error::CoreError;
use crate::model::{NetworkProfile, ProfileChange};
use crate::repository::{ConfigurationRepository, replace_hotlist};
use crate::stream::{ProfileSnapshot, ProfileStream};

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── ProfileService ──────────────────────────────────────────────────

/// Cheaply cloneable handle to the repository owner task.
#[derive(Clone)]
pub struct ProfileService {
    inner: Arc<ProfileServiceInner>,
}

struct ProfileServiceInner {
    command_tx: mpsc::Sender<CommandEnvelope>,
    snapshot_rx: watch::Receiver<ProfileSnapshot>,
    changes: broadcast::Sender<ProfileChange>,
    flaky_ssids: Arc<ArcSwap<BTreeSet<String>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ProfileService {
    /// Move `repository` into a new owner task. Must be called from within
    /// a Tokio runtime.
    pub fn start(repository: ConfigurationRepository) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot_of(&repository));
        let changes = repository.change_sender();
        let flaky_ssids = repository.flaky_ssid_hotlist();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(command_processor_task(
            repository,
            command_rx,
            snapshot_tx,
            cancel.clone(),
        ));
        debug!("profile service started");

        Self {
            inner: Arc::new(ProfileServiceInner {
                command_tx,
                snapshot_rx,
                changes,
                flaky_ssids,
                cancel,
                task_handles: Mutex::new(vec![handle]),
            }),
        }
    }

    // ── Command execution ────────────────────────────────────────────

    /// Run a command on the owner task and wait for its result.
    pub async fn execute(&self, command: Command) -> Result<CommandResult, CoreError> {
        let (tx, rx) = oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ServiceStopped)?;

        rx.await.map_err(|_| CoreError::ServiceStopped)?
    }

    /// Start a service, run `f` against it, then shut it down.
    pub async fn oneshot<F, Fut, T>(repository: ConfigurationRepository, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(ProfileService) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let service = Self::start(repository);
        let result = f(service.clone()).await;
        service.shutdown().await;
        result
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Masked snapshot of every profile, republished after each mutation.
    pub fn profiles(&self) -> ProfileStream {
        ProfileStream::new(self.inner.snapshot_rx.clone())
    }

    pub fn profiles_snapshot(&self) -> ProfileSnapshot {
        self.inner.snapshot_rx.borrow().clone()
    }

    pub fn subscribe_changes(&self) -> broadcast::Receiver<ProfileChange> {
        self.inner.changes.subscribe()
    }

    /// Replace the flaky-randomization hotlist without a round trip through
    /// the owner task.
    pub fn set_flaky_ssid_hotlist<I, S>(&self, ssids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        replace_hotlist(&self.inner.flaky_ssids, ssids);
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Stop the owner task. Pending state is flushed to the store first.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("profile service shut down");
    }
}

fn snapshot_of(repository: &ConfigurationRepository) -> ProfileSnapshot {
    Arc::new(
        repository
            .broadcast_snapshot()
            .into_iter()
            .map(Arc::new)
            .collect(),
    )
}

// ── Owner task ──────────────────────────────────────────────────────

async fn command_processor_task(
    mut repository: ConfigurationRepository,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    snapshot_tx: watch::Sender<ProfileSnapshot>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let mutation = envelope.command.is_mutation();
                let result = route_command(&mut repository, envelope.command);
                if mutation {
                    snapshot_tx.send_replace(snapshot_of(&repository));
                }
                let _ = envelope.response_tx.send(result);
            }
        }
    }

    if repository.is_loaded() {
        if let Err(e) = repository.save_to_store(false) {
            warn!(error = %e, "final store write failed");
        }
    }
    info!("profile service stopped");
}

// ── Command routing ─────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
fn route_command(
    repo: &mut ConfigurationRepository,
    command: Command,
) -> Result<CommandResult, CoreError> {
    match command {
        // ── Store lifecycle ──────────────────────────────────────────
        Command::LoadFromStore => repo.load_from_store().map(|()| CommandResult::Ok),
        Command::SaveToStore { buffered } => repo.save_to_store(buffered).map(|()| CommandResult::Ok),
        Command::HandleUserSwitch { user } => Ok(CommandResult::NetworkIds(repo.handle_user_switch(user))),
        Command::HandleUserUnlock { user } => {
            repo.handle_user_unlock(user);
            Ok(CommandResult::Ok)
        }
        Command::HandleUserStop { user } => Ok(CommandResult::NetworkIds(repo.handle_user_stop(user))),

        // ── Reads ────────────────────────────────────────────────────
        Command::ConfiguredNetworks { caller } => {
            Ok(CommandResult::Profiles(repo.configured_networks(caller)))
        }
        Command::ConfiguredNetwork { id, caller } => {
            Ok(boxed_profile(repo.configured_network(id, caller)))
        }
        Command::SavedNetworks { caller } => Ok(CommandResult::Profiles(repo.saved_networks(caller))),
        Command::ConfiguredNetworkWithPassword { id } => {
            Ok(boxed_profile(repo.configured_network_with_password(id)))
        }
        Command::ConfiguredNetworksWithPasswords => {
            Ok(CommandResult::Profiles(repo.configured_networks_with_passwords()))
        }
        Command::ConfiguredNetworkWithoutMasking { id } => {
            Ok(boxed_profile(repo.configured_network_without_masking(id)))
        }
        Command::LastSelected => Ok(CommandResult::LastSelected(repo.last_selected().cloned())),
        Command::Dump => Ok(CommandResult::Dump(Box::new(repo.dump()))),

        // ── Profile CRUD ─────────────────────────────────────────────
        Command::AddOrUpdateNetwork {
            draft,
            caller,
            package,
        } => repo
            .add_or_update_network(*draft, caller, package.as_deref())
            .map(CommandResult::Update),
        Command::RemoveNetwork { id, caller } => {
            repo.remove_network(id, caller).map(|()| CommandResult::Ok)
        }
        Command::EnableNetwork {
            id,
            disable_others,
            caller,
        } => repo
            .enable_network(id, disable_others, caller)
            .map(|()| CommandResult::Ok),
        Command::DisableNetwork { id, caller } => {
            repo.disable_network(id, caller).map(|()| CommandResult::Ok)
        }

        // ── Selection status and narrow mutators ─────────────────────
        Command::UpdateSelectionStatus { id, reason } => repo
            .update_network_selection_status(id, reason)
            .map(CommandResult::Bool),
        Command::TryEnableNetwork { id } => Ok(CommandResult::Bool(repo.try_enable_network(id))),
        Command::UpdateNotRecommended {
            id,
            not_recommended,
        } => repo
            .update_network_not_recommended(id, not_recommended)
            .map(|()| CommandResult::Ok),
        Command::UpdateLastConnectUid { id, uid } => {
            repo.update_last_connect_uid(id, uid).map(|()| CommandResult::Ok)
        }
        Command::SetConnectChoice {
            id,
            choice_config_key,
        } => repo
            .set_network_connect_choice(id, &choice_config_key)
            .map(|()| CommandResult::Ok),
        Command::ClearConnectChoice { id } => {
            repo.clear_network_connect_choice(id).map(|()| CommandResult::Ok)
        }
        Command::SetDefaultGwMacAddress { id, mac } => repo
            .set_network_default_gw_mac_address(id, mac)
            .map(|()| CommandResult::Ok),
        Command::SetRandomizedMacAddress { id, mac } => repo
            .set_network_randomized_mac_address(id, mac)
            .map(|()| CommandResult::Ok),
        Command::NetworkConnected { id } => {
            repo.update_network_after_connect(id).map(|()| CommandResult::Ok)
        }
        Command::NetworkDisconnected { id } => {
            repo.update_network_after_disconnect(id).map(|()| CommandResult::Ok)
        }
        Command::SetSeenInLastQualifiedSelection { id, seen } => repo
            .set_network_seen_in_last_qualified_selection(id, seen)
            .map(|()| CommandResult::Ok),
        Command::IsInFlakyRandomizationHotlist { id } => Ok(CommandResult::Bool(
            repo.is_in_flaky_randomization_ssid_hotlist(id),
        )),

        // ── Scan results ─────────────────────────────────────────────
        Command::SaveScanDetail { id, detail } => repo
            .save_to_scan_detail_cache_for_network(id, detail)
            .map(|()| CommandResult::Ok),
        Command::MatchScanDetail { detail } => Ok(boxed_profile(
            repo.get_configured_network_for_scan_detail_and_cache(&detail),
        )),
        Command::SetCandidateScanResult { id, scan, score } => repo
            .set_network_candidate_scan_result(id, scan, score)
            .map(|()| CommandResult::Ok),
        Command::ClearCandidateScanResult { id } => repo
            .clear_network_candidate_scan_result(id)
            .map(|()| CommandResult::Ok),
        Command::AttemptNetworkLinking { id } => {
            repo.attempt_network_linking(id).map(|()| CommandResult::Ok)
        }
        Command::FetchPartialScanChannels {
            id,
            age_ms,
            current_frequency,
        } => Ok(CommandResult::Channels(
            repo.fetch_channel_set_for_network_for_partial_scan(id, age_ms, current_frequency),
        )),
        Command::RetrievePnoNetworkList => {
            Ok(CommandResult::PnoNetworks(repo.retrieve_pno_network_list()))
        }
        Command::RetrieveHiddenNetworkList => {
            Ok(CommandResult::Ssids(repo.retrieve_hidden_network_list()))
        }

        // ── Bulk removal ─────────────────────────────────────────────
        Command::RemoveNetworksForApp { uid, package } => Ok(CommandResult::NetworkIds(
            repo.remove_networks_for_app(uid, &package),
        )),
        Command::RemoveNetworksForUser { user } => {
            Ok(CommandResult::NetworkIds(repo.remove_networks_for_user(user)))
        }
        Command::RemoveAllEphemeralOrPasspoint => Ok(CommandResult::Bool(
            repo.remove_all_ephemeral_or_passpoint_configured_networks(),
        )),
        Command::RemovePasspointNetwork { fqdn } => Ok(CommandResult::Bool(
            repo.remove_passpoint_configured_network(&fqdn),
        )),
        Command::DisableEphemeralNetwork { ssid } => Ok(CommandResult::NetworkId(
            repo.disable_ephemeral_network(&ssid),
        )),
        Command::WasEphemeralNetworkDeleted { ssid } => Ok(CommandResult::Bool(
            repo.was_ephemeral_network_deleted(&ssid),
        )),
        Command::ResetSimNetworks => {
            repo.reset_sim_networks();
            Ok(CommandResult::Ok)
        }
    }
}

fn boxed_profile(profile: Option<NetworkProfile>) -> CommandResult {
    CommandResult::Profile(profile.map(Box::new))
}
