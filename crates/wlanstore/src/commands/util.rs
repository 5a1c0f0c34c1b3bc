//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use wlanstore_core::{Command, NetworkId, NetworkProfile, ProfileService};

use crate::error::CliError;

/// Open the load gate. Every handler that reads or writes profiles calls
/// this first.
pub async fn load(service: &ProfileService) -> Result<(), CliError> {
    service.execute(Command::LoadFromStore).await?;
    Ok(())
}

/// Find a profile in the published (masked) snapshot.
pub fn resolve_network(
    service: &ProfileService,
    id: NetworkId,
) -> Result<Arc<NetworkProfile>, CliError> {
    service
        .profiles_snapshot()
        .iter()
        .find(|p| p.network_id == id)
        .cloned()
        .ok_or_else(|| not_found(id))
}

pub fn not_found(id: NetworkId) -> CliError {
    CliError::NotFound {
        resource_type: "network".into(),
        identifier: id.to_string(),
        list_command: "networks list".into(),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Read a secret from the terminal without echo.
pub fn prompt_secret(prompt: &str, field: &str) -> Result<String, CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "required (pass it as a flag when stdin is not a terminal)".into(),
        });
    }
    dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}
