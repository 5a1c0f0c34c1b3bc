//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod dump;
pub mod networks;
pub mod scan;
pub mod util;

use std::path::PathBuf;

use wlanstore_config::Config;
use wlanstore_core::ProfileService;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a store-bound command. The store is loaded first.
pub async fn dispatch(
    cmd: Command,
    service: &ProfileService,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::load(service).await?;
    match cmd {
        Command::Networks(args) => networks::handle(service, args, global).await,
        Command::Scan(args) => scan::handle(service, args, global).await,
        Command::Dump => dump::handle(service, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled without a profile store".into(),
        }),
    }
}

/// `--config`, or the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(wlanstore_config::config_path)
}

/// `--store`, then the config file, then the platform default.
pub fn store_path(global: &GlobalOpts, cfg: &Config) -> PathBuf {
    global.store.clone().unwrap_or_else(|| cfg.store_path())
}
