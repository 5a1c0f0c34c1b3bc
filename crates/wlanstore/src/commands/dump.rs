//! Repository dump handler.

use std::fmt::Write as _;

use wlanstore_core::{
    Command as CoreCommand, CommandResult, Credential, NetworkProfile, ProfileService, RepositoryDump,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(dump: &RepositoryDump) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "User:           {}", dump.current_user);
    let _ = writeln!(out, "Loaded:         {}", dump.loaded);
    let _ = writeln!(out, "User store:     {}", dump.user_store_loaded);
    let _ = writeln!(out, "Next id:        {}", dump.next_network_id);
    match &dump.last_selected {
        Some(last) => {
            let _ = writeln!(out, "Last selected:  {} ({})", last.network_id, last.config_key);
        }
        None => {
            let _ = writeln!(out, "Last selected:  -");
        }
    }
    for (ssid, at) in &dump.deleted_ephemeral_ssids {
        let _ = writeln!(out, "Dismissed:      {ssid} at {at}");
    }
    let _ = writeln!(out);
    for p in &dump.profiles {
        let psk = p.pre_shared_key.as_ref().map_or("-", Credential::expose);
        let cached = dump
            .scan_cache_sizes
            .get(&p.network_id)
            .copied()
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{} {} psk={psk} mac={} status={} scans={cached}",
            p.network_id,
            p.config_key(),
            p.randomized_mac,
            p.status,
        );
    }
    out.trim_end().to_owned()
}

pub async fn handle(service: &ProfileService, global: &GlobalOpts) -> Result<(), CliError> {
    let dump = match service.execute(CoreCommand::Dump).await? {
        CommandResult::Dump(dump) => dump,
        other => return Err(CliError::Render(format!("unexpected result: {other:?}"))),
    };
    let out = output::render_single(&global.output, &*dump, detail, |d| {
        d.profiles
            .iter()
            .map(NetworkProfile::config_key)
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
