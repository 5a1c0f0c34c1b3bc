//! Network profile command handlers.

use std::sync::Arc;

use tabled::Tabled;
use tracing::debug;
use wlanstore_core::{
    Command as CoreCommand, CommandResult, MacRandomizationSetting, NetworkId, NetworkProfile,
    ProfileDraft, ProfileFilter, ProfileService, SelectionState,
};

use crate::cli::{AddArgs, GlobalOpts, ListArgs, ListFilter, NetworksArgs, NetworksCommand, SecurityArg};
use crate::error::CliError;
use crate::output;
use crate::store::LocalOperator;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Security")]
    security: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Selection")]
    selection: String,
    #[tabled(rename = "Hidden")]
    hidden: String,
    #[tabled(rename = "Kind")]
    kind: String,
}

impl From<&Arc<NetworkProfile>> for NetworkRow {
    fn from(p: &Arc<NetworkProfile>) -> Self {
        Self {
            id: p.network_id.to_string(),
            ssid: p.unquoted_ssid().to_owned(),
            security: p.security_type().to_string(),
            status: p.status.to_string(),
            selection: selection_label(p),
            hidden: if p.hidden_ssid { "yes" } else { "no" }.into(),
            kind: kind_label(p).into(),
        }
    }
}

fn selection_label(p: &NetworkProfile) -> String {
    match (p.selection.state(), p.selection.disable_reason()) {
        (SelectionState::Enabled, _) | (_, None) => "enabled".into(),
        (SelectionState::TemporarilyDisabled, Some(reason)) => format!("temp-disabled ({reason})"),
        (SelectionState::PermanentlyDisabled, Some(reason)) => format!("disabled ({reason})"),
    }
}

fn kind_label(p: &NetworkProfile) -> &'static str {
    if p.passpoint {
        "passpoint"
    } else if p.ephemeral {
        "ephemeral"
    } else if p.from_suggestion {
        "suggestion"
    } else if p.from_specifier {
        "specifier"
    } else if p.shared {
        "shared"
    } else {
        "private"
    }
}

fn optional(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

fn detail(p: &NetworkProfile) -> String {
    let psk = p.pre_shared_key.as_ref().map(|k| k.expose().to_owned());
    vec![
        format!("ID:          {}", p.network_id),
        format!("SSID:        {}", p.ssid),
        format!("Config key:  {}", p.config_key()),
        format!("Security:    {}", p.security_type()),
        format!("PSK:         {}", optional(psk)),
        format!("Hidden:      {}", p.hidden_ssid),
        format!("Kind:        {}", kind_label(p)),
        format!("Status:      {}", p.status),
        format!("Selection:   {}", selection_label(p)),
        format!("MAC setting: {}", p.mac_randomization_setting),
        format!("Random MAC:  {}", p.randomized_mac),
        format!("Creator:     {}", p.creator_uid),
        format!("Created:     {}", optional(p.creation_time)),
        format!("Updated:     {}", optional(p.update_time)),
        format!("Connects:    {}", p.num_association),
        format!("Linked:      {}", p.linked_configurations.iter().cloned().collect::<Vec<_>>().join(", ")),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    service: &ProfileService,
    args: NetworksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NetworksCommand::List(list) => {
            let profiles = list_profiles(service, &list);
            let out = output::render_list(
                &global.output,
                &profiles,
                |p| NetworkRow::from(p),
                |p| p.network_id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworksCommand::Show { id, reveal } => {
            let id = NetworkId::new(id);
            let profile = if reveal {
                match service
                    .execute(CoreCommand::ConfiguredNetworkWithPassword { id })
                    .await?
                {
                    CommandResult::Profile(Some(p)) => Arc::new(*p),
                    _ => return Err(util::not_found(id)),
                }
            } else {
                util::resolve_network(service, id)?
            };
            let out = output::render_single(
                &global.output,
                &profile,
                |p| detail(p),
                |p| p.network_id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworksCommand::Add(add) => {
            let draft = build_draft(add)?;
            let update = match service
                .execute(CoreCommand::AddOrUpdateNetwork {
                    draft: Box::new(draft),
                    caller: LocalOperator::UID,
                    package: None,
                })
                .await?
            {
                CommandResult::Update(update) => update,
                other => return Err(CliError::Render(format!("unexpected result: {other:?}"))),
            };
            debug!(?update, "profile stored");
            let verb = if update.is_new { "added" } else { "updated" };
            output::notice(global, &format!("Network {} {verb}", update.network_id));
            let out = output::render_single(
                &global.output,
                &update,
                |u| u.network_id.to_string(),
                |u| u.network_id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworksCommand::Remove { id } => {
            let id = NetworkId::new(id);
            let profile = util::resolve_network(service, id)?;
            if !util::confirm(
                &format!("Remove network '{}' ({id})?", profile.unquoted_ssid()),
                "networks remove",
                global.yes,
            )? {
                return Ok(());
            }
            service
                .execute(CoreCommand::RemoveNetwork {
                    id,
                    caller: LocalOperator::UID,
                })
                .await?;
            output::notice(global, &format!("Network {id} removed"));
            Ok(())
        }

        NetworksCommand::Enable { id, disable_others } => {
            let id = NetworkId::new(id);
            service
                .execute(CoreCommand::EnableNetwork {
                    id,
                    disable_others,
                    caller: LocalOperator::UID,
                })
                .await?;
            output::notice(global, &format!("Network {id} enabled"));
            Ok(())
        }

        NetworksCommand::Disable { id } => {
            let id = NetworkId::new(id);
            service
                .execute(CoreCommand::DisableNetwork {
                    id,
                    caller: LocalOperator::UID,
                })
                .await?;
            output::notice(global, &format!("Network {id} disabled"));
            Ok(())
        }
    }
}

fn list_profiles(service: &ProfileService, list: &ListArgs) -> Vec<Arc<NetworkProfile>> {
    let filter = match list.filter {
        ListFilter::All => ProfileFilter::All,
        ListFilter::Saved => ProfileFilter::Saved,
        ListFilter::Ephemeral => ProfileFilter::Ephemeral,
        ListFilter::Passpoint => ProfileFilter::Passpoint,
        ListFilter::Disabled => ProfileFilter::Disabled,
        ListFilter::Hidden => ProfileFilter::Hidden,
    };
    let mut profiles = service.profiles().filtered(&filter);
    if let Some(ssid) = &list.ssid {
        let by_ssid = ProfileFilter::Ssid(ssid.clone());
        profiles.retain(|p| by_ssid.matches(p));
    }
    profiles
}

fn build_draft(add: AddArgs) -> Result<ProfileDraft, CliError> {
    let secret = match (add.security, add.passphrase) {
        (SecurityArg::Open, _) => None,
        (_, Some(passphrase)) => Some(passphrase),
        (SecurityArg::Wep, None) => Some(util::prompt_secret("WEP key", "passphrase")?),
        (_, None) => Some(util::prompt_secret("Passphrase", "passphrase")?),
    };
    let secret = secret.unwrap_or_default();
    let mut draft = match add.security {
        SecurityArg::Open => ProfileDraft::open(&add.ssid),
        SecurityArg::Wep => ProfileDraft::wep(&add.ssid, &secret),
        SecurityArg::Psk => ProfileDraft::psk(&add.ssid, &secret),
        SecurityArg::Sae => ProfileDraft::sae(&add.ssid, &secret),
    };
    if add.hidden {
        draft.hidden_ssid = Some(true);
    }
    if add.no_mac_randomization {
        draft.mac_randomization_setting = Some(MacRandomizationSetting::None);
    }
    Ok(draft)
}
