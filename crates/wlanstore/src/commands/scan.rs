//! Background-scan list handlers.

use tabled::Tabled;
use wlanstore_core::{Command as CoreCommand, CommandResult, NetworkId, PnoNetwork, ProfileService};

use crate::cli::{GlobalOpts, ScanArgs, ScanCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PnoRow {
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Config key")]
    config_key: String,
    #[tabled(rename = "Hidden")]
    hidden: String,
    #[tabled(rename = "Frequencies")]
    frequencies: String,
}

impl From<&PnoNetwork> for PnoRow {
    fn from(n: &PnoNetwork) -> Self {
        Self {
            ssid: n.ssid.clone(),
            config_key: n.config_key.clone(),
            hidden: if n.hidden { "yes" } else { "no" }.into(),
            frequencies: n
                .frequencies
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Tabled)]
struct SsidRow {
    #[tabled(rename = "SSID")]
    ssid: String,
}

#[derive(Tabled)]
struct FrequencyRow {
    #[tabled(rename = "MHz")]
    frequency: u32,
}

pub async fn handle(
    service: &ProfileService,
    args: ScanArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        ScanCommand::Pno => {
            let networks = match service.execute(CoreCommand::RetrievePnoNetworkList).await? {
                CommandResult::PnoNetworks(networks) => networks,
                other => return Err(unexpected(&other)),
            };
            output::render_list(&global.output, &networks, |n| PnoRow::from(n), |n| {
                n.ssid.clone()
            })?
        }

        ScanCommand::Hidden => {
            let ssids = match service
                .execute(CoreCommand::RetrieveHiddenNetworkList)
                .await?
            {
                CommandResult::Ssids(ssids) => ssids,
                other => return Err(unexpected(&other)),
            };
            output::render_list(
                &global.output,
                &ssids,
                |s| SsidRow { ssid: s.clone() },
                Clone::clone,
            )?
        }

        ScanCommand::Channels {
            id,
            age_ms,
            current_frequency,
        } => {
            let channels = match service
                .execute(CoreCommand::FetchPartialScanChannels {
                    id: NetworkId::new(id),
                    age_ms,
                    current_frequency,
                })
                .await?
            {
                CommandResult::Channels(channels) => channels.unwrap_or_default(),
                other => return Err(unexpected(&other)),
            };
            let channels: Vec<u32> = channels.into_iter().collect();
            output::render_list(
                &global.output,
                &channels,
                |f| FrequencyRow { frequency: *f },
                ToString::to_string,
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn unexpected(result: &CommandResult) -> CliError {
    CliError::Render(format!("unexpected result: {result:?}"))
}
