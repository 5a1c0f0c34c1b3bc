//! Config subcommand handlers.

use serde::Serialize;

use wlanstore_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Paths {
    config: String,
    store: String,
}

fn render_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# unrenderable config: {e}"))
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = super::config_path(global);
    let cfg = wlanstore_config::load_config_from(&config_path)?;

    let out = match args.command {
        ConfigCommand::Show => {
            output::render_single(&global.output, &cfg, render_toml, |c| {
                c.store_path().display().to_string()
            })?
        }
        ConfigCommand::Path => {
            let paths = Paths {
                config: config_path.display().to_string(),
                store: super::store_path(global, &cfg).display().to_string(),
            };
            output::render_single(
                &global.output,
                &paths,
                |p| format!("Config: {}\nStore:  {}", p.config, p.store),
                |p| p.config.clone(),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
