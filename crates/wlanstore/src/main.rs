mod cli;
mod commands;
mod error;
mod output;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wlanstore_core::ProfileService;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands never open the store
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wlanstore", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = wlanstore_config::load_config_from(&commands::config_path(&cli.global))?;
            let store_path = commands::store_path(&cli.global, &cfg);
            let repository = store::open_repository(&store_path, cfg.repository);

            tracing::debug!(store = %store_path.display(), "dispatching command");
            let global = &cli.global;
            ProfileService::oneshot(repository, |service| async move {
                Ok(commands::dispatch(cmd, &service, global).await)
            })
            .await?
        }
    }
}
