mod cli;
mod commands;

use std::io::{self, IsTerminal};

use clap::Parser;
use freight_quote::logging::{init_logging, LogConfig};
use freight_quote::util::version::{version_label, APP_NAME};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::commands::{
    open_cep_client, open_store, run_antt, run_cep, run_cubage, run_drafts, run_icms, run_quote,
    run_settings, CliError,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format)
        .with_ansi(io::stderr().is_terminal());
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    debug!(version = %version_label(), "{APP_NAME} starting");

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Quote(args) => {
            let custom_root = cli.config_dir.is_some();
            let store = open_store(cli.config_dir)?;
            let cep = open_cep_client(&store, custom_root)?;
            run_quote(&args, &store, &cep).await.map(|_| ())
        }
        Command::Cep(args) => {
            let custom_root = cli.config_dir.is_some();
            let store = open_store(cli.config_dir)?;
            run_cep(&args, &open_cep_client(&store, custom_root)?).await
        }
        Command::Antt(args) => {
            let store = open_store(cli.config_dir)?;
            run_antt(&args, &store.load_pricing_table())
        }
        Command::Icms(args) => {
            let store = open_store(cli.config_dir)?;
            run_icms(&args, &store.load_pricing_table());
            Ok(())
        }
        Command::Cubage(args) => run_cubage(&args),
        Command::Settings { action } => run_settings(&action, &open_store(cli.config_dir)?),
        Command::Drafts => run_drafts(&open_store(cli.config_dir)?),
    }
}
