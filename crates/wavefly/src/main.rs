mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

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
    let Cli {
        mut global,
        command,
    } = cli;

    match command {
        // Config commands don't need a connection; a broken config file is
        // reported by the subcommand itself.
        Command::Config(args) => {
            if let Ok(format) =
                config::load(&global).and_then(|cfg| config::output_format(&global, &cfg))
            {
                global.output = Some(format);
            }
            commands::config_cmd::handle(args, &global)
        }

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wavefly", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load(&global)?;
            global.output = Some(config::output_format(&global, &cfg)?);
            let resolved = config::resolve_connection(&global, &cfg)?;
            let client = resolved.connection.connect()?;

            tracing::debug!(command = ?cmd, endpoint = %resolved.connection.endpoint, "dispatching command");
            commands::dispatch(cmd, &client, &resolved, &global).await
        }
    }
}
