/*!
 * filedrop CLI - Command Line Interface
 *
 * Talks to a filedrop server over gRPC to upload, download, list and delete
 * files.
 */

use anyhow::{Context, Result};
use clap::Parser;
use filedrop::{
    cli::{Cli, Commands},
    cli_style::{print_error, print_warning},
    commands, logging,
};
use filedrop_connect::{ClientError, TransferClient};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.debug) {
        print_warning(&format!("{:#}", e));
    }

    let code = match run(cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            print_error(&format!("{:#}", e), hint(&e));
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let client = TransferClient::connect(cli.server.as_str())
            .await
            .with_context(|| format!("Cannot connect to {}", cli.server))?
            .with_chunk_size(cli.chunk_size);

        match cli.command {
            Commands::Upload { path } => {
                commands::upload(&client, &path).await?;
            }
            Commands::Download { file_id, output } => {
                commands::download(&client, &file_id, output).await?;
            }
            Commands::List => {
                commands::list(&client).await?;
            }
            Commands::Delete { file_id, yes } => {
                commands::delete(&client, file_id, yes).await?;
            }
        }

        Ok(())
    })
}

fn hint(error: &anyhow::Error) -> Option<&'static str> {
    match error.downcast_ref::<ClientError>()? {
        ClientError::Transport(_) => {
            Some("Is the server running? Set the address with --server or FILEDROP_SERVER")
        }
        ClientError::NotFound(_) => Some("Run `filedrop list` to see available identifiers"),
        _ => None,
    }
}
