//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod alert;
pub mod config_cmd;
pub mod event;
pub mod source;
pub mod source_tags;
pub mod util;

use wavefly_core::Client;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch an API-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    client: &Client,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Alert(args) => alert::handle(client, args, global).await,
        Command::Event(args) => event::handle(client, args, resolved, global).await,
        Command::Source(args) => source::handle(client, args, global).await,
        Command::SourceTags(args) => source_tags::handle(client, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
