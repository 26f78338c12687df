//! Alert command handler.

use wavefly_core::{Client, alert};

use crate::cli::{AlertArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &Client, args: AlertArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let outcome = alert::read_alert(client, &args.alert_id).await?;
    let out = output::render_result(global, &outcome, |v| output::pointer_line(v, "/alert/id"))?;
    output::print_output(&out, global.quiet);
    Ok(())
}
