//! Source tag command handler.

use wavefly_core::{Client, RetryPolicy, TagRequest, TagState, tags};

use crate::cli::{GlobalOpts, SourceTagsArgs, TagStateArg};
use crate::error::CliError;
use crate::output;

impl From<TagStateArg> for TagState {
    fn from(arg: TagStateArg) -> Self {
        match arg {
            TagStateArg::Present => Self::Present,
            TagStateArg::Absent => Self::Absent,
            TagStateArg::Replace => Self::Replace,
        }
    }
}

pub async fn handle(
    client: &Client,
    args: SourceTagsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let request = TagRequest {
        source: args.source,
        state: args.state.map(TagState::from),
        tags: args.tags,
    };
    let policy = RetryPolicy::tag_writes();
    tracing::debug!(backoff = ?policy.worst_case_delay(), "tag add retry budget");
    let outcome = tags::reconcile_tags(client, &request, &policy).await?;
    let out = output::render_result(global, &outcome, |v| output::string_items(v, "tags"))?;
    output::print_output(&out, global.quiet);
    Ok(())
}
