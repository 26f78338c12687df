//! Source command handler.

use wavefly_core::{Client, Source, SourcePayload, SourceRequest, source};

use crate::cli::{GlobalOpts, SourceArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &Client, args: SourceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let request = SourceRequest {
        name: args.name,
        tags: args.tags,
        description: args.description,
        hidden: args.hidden,
    };
    let outcome = source::ensure_source(client, &request).await?;
    let stored = outcome.result.source.as_ref();
    let out = output::render_result(global, &outcome, |_| plain_lines(&request.name, stored))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Source id (flagged when hidden), then its active tags one per line.
fn plain_lines(name: &str, source: Option<&Source>) -> Vec<String> {
    let Some(source) = source else {
        return Vec::new();
    };
    let id = source.id.as_deref().unwrap_or(name);
    let header = if source.is_hidden() {
        format!("{id} (hidden)")
    } else {
        id.to_owned()
    };
    std::iter::once(header)
        .chain(
            source
                .active_tags()
                .filter(|tag| *tag != SourcePayload::HIDDEN_TAG)
                .map(ToOwned::to_owned),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn plain_lists_id_then_active_tags() {
        let source = Source {
            id: Some("web-1".into()),
            tags: BTreeMap::from([
                ("prod".to_owned(), true),
                ("canary".to_owned(), false),
                ("hidden".to_owned(), true),
            ]),
            ..Source::default()
        };
        assert_eq!(plain_lines("web-1", Some(&source)), ["web-1 (hidden)", "prod"]);
    }

    #[test]
    fn plain_is_empty_when_source_vanished() {
        assert!(plain_lines("web-1", None).is_empty());
    }
}
