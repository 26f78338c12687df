// ── Source-tag reconciler ──
//
// Moves a source's tag set towards a desired one. Planning is pure set
// algebra over the current and desired lists; applying the plan issues
// one request per tag, removals first.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wavefly_api::{Client, RetryDecision, RetryPolicy};

use crate::error::CoreError;
use crate::outcome::{Outcome, endpoint};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TagState {
    /// Add every desired tag that is missing.
    Present,
    /// Remove every desired tag that is set.
    Absent,
    /// Make the tag set exactly the desired list.
    Replace,
}

/// Tags to remove and add, in the order they will be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPlan {
    pub remove: Vec<String>,
    pub add: Vec<String>,
}

impl TagPlan {
    /// Plan the minimal set of changes for `state`.
    ///
    /// Desired order is kept and duplicates collapse; removals in
    /// `replace` follow the order of `current`.
    pub fn compute(state: TagState, current: &[String], desired: &[String]) -> Self {
        let desired = dedupe(desired);
        let missing = |tag: &&String| !current.contains(tag);

        match state {
            TagState::Present => Self {
                remove: Vec::new(),
                add: desired.iter().filter(missing).cloned().collect(),
            },
            TagState::Absent => Self {
                remove: desired
                    .iter()
                    .filter(|tag| current.contains(tag))
                    .cloned()
                    .collect(),
                add: Vec::new(),
            },
            TagState::Replace => Self {
                remove: dedupe(current)
                    .into_iter()
                    .filter(|tag| !desired.contains(tag))
                    .collect(),
                add: desired.iter().filter(missing).cloned().collect(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }
}

fn dedupe(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(tag) {
            out.push(tag.clone());
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRequest {
    pub source: String,
    /// `None` only reports the current tags.
    pub state: Option<TagState>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagsResult {
    /// Tags on the source after reconciliation.
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
}

/// Reconcile a source's tags.
///
/// Additions are retried under `add_policy`; removals get one attempt.
/// A failure part way through leaves the earlier writes in place.
pub async fn reconcile_tags(
    client: &Client,
    request: &TagRequest,
    add_policy: &RetryPolicy,
) -> Result<Outcome<TagsResult>, CoreError> {
    let source = request.source.as_str();
    let current = current_tags(client, source).await?;

    let Some(state) = request.state.filter(|_| !request.tags.is_empty()) else {
        debug!(source, "no tag state requested, reporting current tags");
        return Ok(Outcome::new(
            false,
            TagsResult {
                tags: current,
                ..TagsResult::default()
            },
        ));
    };

    let plan = TagPlan::compute(state, &current, &request.tags);
    debug!(source, %state, ?plan, "planned tag changes");

    for tag in &plan.remove {
        client
            .remove_source_tag(source, tag)
            .await
            .map_err(|err| {
                CoreError::request(
                    format!("Failed to delete the tag {tag} from the source {source}"),
                    err,
                )
            })?;
    }

    for tag in &plan.add {
        add_policy
            .run(
                || client.add_source_tag(source, tag),
                |attempt, err| {
                    debug!(source, tag, attempt, error = %err, "tag add failed");
                    if err.is_retryable() {
                        RetryDecision::Retry
                    } else {
                        RetryDecision::Abort
                    }
                },
            )
            .await
            .map_err(|err| {
                CoreError::request(
                    format!("Failed to put the tag {tag} onto the source {source}"),
                    err,
                )
            })?;
    }

    let changed = !plan.is_empty();
    if changed {
        info!(
            source,
            added = plan.add.len(),
            removed = plan.remove.len(),
            "source tags reconciled"
        );
    }

    Ok(Outcome::new(
        changed,
        TagsResult {
            tags: current_tags(client, source).await?,
            added: plan.add,
            removed: plan.remove,
        },
    ))
}

async fn current_tags(client: &Client, source: &str) -> Result<Vec<String>, CoreError> {
    client.list_source_tags(source).await.map_err(|err| {
        CoreError::request(
            format!(
                "Unable to query {} for source {source}",
                endpoint(client, &["source", source, "tag"])
            ),
            err,
        )
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn replace_removes_extras_and_adds_missing() {
        let plan = TagPlan::compute(TagState::Replace, &tags(&["a", "b"]), &tags(&["b", "c"]));
        assert_eq!(
            plan,
            TagPlan {
                remove: tags(&["a"]),
                add: tags(&["c"]),
            }
        );
    }

    #[test]
    fn present_is_idempotent() {
        let first = TagPlan::compute(TagState::Present, &tags(&["a"]), &tags(&["a", "b"]));
        assert_eq!(first.add, tags(&["b"]));

        let second = TagPlan::compute(TagState::Present, &tags(&["a", "b"]), &tags(&["a", "b"]));
        assert!(second.is_empty());
    }

    #[test]
    fn absent_skips_tags_that_are_not_set() {
        let plan = TagPlan::compute(TagState::Absent, &tags(&["a"]), &tags(&["z"]));
        assert!(plan.is_empty());

        let plan = TagPlan::compute(TagState::Absent, &tags(&["a", "z"]), &tags(&["z"]));
        assert_eq!(plan.remove, tags(&["z"]));
    }

    #[test]
    fn desired_duplicates_collapse_in_order() {
        let plan = TagPlan::compute(TagState::Present, &[], &tags(&["b", "a", "b", "c", "a"]));
        assert_eq!(plan.add, tags(&["b", "a", "c"]));
    }

    #[test]
    fn replace_with_same_set_is_a_no_op() {
        let plan = TagPlan::compute(TagState::Replace, &tags(&["x", "y"]), &tags(&["y", "x"]));
        assert!(plan.is_empty());
    }

    #[test]
    fn state_parses_lowercase_names() {
        assert_eq!(TagState::from_str("replace").ok(), Some(TagState::Replace));
        assert!(TagState::from_str("sometimes").is_err());
        assert_eq!(TagState::Absent.to_string(), "absent");
    }
}
