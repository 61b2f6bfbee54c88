//! Tolerant navigation of the internal API's loosely shaped responses.
//!
//! The exact nesting of a comments response shifts between client surface
//! variants, so nothing here assumes a single fixed path. An ordered list of
//! known layouts is tried in turn and the first one yielding comment nodes
//! wins. No layout matching is a structural mismatch: the remote schema has
//! likely changed, and that is a fatal error rather than something to guess
//! around. The page-level continuation token is located the same way, but
//! its absence just means the last page was reached.

use serde_json::Value;
use tracing::debug;

use crate::error::Error;

type ItemStrategy = for<'a> fn(&'a Value) -> Option<Vec<&'a Value>>;

/// Known page layouts, in the order they should be tried.
const ITEM_STRATEGIES: &[(&str, ItemStrategy)] = &[
    ("append-action", append_action_items),
    ("reload-command", reload_command_items),
    ("legacy-section", legacy_section_items),
];

/// Locate the comment renderer nodes in a response.
///
/// # Errors
///
/// Returns [`Error::StructuralMismatch`] if no known layout yields any
/// comment node.
pub fn locate_comment_nodes(root: &Value) -> Result<Vec<&Value>, Error> {
    for (name, strategy) in ITEM_STRATEGIES {
        if let Some(items) = strategy(root) {
            let renderers: Vec<&Value> = items.iter().filter_map(|i| comment_renderer(i)).collect();
            if !renderers.is_empty() {
                debug!(layout = name, count = renderers.len(), "Located comment nodes");
                return Ok(renderers);
            }
        }
    }
    Err(Error::StructuralMismatch(
        "no known layout contains comment nodes".to_string(),
    ))
}

/// Locate the continuation token for the next page, if one exists.
#[must_use]
pub fn locate_continuation_token(root: &Value) -> Option<String> {
    for (_, strategy) in ITEM_STRATEGIES {
        if let Some(items) = strategy(root) {
            if let Some(token) = items.iter().find_map(|i| item_token(i)) {
                return Some(token);
            }
        }
    }
    legacy_token(root)
}

/// Unwrap a list entry down to its comment renderer, whichever wrapper the
/// client variant used.
fn comment_renderer(item: &Value) -> Option<&Value> {
    item.get("commentThreadRenderer")
        .and_then(|t| t.get("comment"))
        .and_then(|c| c.get("commentRenderer"))
        .or_else(|| item.get("commentRenderer"))
}

fn append_action_items(root: &Value) -> Option<Vec<&Value>> {
    received_endpoint_items(root, "appendContinuationItemsAction")
}

fn reload_command_items(root: &Value) -> Option<Vec<&Value>> {
    received_endpoint_items(root, "reloadContinuationItemsCommand")
}

fn received_endpoint_items<'a>(root: &'a Value, action: &str) -> Option<Vec<&'a Value>> {
    let endpoints = root.get("onResponseReceivedEndpoints")?.as_array()?;
    let items: Vec<&Value> = endpoints
        .iter()
        .filter_map(|e| e.get(action))
        .filter_map(|a| a.get("continuationItems"))
        .filter_map(Value::as_array)
        .flatten()
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn legacy_section_items(root: &Value) -> Option<Vec<&Value>> {
    let items = root
        .get("continuationContents")?
        .get("commentSectionContinuation")?
        .get("items")?
        .as_array()?;
    if items.is_empty() {
        None
    } else {
        Some(items.iter().collect())
    }
}

/// Token carried by a trailing continuation entry in the item list.
fn item_token(item: &Value) -> Option<String> {
    let renderer = item.get("continuationItemRenderer")?;
    renderer
        .get("continuationEndpoint")
        .or_else(|| {
            renderer
                .get("button")
                .and_then(|b| b.get("buttonRenderer"))
                .and_then(|b| b.get("command"))
        })
        .and_then(|e| e.get("continuationCommand"))
        .and_then(|c| c.get("token"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Token location used by the legacy section layout.
fn legacy_token(root: &Value) -> Option<String> {
    root.get("continuationContents")?
        .get("commentSectionContinuation")?
        .get("continuations")?
        .as_array()?
        .iter()
        .find_map(|c| {
            c.get("nextContinuationData")
                .and_then(|n| n.get("continuation"))
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        })
}
