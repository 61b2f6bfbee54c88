//! Comment record model and the per-node builder.
//!
//! Every field is extracted independently and a record is assembled only
//! when all mandatory fields are present. A node that fails a mandatory
//! field yields one [`ItemError`] and extraction moves on to the next node;
//! the page is never discarded for per-item failures.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::dates;
use crate::page::ItemError;

/// One extracted comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub comment_id: String,
    /// Permalink to the comment, derived from the video and comment ids.
    pub url: String,
    pub uploader_name: String,
    pub uploader_url: String,
    pub uploader_avatar_url: String,
    /// Comment body. Empty only for the recognized no-text variant.
    pub text: String,
    /// Human-readable upload date as the platform renders it.
    pub textual_upload_date: String,
    /// Best-effort resolution of the textual date; absent when unparsable.
    pub parsed_upload_date: Option<DateTime<Utc>>,
    pub like_count: u64,
    pub is_pinned: bool,
    pub is_hearted_by_uploader: bool,
    pub thumbnail_url: String,
}

/// Build a record from one comment renderer node.
///
/// # Errors
///
/// Returns an [`ItemError`] when any mandatory field is missing or blank.
/// Partial records are never emitted.
pub fn build_comment(
    node: &Value,
    video_id: &str,
    base_url: &str,
) -> Result<CommentRecord, ItemError> {
    let context = string_at(node, "commentId").unwrap_or_else(|| "<no id>".to_string());
    let fail = |reason: String| ItemError {
        reason,
        context: context.clone(),
    };

    let comment_id = require(string_at(node, "commentId"), "comment id").map_err(|r| fail(r))?;
    let uploader_name =
        require(text_value(node.get("authorText")), "uploader name").map_err(|r| fail(r))?;
    let uploader_url = require(author_url(node, base_url), "uploader url").map_err(|r| fail(r))?;
    let uploader_avatar_url =
        require(avatar_url(node), "uploader avatar url").map_err(|r| fail(r))?;
    let textual_upload_date = require(
        text_value(node.get("publishedTimeText")),
        "textual upload date",
    )
    .map_err(|r| fail(r))?;
    let text = comment_text(node).ok_or_else(|| fail("missing comment text".to_string()))?;

    let parsed_upload_date = dates::parse_textual_date(&textual_upload_date);
    let like_count = text_value(node.get("voteCount"))
        .as_deref()
        .and_then(parse_abbreviated_count)
        .unwrap_or(0);

    Ok(CommentRecord {
        url: format!("{base_url}/watch?v={video_id}&lc={comment_id}"),
        comment_id,
        uploader_name,
        uploader_url,
        // The platform exposes no separate comment thumbnail; the author
        // avatar fills both roles.
        thumbnail_url: uploader_avatar_url.clone(),
        uploader_avatar_url,
        text,
        textual_upload_date,
        parsed_upload_date,
        like_count,
        is_pinned: node.get("pinnedCommentBadge").is_some(),
        is_hearted_by_uploader: has_creator_heart(node),
    })
}

/// Comment body text.
///
/// A present content container with no runs is the recognized no-text
/// variant and maps to an empty string. A node with no content container at
/// all is malformed and maps to `None`.
fn comment_text(node: &Value) -> Option<String> {
    let content = node.get("contentText")?;
    Some(text_value(Some(content)).unwrap_or_default())
}

/// Read a text object in either of the platform's two renderings: a plain
/// `simpleText` or a list of `runs`.
fn text_value(value: Option<&Value>) -> Option<String> {
    let value = value?;
    if let Some(simple) = value.get("simpleText").and_then(Value::as_str) {
        return Some(simple.to_string());
    }
    let runs = value.get("runs")?.as_array()?;
    let joined: String = runs
        .iter()
        .filter_map(|r| r.get("text").and_then(Value::as_str))
        .collect();
    Some(joined)
}

fn string_at(node: &Value, field: &str) -> Option<String> {
    node.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn require(value: Option<String>, what: &str) -> Result<String, String> {
    value
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| format!("missing {what}"))
}

/// Channel URL from the author's browse endpoint.
fn author_url(node: &Value, base_url: &str) -> Option<String> {
    let browse = node.get("authorEndpoint")?.get("browseEndpoint")?;
    if let Some(path) = browse.get("canonicalBaseUrl").and_then(Value::as_str) {
        if !path.is_empty() {
            return Some(format!("{base_url}{path}"));
        }
    }
    browse
        .get("browseId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(|id| format!("{base_url}/channel/{id}"))
}

/// Highest-resolution author avatar (last entry of the thumbnail list).
fn avatar_url(node: &Value) -> Option<String> {
    node.get("authorThumbnail")?
        .get("thumbnails")?
        .as_array()?
        .last()?
        .get("url")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn has_creator_heart(node: &Value) -> bool {
    node.get("actionButtons")
        .and_then(|b| b.get("commentActionButtonsRenderer"))
        .and_then(|r| r.get("creatorHeart"))
        .is_some()
}

/// Parse an abbreviated count like "1.2K" or "3,405" into an integer.
///
/// Unparsable or absent counts are the caller's problem; this returns
/// `None` and the builder defaults to zero.
#[must_use]
pub fn parse_abbreviated_count(text: &str) -> Option<u64> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    let (number, multiplier) = match cleaned.chars().last() {
        Some('K' | 'k') => (&cleaned[..cleaned.len() - 1], 1_000_f64),
        Some('M' | 'm') => (&cleaned[..cleaned.len() - 1], 1_000_000_f64),
        Some('B' | 'b') => (&cleaned[..cleaned.len() - 1], 1_000_000_000_f64),
        _ => (cleaned.as_str(), 1_f64),
    };

    let value: f64 = number.parse().ok()?;
    if value < 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (value * multiplier).round() as u64;
    Some(count)
}
