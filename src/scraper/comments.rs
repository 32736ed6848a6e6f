//! Comment tree extraction and flattening
//!
//! Both walks use an explicit work stack rather than recursion, so a reply
//! chain of any depth is handled in constant call-stack space. Output order is
//! pre-order: a comment, then its replies depth-first, left to right.

use crate::model::raw::{dispose, listing_children, RawComment, COMMENT_KIND};
use crate::model::Comment;
use serde_json::Value;

/// Markers the platform substitutes for deleted or moderated bodies
const REMOVAL_MARKERS: [&str; 2] = ["[deleted]", "[removed]"];

/// Builds comment trees from a raw comment forest
///
/// Only `t1` nodes are kept; "load more" stubs and anything malformed are
/// dropped together with whatever they contain. A node's `replies` is walked
/// only when it is a listing object (the empty string means no replies).
pub fn extract(forest: Vec<Value>) -> Vec<Comment> {
    // Pre-order arena: slot i holds a comment whose parent is parents[i]
    let mut slots: Vec<Option<Comment>> = Vec::new();
    let mut parents: Vec<Option<usize>> = Vec::new();

    let mut stack: Vec<(Option<usize>, Value)> =
        forest.into_iter().rev().map(|node| (None, node)).collect();

    while let Some((parent, node)) = stack.pop() {
        let Some((raw, replies)) = decode_comment(node) else {
            continue;
        };

        let index = slots.len();
        for child in listing_children(replies).into_iter().rev() {
            stack.push((Some(index), child));
        }

        slots.push(Some(Comment {
            author: raw.author,
            body: raw.body,
            score: raw.score,
            replies: Vec::new(),
        }));
        parents.push(parent);
    }

    // Children always sit after their parent, so walking backwards finishes
    // every subtree before its parent is attached
    let mut roots = Vec::new();
    for index in (0..slots.len()).rev() {
        let Some(mut comment) = slots[index].take() else {
            continue;
        };
        comment.replies.reverse();

        match parents[index] {
            Some(parent) => {
                if let Some(parent) = slots[parent].as_mut() {
                    parent.replies.push(comment);
                }
            }
            None => roots.push(comment),
        }
    }
    roots.reverse();
    roots
}

/// Decodes one `t1` node, detaching its raw `replies` so that only this
/// level is deserialized
fn decode_comment(mut node: Value) -> Option<(RawComment, Value)> {
    if node.get("kind").and_then(Value::as_str) != Some(COMMENT_KIND) {
        dispose(node);
        return None;
    }

    let mut data = node
        .get_mut("data")
        .map(Value::take)
        .unwrap_or(Value::Null);
    let replies = data
        .as_object_mut()
        .and_then(|fields| fields.remove("replies"))
        .unwrap_or(Value::Null);

    let raw = serde_json::from_value::<RawComment>(data).unwrap_or_default();
    Some((raw, replies))
}

/// Normalizes a comment body, returning `None` for empty, deleted or
/// removed content
pub fn clean_text(text: &str) -> Option<&str> {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return None;
    }

    let lowered = cleaned.to_lowercase();
    if REMOVAL_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return None;
    }

    Some(cleaned)
}

/// Flattens comment trees into their bodies in reading order
///
/// A skipped comment's replies are still visited.
pub fn flatten_text(comments: &[Comment]) -> Vec<String> {
    let mut texts = Vec::new();
    let mut stack: Vec<&Comment> = comments.iter().rev().collect();

    while let Some(comment) = stack.pop() {
        if let Some(text) = clean_text(&comment.body) {
            texts.push(text.to_string());
        }
        stack.extend(comment.replies.iter().rev());
    }

    texts
}

/// The comment strings attached to a post
///
/// Takes the first `max` top-level threads, flattens them, and keeps at most
/// `max` bodies.
pub fn top_comment_texts(comments: &[Comment], max: usize) -> Vec<String> {
    let threads = &comments[..comments.len().min(max)];
    let mut texts = flatten_text(threads);
    texts.truncate(max);
    texts
}
