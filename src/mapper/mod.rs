//! Pure conversions from each store's wire records into the unified model.
//!
//! None of these fail: absent optional fields become empty strings, zero
//! counts or `None`. Comment parents are mapped one level deep only, and a
//! non-positive parent id (the stores use `-1`) means "top-level comment".
pub mod community;
pub mod open;
pub mod shop;

/// Parent ids at or below zero mark a top-level comment.
pub(crate) fn is_root_reply(parent_id: Option<i64>) -> bool {
    !matches!(parent_id, Some(id) if id > 0)
}

/// Ids at or below zero are treated as "no such entity".
pub(crate) fn positive_id(id: Option<i64>) -> Option<String> {
    id.filter(|v| *v > 0).map(|v| v.to_string())
}
