//! Tag payloads attached to revisions.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Maximum length of a tag name or classification.
pub const MAX_TAG_FIELD_LEN: u64 = 64;

/// A `(name, classification)` pair as supplied with a create or edit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TagInput {
    #[validate(
        custom(function = "crate::validation::non_blank"),
        length(max = MAX_TAG_FIELD_LEN)
    )]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = MAX_TAG_FIELD_LEN))]
    pub classification: String,
}

impl TagInput {
    pub fn new(name: impl Into<String>, classification: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classification: classification.into(),
        }
    }
}

/// Trim names, collapse duplicates and sort by name.
///
/// A repeated name keeps the classification of its last occurrence, matching
/// the registry's last-writer-wins rule. Tag rows are upserted in this order,
/// so concurrent writers lock them in the same sequence.
pub fn normalize_tags(tags: &[TagInput]) -> Vec<TagInput> {
    let mut out: Vec<TagInput> = Vec::with_capacity(tags.len());
    for tag in tags {
        let name = tag.name.trim();
        let classification = tag.classification.trim();
        match out.iter_mut().find(|t| t.name == name) {
            Some(existing) => existing.classification = classification.to_string(),
            None => out.push(TagInput::new(name, classification)),
        }
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}
