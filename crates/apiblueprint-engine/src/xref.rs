//! Cross-reference index over emitted actions.
//!
//! Pass 2 registers every rendered action here, keyed by lowercased HTTP
//! method and URI template, so external link-resolution machinery can point
//! at operations across documents. The index is append-only within a build
//! and owned by the caller, never by the transformation itself.

use serde::Serialize;
use std::collections::BTreeMap;

/// One registered action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XrefEntry {
    pub document: String,
    pub identifier: String,
    pub deprecated: bool,
}

/// Per-build mapping `method (lowercase) → uri template → entry`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    methods: BTreeMap<String, BTreeMap<String, XrefEntry>>,
}

impl CrossReference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, method: &str, uri: &str, entry: XrefEntry) {
        self.methods
            .entry(method.to_lowercase())
            .or_default()
            .insert(uri.to_string(), entry);
    }

    pub fn get(&self, method: &str, uri: &str) -> Option<&XrefEntry> {
        self.methods.get(&method.to_lowercase())?.get(uri)
    }

    pub fn len(&self) -> usize {
        self.methods.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Stable anchor id for one operation: the lowercased method and URI joined
/// with a dash, every non-alphanumeric URI character turned into a dash.
pub fn http_resource_anchor(method: &str, uri: &str) -> String {
    let uri_part: String = uri
        .chars()
        .flat_map(|ch| {
            if ch.is_alphanumeric() {
                ch.to_lowercase().collect::<Vec<_>>()
            } else {
                vec!['-']
            }
        })
        .collect();
    format!("{}-{}", method.to_lowercase(), uri_part)
}
