use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A site that activity records can reference by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
}

/// Id → display name lookup over a borrowed location list.
#[derive(Debug, Default)]
pub struct LocationIndex<'a> {
    names: HashMap<&'a str, &'a str>,
}

impl<'a> LocationIndex<'a> {
    pub fn new(locations: &'a [Location]) -> Self {
        LocationIndex {
            names: locations
                .iter()
                .map(|l| (l.id.as_str(), l.name.as_str()))
                .collect(),
        }
    }

    /// Display name for an optional id. Ids missing from the index fall back
    /// to the id itself; absent or blank ids get `unknown`.
    pub fn name_for(&self, id: Option<&str>, unknown: &str) -> String {
        match id.map(str::trim) {
            Some(id) if !id.is_empty() => self.names.get(id).copied().unwrap_or(id).to_string(),
            _ => unknown.to_string(),
        }
    }
}
