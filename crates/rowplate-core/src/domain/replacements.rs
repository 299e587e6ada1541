//! The working map of placeholder values.

use std::collections::HashMap;

use crate::domain::placeholder;

/// Zero-based row index.
pub const INDEX0_KEY: &str = "_index0";
/// One-based row index.
pub const INDEX1_KEY: &str = "_index1";
/// Prefix of per-row cell keys: `_csv0`, `_csv1`, ...
pub const CSV_KEY_PREFIX: &str = "_csv";

/// Placeholder values for one unit.
///
/// Named parameters and row keys share the map but never collide: parameter
/// names cannot start with `_`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacements {
    values: HashMap<String, String>,
}

impl Replacements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bind `_index0`/`_index1` to absolute row `row`.
    pub fn put_index(&mut self, row: usize) {
        self.insert(INDEX0_KEY, row.to_string());
        self.insert(INDEX1_KEY, (row + 1).to_string());
    }

    /// Bind `_csvN` to the cells of one row.
    ///
    /// Cell keys left over from a wider previous row are removed, so a short
    /// row leaves its missing `_csvN` placeholders unresolved.
    pub fn put_row(&mut self, cells: &[String]) {
        self.values.retain(|key, _| !key.starts_with(CSV_KEY_PREFIX));
        for (i, cell) in cells.iter().enumerate() {
            self.insert(format!("{CSV_KEY_PREFIX}{i}"), cell.clone());
        }
    }

    pub fn render(&self, text: &str) -> String {
        placeholder::replace(text, &self.values)
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.values
    }
}
