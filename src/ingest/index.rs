//! Run-scoped code → id indexes
//!
//! A [`CodeIndex`] caches one persisted code table (audience, language,
//! branch, material category, item type, shelf code) as a map from short
//! code to row id so row processing never goes back to the store for a
//! lookup. Indexes are built once at the start of a run and owned by it;
//! nothing here is shared across runs.

use indexmap::IndexMap;

/// In-memory mapping from a short code to its persisted integer id.
///
/// Insertion order is preserved and significant: language resolution scans
/// the index in table-definition order and the first code whose key appears
/// in the call number wins. The entry keyed by the absent code (`None`) is
/// the table's unknown/error sentinel.
#[derive(Debug, Clone, Default)]
pub struct CodeIndex {
    ids: IndexMap<String, i64>,
    unknown: Option<i64>,
}

impl CodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a code. `None` sets the sentinel entry.
    pub fn insert(&mut self, code: Option<&str>, id: i64) {
        match code {
            Some(c) => {
                self.ids.insert(c.to_string(), id);
            }
            None => self.unknown = Some(id),
        }
    }

    /// Exact lookup, no sentinel fallback.
    pub fn get(&self, code: &str) -> Option<i64> {
        self.ids.get(code).copied()
    }

    /// The id of the unknown/error sentinel entry, if the table has one.
    pub fn unknown(&self) -> Option<i64> {
        self.unknown
    }

    /// Lookup that degrades to the sentinel for absent or unrecognized codes.
    pub fn resolve(&self, code: Option<&str>) -> Option<i64> {
        match code {
            Some(c) => self.get(c).or(self.unknown),
            None => self.unknown,
        }
    }

    /// Codes in insertion (table-definition) order, sentinel excluded.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.ids.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len() + usize::from(self.unknown.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> FromIterator<(Option<&'a str>, i64)> for CodeIndex {
    fn from_iter<T: IntoIterator<Item = (Option<&'a str>, i64)>>(iter: T) -> Self {
        let mut idx = CodeIndex::new();
        for (code, id) in iter {
            idx.insert(code, id);
        }
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CodeIndex {
        CodeIndex::from_iter([(None, 1), (Some("a"), 2), (Some("j"), 3), (Some("y"), 4)])
    }

    #[test]
    fn resolve_known_code() {
        assert_eq!(sample().resolve(Some("j")), Some(3));
    }

    #[test]
    fn resolve_unknown_code_falls_back_to_sentinel() {
        assert_eq!(sample().resolve(Some("z")), Some(1));
        assert_eq!(sample().resolve(None), Some(1));
    }

    #[test]
    fn codes_keep_insertion_order() {
        let idx = sample();
        let order: Vec<&str> = idx.codes().collect();
        assert_eq!(order, vec!["a", "j", "y"]);
    }

    #[test]
    fn resolve_without_sentinel_entry() {
        let mut idx = CodeIndex::new();
        idx.insert(Some("eng"), 5);
        assert_eq!(idx.resolve(Some("spa")), None);
    }
}
