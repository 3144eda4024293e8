//! Incrementally discovered column set

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use super::row::Row;

/// Ordered set of every column name seen so far in a run.
///
/// Names are only ever added. `append` and `observe` add at the end;
/// `prepend` adds at the front and shifts the rest without reordering them.
/// There is no removal.
#[derive(Debug, Clone, Default)]
pub struct HeaderSet {
    names: IndexSet<String, FxBuildHasher>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Position of a column in the current order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.get_index_of(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Owned copy of the current order
    pub fn to_vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    fn push(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    fn push_front(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        let mut names = IndexSet::with_capacity_and_hasher(self.names.len() + 1, FxBuildHasher);
        names.insert(name.to_string());
        names.extend(self.names.drain(..));
        self.names = names;
        true
    }
}

/// Owner of the run's [`HeaderSet`]. The only thing allowed to grow it.
#[derive(Debug, Clone, Default)]
pub struct SchemaAccumulator {
    headers: HeaderSet,
}

impl SchemaAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every column of `row` not already present, in the row's order
    pub fn observe(&mut self, row: &Row) -> &HeaderSet {
        for column in row.columns() {
            self.headers.push(column);
        }
        &self.headers
    }

    /// Force a column onto the end if missing
    pub fn append(&mut self, name: &str) -> &HeaderSet {
        self.headers.push(name);
        &self.headers
    }

    /// Force a column onto the front if missing
    pub fn prepend(&mut self, name: &str) -> &HeaderSet {
        self.headers.push_front(name);
        &self.headers
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cols: &[&str]) -> Row {
        cols.iter().map(|c| (*c, "v")).collect()
    }

    #[test]
    fn test_observe_appends_in_first_seen_order() {
        let mut acc = SchemaAccumulator::new();
        acc.observe(&row(&["id", "name"]));
        acc.observe(&row(&["name", "extra", "id"]));
        assert_eq!(acc.headers().to_vec(), vec!["id", "name", "extra"]);
    }

    #[test]
    fn test_observe_never_reorders_existing_prefix() {
        let pages = [
            vec![row(&["b", "a"])],
            vec![row(&["c"]), row(&["a", "d"])],
            vec![row(&[])],
            vec![row(&["e", "b"])],
        ];
        let mut acc = SchemaAccumulator::new();
        let mut previous: Vec<String> = Vec::new();
        for page in &pages {
            for r in page {
                acc.observe(r);
            }
            let current = acc.headers().to_vec();
            assert!(current.len() >= previous.len());
            assert_eq!(&current[..previous.len()], &previous[..]);
            previous = current;
        }
        assert_eq!(previous, vec!["b", "a", "c", "d", "e"]);
    }

    #[test]
    fn test_prepend_keeps_relative_order() {
        let mut acc = SchemaAccumulator::new();
        acc.observe(&row(&["x", "y", "z"]));
        acc.prepend("key");
        assert_eq!(acc.headers().to_vec(), vec!["key", "x", "y", "z"]);

        // Already present: no move
        acc.prepend("y");
        assert_eq!(acc.headers().to_vec(), vec!["key", "x", "y", "z"]);
    }

    #[test]
    fn test_append_is_idempotent() {
        let mut acc = SchemaAccumulator::new();
        acc.append("a");
        acc.append("b");
        acc.append("a");
        assert_eq!(acc.headers().to_vec(), vec!["a", "b"]);
        assert_eq!(acc.headers().position("b"), Some(1));
    }
}
