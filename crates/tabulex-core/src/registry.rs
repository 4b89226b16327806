//! Running set of dynamic factor names discovered across a batch.

use std::collections::BTreeSet;

/// The cross-document factor registry.
///
/// Owned by the batch orchestrator and threaded by reference through
/// extraction (prompt hinting) and parsing (classification + union).
/// Names only ever accumulate within a batch; iteration is sorted so the
/// advisory prompt block is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorRegistry {
    names: BTreeSet<String>,
}

impl FactorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a registry with known factor names (e.g. from a prior batch).
    pub fn seeded<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Union a set of discovered names into the registry.
    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Factor names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Comma-joined sorted names for the extraction advisory block.
    pub fn joined(&self) -> String {
        self.names
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_is_monotonic_and_deduplicating() {
        let mut reg = FactorRegistry::new();
        reg.extend(["涉及外國人籍別", "犯罪手段"]);
        reg.extend(["犯罪手段", "再犯"]);
        assert_eq!(reg.len(), 3);
        assert!(reg.contains("涉及外國人籍別"));
        assert!(reg.contains("再犯"));
    }

    #[test]
    fn iteration_is_sorted() {
        let mut reg = FactorRegistry::new();
        reg.insert("b");
        reg.insert("a");
        reg.insert("c");
        let names: Vec<_> = reg.iter().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(reg.joined(), "a, b, c");
    }

    #[test]
    fn seeded_registry() {
        let reg = FactorRegistry::seeded(["x", "y"]);
        assert_eq!(reg.len(), 2);
        assert!(!reg.is_empty());
    }
}
