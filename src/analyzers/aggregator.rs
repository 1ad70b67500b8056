use std::collections::HashSet;

use crate::core::Extraction;

/// Accumulates extractions into an unordered collection deduplicated by full
/// structural equality (all endpoint strings plus the origin segment). Two
/// textually identical call sites in different files never merge because the
/// origin span differs; true duplicates from equivalent traversal paths do.
///
/// No iteration order is guaranteed; ordering is imposed at render time.
#[derive(Debug, Default)]
pub struct DependencyAggregator {
    entries: HashSet<Extraction>,
}

impl DependencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, extraction: Extraction) {
        self.entries.insert(extraction);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<Extraction> {
        self.entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SourceSegment, TypeDependency};

    fn dep(file: &str, line: usize) -> Extraction {
        Extraction::Dependency(TypeDependency {
            from_namespace: "app".to_string(),
            from_type: "Service".to_string(),
            to_namespace: "lib".to_string(),
            to_type: "Widget".to_string(),
            from_project: "app".to_string(),
            to_project: "lib".to_string(),
            to_file: "lib/src/lib.rs".to_string(),
            origin: SourceSegment::new(line, 1, line, 20, "w : Widget", file),
        })
    }

    #[test]
    fn adding_a_structural_duplicate_is_idempotent() {
        let mut aggregator = DependencyAggregator::new();
        aggregator.add(dep("app/src/a.rs", 3));
        aggregator.add(dep("app/src/a.rs", 3));
        assert_eq!(aggregator.len(), 1);
    }

    #[test]
    fn identical_references_at_different_sites_are_kept_apart() {
        let mut aggregator = DependencyAggregator::new();
        aggregator.add(dep("app/src/a.rs", 3));
        aggregator.add(dep("app/src/b.rs", 3));
        aggregator.add(dep("app/src/a.rs", 9));
        assert_eq!(aggregator.len(), 3);
    }
}
