use std::collections::HashMap;

use crate::core::SourceSegment;

/// Sentinel used when a referenced type's location has not been recorded.
pub const UNKNOWN: &str = "Unknown";

/// Where a type's declaration was first observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub project: String,
    pub file: String,
}

impl ResolvedLocation {
    pub fn unknown() -> Self {
        Self {
            project: UNKNOWN.to_string(),
            file: UNKNOWN.to_string(),
        }
    }
}

/// Process-scoped cache mapping a declaration segment (exact span plus
/// literal declared text) to the project/file where that declaration was
/// first observed. First write wins; entries are never evicted or
/// overwritten during a run, and nothing persists across runs.
#[derive(Debug, Default)]
pub struct LocationCache {
    entries: HashMap<SourceSegment, ResolvedLocation>,
}

impl LocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: SourceSegment, location: ResolvedLocation) {
        self.entries.entry(key).or_insert(location);
    }

    pub fn lookup(&self, key: &SourceSegment) -> Option<&ResolvedLocation> {
        self.entries.get(key)
    }

    /// Lookup with the `"Unknown"/"Unknown"` fallback for misses.
    pub fn resolve_or_unknown(&self, key: &SourceSegment) -> ResolvedLocation {
        self.lookup(key)
            .cloned()
            .unwrap_or_else(ResolvedLocation::unknown)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(line: usize) -> SourceSegment {
        SourceSegment::new(line, 1, line, 10, "Widget", "src/lib.rs")
    }

    fn loc(project: &str) -> ResolvedLocation {
        ResolvedLocation {
            project: project.to_string(),
            file: "src/lib.rs".to_string(),
        }
    }

    #[test]
    fn first_write_wins() {
        let mut cache = LocationCache::new();
        cache.record(key(1), loc("first"));
        cache.record(key(1), loc("second"));
        assert_eq!(cache.lookup(&key(1)).unwrap().project, "first");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn miss_falls_back_to_unknown() {
        let cache = LocationCache::new();
        let resolved = cache.resolve_or_unknown(&key(7));
        assert_eq!(resolved.project, UNKNOWN);
        assert_eq!(resolved.file, UNKNOWN);
    }
}
