//! Sorted-array interval index for "what is active at time t" queries.
//!
//! Planners repeatedly ask which region or segment covers a given instant.
//! Entries are kept sorted by start; a query binary-searches for the last
//! candidate start and walks back no further than the longest span length,
//! so lookups stay logarithmic for realistic inputs instead of re-scanning
//! the whole list.

use vshort_models::TimeSpan;

/// An index over `(TimeSpan, T)` entries supporting point queries.
#[derive(Debug, Clone)]
pub struct SpanIndex<T> {
    entries: Vec<(TimeSpan, T)>,
    max_duration_ms: u64,
}

impl<T> SpanIndex<T> {
    /// Build an index from entries. Order of insertion does not matter.
    pub fn new(mut entries: Vec<(TimeSpan, T)>) -> Self {
        entries.sort_by_key(|(span, _)| span.start_ms);
        let max_duration_ms = entries
            .iter()
            .map(|(span, _)| span.duration_ms())
            .max()
            .unwrap_or(0);
        Self { entries, max_duration_ms }
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries whose span contains `t_ms`, in start order.
    pub fn active_at(&self, t_ms: u64) -> Vec<&T> {
        let mut found = Vec::new();
        // First entry that could still cover t: start > t - max_duration
        let low_start = t_ms.saturating_sub(self.max_duration_ms);
        let from = self.entries.partition_point(|(span, _)| span.start_ms < low_start);
        for (span, value) in &self.entries[from..] {
            if span.start_ms > t_ms {
                break;
            }
            if span.contains(t_ms) {
                found.push(value);
            }
        }
        found
    }

    /// First entry whose span contains `t_ms`, if any.
    pub fn first_active_at(&self, t_ms: u64) -> Option<&T> {
        self.active_at(t_ms).into_iter().next()
    }

    /// All entries overlapping `window`, in start order.
    pub fn overlapping(&self, window: &TimeSpan) -> Vec<&T> {
        let mut found = Vec::new();
        let low_start = window.start_ms.saturating_sub(self.max_duration_ms);
        let from = self.entries.partition_point(|(span, _)| span.start_ms < low_start);
        for (span, value) in &self.entries[from..] {
            if span.start_ms >= window.end_ms {
                break;
            }
            if span.overlaps(window) {
                found.push(value);
            }
        }
        found
    }

    /// The sorted entries.
    pub fn entries(&self) -> &[(TimeSpan, T)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u64, end: u64) -> TimeSpan {
        TimeSpan::new(start, end).unwrap()
    }

    #[test]
    fn test_point_query() {
        let index = SpanIndex::new(vec![
            (span(0, 1000), "a"),
            (span(1200, 2500), "b"),
            (span(500, 3000), "c"),
        ]);
        assert_eq!(index.active_at(600), vec![&"a", &"c"]);
        assert_eq!(index.active_at(1100), vec![&"c"]);
        assert_eq!(index.active_at(1300), vec![&"c", &"b"]);
        assert!(index.active_at(3000).is_empty());
    }

    #[test]
    fn test_window_query() {
        let index = SpanIndex::new(vec![
            (span(0, 1000), 1),
            (span(1000, 2000), 2),
            (span(2000, 3000), 3),
        ]);
        assert_eq!(index.overlapping(&span(500, 1500)), vec![&1, &2]);
        // Touching is not overlapping
        assert_eq!(index.overlapping(&span(1000, 2000)), vec![&2]);
    }

    #[test]
    fn test_empty_index() {
        let index: SpanIndex<u8> = SpanIndex::new(Vec::new());
        assert!(index.is_empty());
        assert!(index.active_at(0).is_empty());
    }
}
