// Identifier utilities: column ids derived from labels, copy ids, row ids.

use std::time::{SystemTime, UNIX_EPOCH};

/// Derive a column id from its label: lowercase, runs of whitespace
/// collapsed to a single underscore.
///
/// Deterministic but not collision-free: distinct labels that normalize
/// identically ("A B" and "a  b") produce the same id.
pub fn sanitize_column_id(label: &str) -> String {
    let mut id = String::with_capacity(label.len());
    let mut prev_ws = false;
    for ch in label.chars() {
        if ch.is_whitespace() {
            if !prev_ws {
                id.push('_');
            }
            prev_ws = true;
        } else {
            for lower in ch.to_lowercase() {
                id.push(lower);
            }
            prev_ws = false;
        }
    }
    id
}

/// Generate an id for a duplicated column: `<base>_copy`, then
/// `<base>_copy_1`, `<base>_copy_2`, and so on; first candidate not in `existing`.
pub fn unique_copy_id(base_id: &str, existing: &[&str]) -> String {
    let mut candidate = format!("{base_id}_copy");
    let mut counter = 1u32;
    while existing.contains(&candidate.as_str()) {
        candidate = format!("{base_id}_copy_{counter}");
        counter += 1;
    }
    candidate
}

/// Numeric row-id source: seeded from wall-clock milliseconds, strictly
/// monotonic afterwards. Ids are unique per generator, not across sessions.
#[derive(Debug, Clone)]
pub struct RowIdGenerator {
    next: i64,
}

impl RowIdGenerator {
    pub fn new() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Self { next: millis }
    }

    pub fn from_seed(seed: i64) -> Self {
        Self { next: seed }
    }

    /// Next single id.
    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Reserve a contiguous block of `count` ids for a batch (import paths).
    pub fn reserve(&mut self, count: usize) -> std::ops::Range<i64> {
        let start = self.next;
        self.next += count as i64;
        start..self.next
    }

    /// Ensure every id handed out from now on is greater than `floor`.
    /// Called after bulk replacement so fresh ids cannot collide with
    /// rows that arrived through import.
    pub fn advance_past(&mut self, floor: i64) {
        if self.next <= floor {
            self.next = floor + 1;
        }
    }
}

impl Default for RowIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
