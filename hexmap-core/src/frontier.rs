//! Search frontier: a bucket priority queue over grid cells
//!
//! Buckets are singly linked lists threaded through the cells' own
//! `next_with_same_priority` field, so the queue itself stores only one head
//! per bucket. Priorities map to buckets modulo the capacity; the bucket
//! array grows whenever the live priority span would not fit, which keeps
//! unrelated priorities out of the same bucket.
//!
//! The scan pointer only moves forward while priorities increase, giving
//! amortized O(1) `dequeue` for monotone searches.

use crate::cell::{CellIndex, HexCell};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Initial bucket count. Large enough for one move of any terrain cost.
pub const DEFAULT_FRONTIER_CAPACITY: usize = 64;

// ============================================================================
// FRONTIER
// ============================================================================

#[derive(Clone, Debug)]
pub struct SearchFrontier {
    buckets: Vec<Option<CellIndex>>,
    count: usize,
    /// Scan pointer: no queued priority is lower
    minimum: i32,
    /// Upper bound on queued priorities
    maximum: i32,
}

impl SearchFrontier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FRONTIER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: vec![None; capacity.max(1)],
            count: 0,
            minimum: i32::MAX,
            maximum: i32::MIN,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Empty all buckets. Cost depends on capacity, not on grid size.
    pub fn clear(&mut self) {
        self.buckets.fill(None);
        self.count = 0;
        self.minimum = i32::MAX;
        self.maximum = i32::MIN;
    }

    /// Queue a cell at its current search priority
    pub(crate) fn enqueue(&mut self, cells: &mut [HexCell], cell: CellIndex) {
        let priority = cells[cell.0].search_priority();
        let low = self.minimum.min(priority);
        let high = self.maximum.max(priority);
        let span = (high as i64 - low as i64 + 1) as usize;
        if span > self.buckets.len() {
            self.grow(cells, span);
        }

        self.minimum = low;
        self.maximum = high;
        self.count += 1;
        self.push_front(cells, cell, priority);
    }

    /// Remove and return a cell with the lowest priority
    pub(crate) fn dequeue(&mut self, cells: &mut [HexCell]) -> Option<CellIndex> {
        if self.count == 0 {
            return None;
        }

        loop {
            let slot = self.slot(self.minimum);
            if let Some(head) = self.buckets[slot] {
                self.buckets[slot] = cells[head.0].search.next_with_same_priority.take();
                self.count -= 1;
                if self.count == 0 {
                    self.minimum = i32::MAX;
                    self.maximum = i32::MIN;
                }
                return Some(head);
            }
            self.minimum += 1;
        }
    }

    /// Move a queued cell whose priority changed from `old_priority`
    pub(crate) fn change(&mut self, cells: &mut [HexCell], cell: CellIndex, old_priority: i32) {
        if self.unlink(cells, cell, old_priority) {
            self.count -= 1;
        } else {
            debug_assert!(false, "cell {:?} not queued at priority {}", cell, old_priority);
        }
        self.enqueue(cells, cell);
    }

    // ========================================================================
    // BUCKET HELPERS
    // ========================================================================

    fn slot(&self, priority: i32) -> usize {
        priority.rem_euclid(self.buckets.len() as i32) as usize
    }

    fn push_front(&mut self, cells: &mut [HexCell], cell: CellIndex, priority: i32) {
        let slot = self.slot(priority);
        cells[cell.0].search.next_with_same_priority = self.buckets[slot];
        self.buckets[slot] = Some(cell);
    }

    fn unlink(&mut self, cells: &mut [HexCell], cell: CellIndex, priority: i32) -> bool {
        let slot = self.slot(priority);
        let mut current = match self.buckets[slot] {
            Some(head) if head == cell => {
                self.buckets[slot] = cells[cell.0].search.next_with_same_priority.take();
                return true;
            }
            Some(head) => head,
            None => return false,
        };

        while let Some(next) = cells[current.0].search.next_with_same_priority {
            if next == cell {
                cells[current.0].search.next_with_same_priority =
                    cells[cell.0].search.next_with_same_priority.take();
                return true;
            }
            current = next;
        }
        false
    }

    /// Re-bucket every queued cell into at least `span` buckets
    fn grow(&mut self, cells: &mut [HexCell], span: usize) {
        let mut queued = Vec::with_capacity(self.count);
        for slot in 0..self.buckets.len() {
            let mut next = self.buckets[slot].take();
            while let Some(cell) = next {
                next = cells[cell.0].search.next_with_same_priority.take();
                queued.push(cell);
            }
        }

        let capacity = span.next_power_of_two();
        tracing::trace!("Frontier grows from {} to {} buckets", self.buckets.len(), capacity);
        self.buckets = vec![None; capacity];
        for cell in queued {
            let priority = cells[cell.0].search_priority();
            self.push_front(cells, cell, priority);
        }
    }
}

impl Default for SearchFrontier {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
