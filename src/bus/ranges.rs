/*!
ranges.rs - Maintained list of non-overlapping, non-adjacent, sorted
address intervals (spec.md §3, §4.1).

Used for the Bus's write-protected regions. Represented internally as
half-open `[start, end)` pairs for simpler merge/split arithmetic; the
public API takes and returns the inclusive `[start, end]` form spec.md's
scenarios use.

The list is expected to stay small (spec.md: "single-digit intervals"),
so membership and merge are plain linear scans over a sorted `Vec`
rather than an interval tree.
*/

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u16,
    /// exclusive
    end: u32,
}

#[derive(Debug, Default, Clone)]
pub struct RangeList {
    spans: Vec<Span>,
}

impl RangeList {
    pub fn new() -> Self {
        Self { spans: Vec::new() }
    }

    pub fn contains(&self, addr: u16) -> bool {
        self.spans
            .iter()
            .any(|s| addr as u32 >= s.start as u32 && (addr as u32) < s.end)
    }

    pub fn ranges(&self) -> Vec<(u16, u16)> {
        self.spans.iter().map(|s| (s.start, (s.end - 1) as u16)).collect()
    }

    /// Add `[start, end]` (inclusive), merging with any overlapping or
    /// immediately adjacent existing span.
    pub fn add(&mut self, start: u16, end: u16) -> Result<()> {
        if start > end {
            return Err(CoreError::InvalidRange { start, end });
        }
        let new_start = start as u32;
        let new_end = end as u32 + 1;

        let mut merged_start = new_start;
        let mut merged_end = new_end;
        let mut kept = Vec::with_capacity(self.spans.len() + 1);

        for span in self.spans.drain(..) {
            let s = span.start as u32;
            let e = span.end;
            // Overlapping or adjacent (touching boundaries merge too).
            if s <= merged_end && e >= merged_start {
                merged_start = merged_start.min(s);
                merged_end = merged_end.max(e);
            } else {
                kept.push(span);
            }
        }

        kept.push(Span {
            start: merged_start as u16,
            end: merged_end,
        });
        kept.sort_by_key(|s| s.start);
        self.spans = kept;
        Ok(())
    }

    /// Remove `[start, end]` (inclusive) from the set, trimming or
    /// splitting existing spans as needed. A no-op over addresses not
    /// currently covered.
    pub fn remove(&mut self, start: u16, end: u16) -> Result<()> {
        if start > end {
            return Err(CoreError::InvalidRange { start, end });
        }
        let rm_start = start as u32;
        let rm_end = end as u32 + 1;

        let mut result = Vec::with_capacity(self.spans.len() + 1);
        for span in self.spans.drain(..) {
            let s = span.start as u32;
            let e = span.end;
            if rm_end <= s || rm_start >= e {
                // Disjoint: keep untouched.
                result.push(span);
                continue;
            }
            if rm_start > s {
                result.push(Span {
                    start: span.start,
                    end: rm_start,
                });
            }
            if rm_end < e {
                result.push(Span {
                    start: rm_end as u16,
                    end: e,
                });
            }
        }
        result.sort_by_key(|s| s.start);
        self.spans = result;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_merges_adjacent() {
        let mut rl = RangeList::new();
        rl.add(0x10, 0x1F).unwrap();
        rl.add(0x20, 0x2F).unwrap();
        assert_eq!(rl.ranges(), vec![(0x10, 0x2F)]);
    }

    #[test]
    fn add_merges_overlapping() {
        let mut rl = RangeList::new();
        rl.add(0x10, 0x20).unwrap();
        rl.add(0x18, 0x30).unwrap();
        assert_eq!(rl.ranges(), vec![(0x10, 0x30)]);
    }

    #[test]
    fn remove_splits_middle() {
        let mut rl = RangeList::new();
        rl.add(0x00, 0xFF).unwrap();
        rl.remove(0x40, 0x4F).unwrap();
        assert_eq!(rl.ranges(), vec![(0x00, 0x3F), (0x50, 0xFF)]);
    }

    #[test]
    fn remove_disjoint_is_noop() {
        let mut rl = RangeList::new();
        rl.add(0x10, 0x1F).unwrap();
        rl.remove(0x40, 0x4F).unwrap();
        assert_eq!(rl.ranges(), vec![(0x10, 0x1F)]);
    }

    #[test]
    fn remove_trims_edges() {
        let mut rl = RangeList::new();
        rl.add(0x10, 0x1F).unwrap();
        rl.remove(0x10, 0x14).unwrap();
        assert_eq!(rl.ranges(), vec![(0x15, 0x1F)]);
    }
}
