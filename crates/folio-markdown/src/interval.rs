//! Sorted, disjoint range -> value maps.
//!
//! Every attribute channel of the styled buffer is one of these. Lookups are
//! binary searches; appends at the end of the map are O(1).

use std::ops::Range;

#[derive(Clone, Debug, PartialEq)]
pub struct IntervalMap<V> {
    entries: Vec<(Range<usize>, V)>,
}

impl<V> Default for IntervalMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V: Clone + PartialEq> IntervalMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to `range`, overwriting whatever was stored there.
    ///
    /// Entries that straddle the range boundaries are split. Adjacent entries
    /// with equal values are merged. Empty ranges are ignored.
    pub fn insert(&mut self, range: Range<usize>, value: V) {
        if range.start >= range.end {
            return;
        }

        // Fast path: appending past the last entry
        match self.entries.last_mut() {
            None => {
                self.entries.push((range, value));
                return;
            }
            Some((last_range, last_value)) if last_range.end <= range.start => {
                if last_range.end == range.start && *last_value == value {
                    last_range.end = range.end;
                } else {
                    self.entries.push((range, value));
                }
                return;
            }
            Some(_) => {}
        }

        // entries[first..last] overlap the new range
        let first = self.entries.partition_point(|(r, _)| r.end <= range.start);
        let last = self.entries.partition_point(|(r, _)| r.start < range.end);

        let mut replacement = Vec::with_capacity(3);
        if first < last {
            let (head_range, head_value) = &self.entries[first];
            if head_range.start < range.start {
                replacement.push((head_range.start..range.start, head_value.clone()));
            }
        }
        let tail = if first < last {
            let (tail_range, tail_value) = &self.entries[last - 1];
            (tail_range.end > range.end).then(|| (range.end..tail_range.end, tail_value.clone()))
        } else {
            None
        };
        replacement.push((range, value));
        replacement.extend(tail);

        let inserted = replacement.len();
        self.entries.splice(first..last, replacement);
        self.coalesce(first.saturating_sub(1), first + inserted + 1);
    }

    /// Merge touching equal-valued neighbours within `lo..hi`.
    fn coalesce(&mut self, lo: usize, mut hi: usize) {
        let mut i = lo;
        while i + 1 < self.entries.len() && i < hi {
            let mergeable = {
                let (a, av) = &self.entries[i];
                let (b, bv) = &self.entries[i + 1];
                a.end == b.start && av == bv
            };
            if mergeable {
                let end = self.entries[i + 1].0.end;
                self.entries[i].0.end = end;
                self.entries.remove(i + 1);
                hi = hi.saturating_sub(1);
            } else {
                i += 1;
            }
        }
    }
}

impl<V> IntervalMap<V> {
    /// Value covering `offset`, if any.
    pub fn get(&self, offset: usize) -> Option<&V> {
        self.entry_at(offset).map(|(_, v)| v)
    }

    /// The stored entry covering `offset`, with its full range.
    pub fn entry_at(&self, offset: usize) -> Option<(Range<usize>, &V)> {
        let idx = self.entries.partition_point(|(r, _)| r.end <= offset);
        let (range, value) = self.entries.get(idx)?;
        (range.start <= offset).then(|| (range.clone(), value))
    }

    /// Entries intersecting `range`, in order. Empty ranges intersect nothing.
    pub fn overlapping(&self, range: Range<usize>) -> impl Iterator<Item = (&Range<usize>, &V)> {
        let first = if range.start < range.end {
            self.entries.partition_point(|(r, _)| r.end <= range.start)
        } else {
            self.entries.len()
        };
        self.entries[first..]
            .iter()
            .take_while(move |(r, _)| r.start < range.end)
            .map(|(r, v)| (r, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Range<usize>, &V)> {
        self.entries.iter().map(|(r, v)| (r, v))
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

    fn dump(map: &IntervalMap<u32>) -> Vec<(Range<usize>, u32)> {
        map.iter().map(|(r, v)| (r.clone(), *v)).collect()
    }

    #[test]
    fn append_coalesces_equal_neighbours() {
        let mut map = IntervalMap::new();
        map.insert(0..3, 1);
        map.insert(3..5, 1);
        map.insert(5..6, 2);
        map.insert(7..9, 2);
        assert_eq!(dump(&map), vec![(0..5, 1), (5..6, 2), (7..9, 2)]);
    }

    #[test]
    fn insert_splits_straddling_entry() {
        let mut map = IntervalMap::new();
        map.insert(0..10, 1);
        map.insert(3..6, 2);
        assert_eq!(dump(&map), vec![(0..3, 1), (3..6, 2), (6..10, 1)]);
    }

    #[test]
    fn insert_replaces_several_entries() {
        let mut map = IntervalMap::new();
        map.insert(0..2, 1);
        map.insert(2..4, 2);
        map.insert(4..6, 3);
        map.insert(6..8, 4);
        map.insert(1..7, 9);
        assert_eq!(dump(&map), vec![(0..1, 1), (1..7, 9), (7..8, 4)]);
    }

    #[test]
    fn overwrite_with_same_value_merges() {
        let mut map = IntervalMap::new();
        map.insert(0..2, 1);
        map.insert(2..4, 2);
        map.insert(4..6, 1);
        map.insert(2..4, 1);
        assert_eq!(dump(&map), vec![(0..6, 1)]);
    }

    #[test]
    fn empty_range_is_ignored() {
        let mut map = IntervalMap::new();
        map.insert(4..4, 1);
        assert!(map.is_empty());
    }

    #[test]
    fn get_uses_half_open_ranges() {
        let mut map = IntervalMap::new();
        map.insert(2..4, 7);
        assert_eq!(map.get(1), None);
        assert_eq!(map.get(2), Some(&7));
        assert_eq!(map.get(3), Some(&7));
        assert_eq!(map.get(4), None);
        assert_eq!(map.entry_at(3), Some((2..4, &7)));
    }

    #[test]
    fn overlapping_returns_intersecting_entries() {
        let mut map = IntervalMap::new();
        map.insert(0..2, 1);
        map.insert(4..6, 2);
        map.insert(8..10, 3);
        let hits: Vec<u32> = map.overlapping(1..9).map(|(_, v)| *v).collect();
        assert_eq!(hits, vec![1, 2, 3]);
        let hits: Vec<u32> = map.overlapping(2..4).map(|(_, v)| *v).collect();
        assert!(hits.is_empty());
        assert_eq!(map.overlapping(5..5).count(), 0);
    }

    #[test]
    fn entries_stay_sorted_and_disjoint() {
        let mut map = IntervalMap::new();
        let ops = [(5, 9, 1), (0, 3, 2), (2, 6, 3), (8, 12, 4), (1, 11, 5), (3, 4, 6)];
        for (s, e, v) in ops {
            map.insert(s..e, v);
        }
        let entries = dump(&map);
        for pair in entries.windows(2) {
            assert!(pair[0].0.end <= pair[1].0.start);
        }
        assert_eq!(map.get(3), Some(&6));
        assert_eq!(map.get(10), Some(&5));
        assert_eq!(map.get(11), Some(&4));
    }
}
