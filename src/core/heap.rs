// File: src/core/heap.rs

/// A payload together with the priority it is ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub priority: f64,
    pub payload: T,
}

/// An array-backed binary max-heap keyed by `f64` priority.
///
/// For every index `i > 0`, `entries[i].priority <= entries[(i - 1) / 2].priority`.
/// Equal priorities carry no secondary ordering, so the extraction order
/// among ties is unspecified.
#[derive(Debug, Clone)]
pub struct PrioritySelector<T> {
    entries: Vec<Ranked<T>>,
}

impl<T> Default for PrioritySelector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PrioritySelector<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds an entry and sifts it up. O(log n).
    ///
    /// NaN priorities break the ordering and are rejected in debug builds;
    /// callers validate ratings before they get here.
    pub fn insert(&mut self, priority: f64, payload: T) {
        debug_assert!(!priority.is_nan(), "NaN priority inserted into selector");
        self.entries.push(Ranked { priority, payload });
        let last = self.entries.len() - 1;
        sift_up(&mut self.entries, last);
    }

    /// Removes and returns the highest-priority entry, or `None` when empty.
    /// O(log n).
    pub fn extract_max(&mut self) -> Option<Ranked<T>> {
        pop_max(&mut self.entries)
    }

    /// The highest-priority entry without removing it. O(1).
    pub fn peek(&self) -> Option<&Ranked<T>> {
        self.entries.first()
    }

    /// Checks the max-heap property over the whole backing array.
    pub fn is_valid_heap(&self) -> bool {
        (1..self.entries.len())
            .all(|i| self.entries[i].priority <= self.entries[(i - 1) / 2].priority)
    }
}

impl<T: Clone> PrioritySelector<T> {
    /// The `k` highest-priority entries in descending order.
    ///
    /// Works on a copy of the backing array; `self` is never touched, so
    /// repeated calls return the same priorities and the size is unchanged.
    pub fn top_k(&self, k: usize) -> Vec<Ranked<T>> {
        let mut scratch = self.entries.clone();
        let mut out = Vec::with_capacity(k.min(scratch.len()));
        while out.len() < k {
            match pop_max(&mut scratch) {
                Some(top) => out.push(top),
                None => break,
            }
        }
        out
    }
}

impl<T> FromIterator<(f64, T)> for PrioritySelector<T> {
    fn from_iter<I: IntoIterator<Item = (f64, T)>>(iter: I) -> Self {
        let mut selector = Self::new();
        for (priority, payload) in iter {
            selector.insert(priority, payload);
        }
        selector
    }
}

fn sift_up<T>(entries: &mut [Ranked<T>], mut i: usize) {
    while i > 0 {
        let parent = (i - 1) / 2;
        if entries[i].priority <= entries[parent].priority {
            break;
        }
        entries.swap(i, parent);
        i = parent;
    }
}

fn sift_down<T>(entries: &mut [Ranked<T>], mut i: usize) {
    let len = entries.len();
    loop {
        let left = 2 * i + 1;
        let right = left + 1;
        let mut largest = i;
        if left < len && entries[left].priority > entries[largest].priority {
            largest = left;
        }
        if right < len && entries[right].priority > entries[largest].priority {
            largest = right;
        }
        if largest == i {
            break;
        }
        entries.swap(i, largest);
        i = largest;
    }
}

fn pop_max<T>(entries: &mut Vec<Ranked<T>>) -> Option<Ranked<T>> {
    if entries.is_empty() {
        return None;
    }
    let last = entries.len() - 1;
    entries.swap(0, last);
    let top = entries.pop();
    if !entries.is_empty() {
        sift_down(entries, 0);
    }
    top
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn priorities<T>(entries: &[Ranked<T>]) -> Vec<f64> {
        entries.iter().map(|e| e.priority).collect()
    }

    #[test]
    fn top_k_picks_the_largest() {
        let selector: PrioritySelector<&str> =
            [(5.0, "a"), (3.0, "b"), (5.0, "c"), (1.0, "d"), (4.0, "e")]
                .into_iter()
                .collect();

        assert_eq!(priorities(&selector.top_k(3)), vec![5.0, 5.0, 4.0]);
        assert_eq!(priorities(&selector.top_k(10)), vec![5.0, 5.0, 4.0, 3.0, 1.0]);
        assert!(selector.top_k(0).is_empty());
    }

    #[test]
    fn top_k_leaves_the_selector_alone() {
        let selector: PrioritySelector<u32> =
            [(2.0, 1), (9.0, 2), (4.0, 3)].into_iter().collect();
        let first = priorities(&selector.top_k(2));
        let second = priorities(&selector.top_k(2));
        assert_eq!(first, second);
        assert_eq!(selector.len(), 3);
        assert_eq!(selector.peek().map(|e| e.priority), Some(9.0));
    }

    #[test]
    fn extract_max_drains_in_order() {
        let mut selector = PrioritySelector::new();
        for (p, name) in [(1.5, "x"), (4.5, "y"), (3.0, "z")] {
            selector.insert(p, name);
        }
        assert_eq!(selector.extract_max().map(|e| e.payload), Some("y"));
        assert_eq!(selector.extract_max().map(|e| e.payload), Some("z"));
        assert_eq!(selector.extract_max().map(|e| e.payload), Some("x"));
        assert!(selector.extract_max().is_none());
        assert!(selector.is_empty());
    }

    #[test]
    fn inserts_keep_the_largest_on_top() {
        let mut selector = PrioritySelector::new();
        for (p, name) in [(2.0, "a"), (7.0, "b"), (4.0, "c"), (9.0, "d"), (1.0, "e")] {
            selector.insert(p, name);
            assert!(selector.is_valid_heap());
        }
        assert_eq!(selector.len(), 5);
        assert_eq!(selector.peek().map(|e| e.payload), Some("d"));
    }

    #[test]
    fn empty_selector_yields_none() {
        let mut selector: PrioritySelector<()> = PrioritySelector::new();
        assert!(selector.peek().is_none());
        assert!(selector.extract_max().is_none());
        assert!(selector.top_k(3).is_empty());
    }

    proptest! {
        #[test]
        fn prop_heap_invariant_holds(
            ops in prop::collection::vec(prop::option::of(0.0f64..100.0), 0..200)
        ) {
            let mut selector = PrioritySelector::new();
            for (i, op) in ops.into_iter().enumerate() {
                match op {
                    Some(p) => selector.insert(p, i),
                    None => {
                        let before = selector.peek().map(|e| e.priority);
                        let got = selector.extract_max().map(|e| e.priority);
                        prop_assert_eq!(before, got);
                    }
                }
                prop_assert!(selector.is_valid_heap());
            }
        }

        #[test]
        fn prop_top_k_matches_sorted_input(
            values in prop::collection::vec(0u32..50, 0..60),
            k in 0usize..70,
        ) {
            let selector: PrioritySelector<usize> =
                values.iter().enumerate().map(|(i, &v)| (v as f64, i)).collect();
            let mut expected: Vec<f64> = values.iter().map(|&v| v as f64).collect();
            expected.sort_by(|a, b| b.partial_cmp(a).unwrap());
            expected.truncate(k);

            prop_assert_eq!(priorities(&selector.top_k(k)), expected.clone());
            prop_assert_eq!(priorities(&selector.top_k(k)), expected);
            prop_assert_eq!(selector.len(), values.len());
        }
    }
}
