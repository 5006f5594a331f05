//! A bounded top-k/bottom-k aggregator over a caller-supplied comparator.
use std::cmp::Ordering;

/// Retains the `k` most extreme values seen so far, under a comparator
/// where `compare(a, b) == Ordering::Less` means "`a` is more extreme than
/// `b`".
///
/// Backed by an array-based binary heap keyed by the *reverse* of the
/// caller's comparator, so the least-extreme retained element -- the one a
/// new candidate must beat to be retained -- sits at the root: inspection
/// is O(1) and insertion/eviction is O(log k), instead of a full sort on
/// every `aggregate` call.
pub struct Extrema<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    k: usize,
    compare: F,
    heap: Vec<T>,
}

impl<T, F> Extrema<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    /// Retains at most `k` elements, ranked by `compare`.
    #[must_use]
    pub fn new(k: usize, compare: F) -> Self {
        Self {
            k,
            compare,
            heap: Vec::with_capacity(k.min(1024)),
        }
    }

    /// Folds `element` into the aggregator: retained while fewer than `k`
    /// elements have been seen, or while it is more extreme than the
    /// least-extreme retained element (which it then evicts). Ties do not
    /// evict -- the first-retained element keeps its slot.
    pub fn aggregate(&mut self, element: T) {
        if self.heap.len() < self.k {
            self.heap.push(element);
            self.sift_up(self.heap.len() - 1);
            return;
        }
        if self.k == 0 {
            return;
        }
        if (self.compare)(&element, &self.heap[0]) == Ordering::Less {
            self.heap[0] = element;
            self.sift_down(0);
        }
    }

    /// The retained elements, sorted from most to least extreme. Does not
    /// consume or otherwise mutate the aggregator's state.
    #[must_use]
    pub fn extreme_elements(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = self.heap.clone();
        out.sort_by(|a, b| (self.compare)(a, b));
        out
    }

    /// Resets the aggregator to empty.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// The number of elements currently retained (`<= k`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// `true` iff no elements have been retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// `heap_cmp(a, b)`: the ordering under which `self.heap` is a
    /// conventional min-heap -- i.e. the reverse of `compare`, so that the
    /// *least* extreme element (by `compare`) sorts as the minimum.
    fn heap_cmp(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(b, a)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap_cmp(&self.heap[index], &self.heap[parent]) == Ordering::Less {
                self.heap.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;
            if left < len && self.heap_cmp(&self.heap[left], &self.heap[smallest]) == Ordering::Less
            {
                smallest = left;
            }
            if right < len
                && self.heap_cmp(&self.heap[right], &self.heap[smallest]) == Ordering::Less
            {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.heap.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<T> Extrema<T, fn(&T, &T) -> Ordering>
where
    T: Ord,
{
    /// The `k` largest values seen so far, largest first.
    #[must_use]
    pub fn max(k: usize) -> Self {
        Self::new(k, |a, b| b.cmp(a))
    }

    /// The `k` smallest values seen so far, smallest first.
    #[must_use]
    pub fn min(k: usize) -> Self {
        Self::new(k, T::cmp)
    }
}
