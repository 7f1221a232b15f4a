//! Priority queue that allows changing the priority of its entries
//! after construction.
//!
//! A binary max-heap over `n` fixed slots addressed by stable element
//! ids `0..n`. Two arrays are kept coherent: `nodes[id]` holds the
//! priority and the element's current heap position, and `heap[1..=n]`
//! (1-based, slot 0 unused) holds element ids. Both sifts update both
//! sides, so `set_priority` is `O(log n)` for any element.

/// Heap node: priority plus current position in the heap array.
#[derive(Debug, Clone)]
struct Node<T> {
    pri: T,
    pos: usize,
}

/// Max-heap keyed by `T`'s `Ord`, with O(log n) priority updates by
/// element id.
#[derive(Debug, Clone)]
pub struct MutablePriorityQueue<T> {
    nodes: Vec<Node<T>>,
    heap: Vec<usize>,
}

impl<T: Clone + Ord> MutablePriorityQueue<T> {
    /// Build a queue whose element `i` starts with priority `pri[i]`.
    pub fn from_priorities(pri: Vec<T>) -> Self {
        let n = pri.len();
        let nodes = pri
            .into_iter()
            .enumerate()
            .map(|(i, p)| Node { pri: p, pos: i + 1 })
            .collect();
        let mut queue = Self {
            nodes,
            heap: (0..=n).map(|i| i.saturating_sub(1)).collect(),
        };
        queue.heap[0] = 0; // unused slot
        for i in (1..=n / 2).rev() {
            queue.sift_down(i);
        }
        queue
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn sift_up(&mut self, mut i: usize) {
        let moving = self.heap[i];
        let moving_pri = self.nodes[moving].pri.clone();
        while i > 1 {
            let parent = i >> 1;
            if self.nodes[self.heap[parent]].pri >= moving_pri {
                break;
            }
            self.heap[i] = self.heap[parent];
            self.nodes[self.heap[i]].pos = i;
            i = parent;
        }
        self.heap[i] = moving;
        self.nodes[moving].pos = i;
    }

    /// The larger child of heap slot `i`, or 0 when `i` is a leaf.
    fn max_child(&self, i: usize) -> usize {
        let mut child = i << 1;
        if child >= self.heap.len() {
            return 0;
        }
        if child + 1 < self.heap.len()
            && self.nodes[self.heap[child]].pri < self.nodes[self.heap[child + 1]].pri
        {
            child += 1;
        }
        child
    }

    fn sift_down(&mut self, mut i: usize) {
        let moving = self.heap[i];
        let moving_pri = self.nodes[moving].pri.clone();
        loop {
            let child = self.max_child(i);
            if child == 0 || moving_pri >= self.nodes[self.heap[child]].pri {
                break;
            }
            self.heap[i] = self.heap[child];
            self.nodes[self.heap[i]].pos = i;
            i = child;
        }
        self.heap[i] = moving;
        self.nodes[moving].pos = i;
    }

    /// Set the priority of element `id`, restoring the heap property.
    pub fn set_priority(&mut self, id: usize, new_pri: T) {
        let old_pri = std::mem::replace(&mut self.nodes[id].pri, new_pri);
        let pos = self.nodes[id].pos;
        if old_pri < self.nodes[id].pri {
            self.sift_up(pos);
        } else {
            self.sift_down(pos);
        }
    }

    /// Current priority of element `id`.
    pub fn priority(&self, id: usize) -> &T {
        &self.nodes[id].pri
    }

    /// Id of the element with the greatest priority.
    pub fn top(&self) -> usize {
        self.heap[1]
    }

    /// Priority of the top element.
    pub fn top_priority(&self) -> &T {
        &self.nodes[self.heap[1]].pri
    }

    /// Check the structural invariants: position coherence between the
    /// two arrays and the heap ordering property.
    #[cfg(test)]
    fn check_consistency(&self) {
        for id in 0..self.nodes.len() {
            assert_eq!(self.heap[self.nodes[id].pos], id, "stale heap position");
        }
        for i in 1..self.heap.len() {
            for child in [2 * i, 2 * i + 1] {
                if child < self.heap.len() {
                    assert!(
                        self.nodes[self.heap[i]].pri >= self.nodes[self.heap[child]].pri,
                        "heap property violated at slot {i}"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn top_is_maximum_after_build() {
        let queue = MutablePriorityQueue::from_priorities(vec![3, 1, 4, 1, 5, 9, 2, 6]);
        assert_eq!(queue.top(), 5);
        assert_eq!(*queue.top_priority(), 9);
        queue.check_consistency();
    }

    #[test]
    fn set_priority_moves_elements_both_ways() {
        let mut queue = MutablePriorityQueue::from_priorities(vec![10, 20, 30]);
        assert_eq!(queue.top(), 2);

        queue.set_priority(0, 99); // sift up
        assert_eq!(queue.top(), 0);
        queue.check_consistency();

        queue.set_priority(0, 5); // sift down
        assert_eq!(queue.top(), 2);
        assert_eq!(*queue.priority(0), 5);
        queue.check_consistency();
    }

    #[test]
    fn single_element_queue() {
        let mut queue = MutablePriorityQueue::from_priorities(vec![7]);
        assert_eq!(queue.top(), 0);
        queue.set_priority(0, 3);
        assert_eq!(*queue.top_priority(), 3);
        queue.check_consistency();
    }

    #[test]
    fn random_updates_keep_heap_consistent() {
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 64;
        let pri: Vec<i64> = (0..n).map(|_| rng.gen_range(-1000..1000)).collect();
        let mut queue = MutablePriorityQueue::from_priorities(pri.clone());
        let mut shadow = pri;

        for _ in 0..500 {
            let id = rng.gen_range(0..n);
            let p = rng.gen_range(-1000..1000);
            queue.set_priority(id, p);
            shadow[id] = p;
            queue.check_consistency();

            let max = *shadow.iter().max().unwrap();
            assert_eq!(*queue.top_priority(), max);
            assert_eq!(shadow[queue.top()], max);
        }
    }

    #[test]
    fn priorities_are_readable_by_id() {
        let queue = MutablePriorityQueue::from_priorities(vec![8, 6, 7]);
        assert_eq!(*queue.priority(0), 8);
        assert_eq!(*queue.priority(1), 6);
        assert_eq!(*queue.priority(2), 7);
    }
}
