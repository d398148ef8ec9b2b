use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::candidate::Candidate;

/// Orders candidates so a `BinaryHeap` (a max-heap) keeps the *worst*
/// candidate on top, letting [`TopK::push`] evict it in O(log k).
/// Higher score wins; on a tie, the name that's smaller in
/// fuzzy-case-insensitive lexicographic order wins (the determinism rule
/// asks for reverse order on the tie, which is what makes the *smaller*
/// name win here rather than the larger one).
#[derive(Debug, Clone)]
struct HeapEntry(Candidate);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the BinaryHeap's max stays the weakest candidate:
        // lower score, or (tied) the lexicographically *larger* name,
        // sorts as "greater" here.
        self.0
            .score
            .cmp(&other.0.score)
            .then_with(|| {
                other
                    .0
                    .text
                    .to_ascii_lowercase()
                    .cmp(&self.0.text.to_ascii_lowercase())
            })
            .reverse()
    }
}

/// A bounded top-*k* collector. Inserting past capacity discards the
/// current minimum; [`TopK::into_sorted_vec`] drains it into descending
/// score order.
pub struct TopK {
    capacity: usize,
    heap: BinaryHeap<HeapEntry>,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            heap: BinaryHeap::with_capacity(capacity.min(1024)),
        }
    }

    pub fn push(&mut self, candidate: Candidate) {
        if self.heap.len() < self.capacity {
            self.heap.push(HeapEntry(candidate));
            return;
        }
        if let Some(worst) = self.heap.peek() {
            if HeapEntry(candidate.clone()) < *worst {
                self.heap.pop();
                self.heap.push(HeapEntry(candidate));
            }
        }
    }

    pub fn into_sorted_vec(self) -> Vec<Candidate> {
        let mut entries: Vec<HeapEntry> = self.heap.into_vec();
        entries.sort();
        entries.into_iter().map(|e| e.0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol_str::SmolStr;
    use sqlsight_scanner::NameTags;

    fn candidate(text: &str, score: u32) -> Candidate {
        Candidate {
            text: SmolStr::new(text),
            tags: NameTags::empty(),
            score,
            objects: Vec::new(),
        }
    }

    #[test]
    fn keeps_only_top_k_by_score() {
        let mut heap = TopK::new(2);
        heap.push(candidate("a", 1));
        heap.push(candidate("b", 5));
        heap.push(candidate("c", 3));
        let out = heap.into_sorted_vec();
        assert_eq!(out.iter().map(|c| c.text.as_str()).collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn ties_break_by_smaller_name_first() {
        let mut heap = TopK::new(5);
        heap.push(candidate("zebra", 10));
        heap.push(candidate("apple", 10));
        let out = heap.into_sorted_vec();
        assert_eq!(out[0].text.as_str(), "apple");
        assert_eq!(out[1].text.as_str(), "zebra");
    }
}
