use std::collections::VecDeque;

/// Fixed-capacity ring of proctoring evidence, oldest dropped first.
///
/// The outbound submission caps transmitted evidence, so captures beyond the
/// capacity must evict in O(1) instead of growing without bound.
#[derive(Debug, Clone)]
pub struct EvidenceRing<T> {
    buf: VecDeque<T>,
    cap: usize,
}

impl<T> EvidenceRing<T> {
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "evidence ring capacity must be non-zero");
        Self {
            buf: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Appends a capture, evicting the oldest entry when full.
    /// Returns the evicted entry, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.buf.len() == self.cap {
            self.buf.pop_front()
        } else {
            None
        };
        self.buf.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Insertion order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.buf.into_iter().collect()
    }
}

impl<T> Extend<T> for EvidenceRing<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
