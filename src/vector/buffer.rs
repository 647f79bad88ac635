use crate::utils::types::Score;
use crate::vector::entry::{Entry, SearchResult};
use crate::vector::metric::is_better;

/// Bounded accumulator holding the best `capacity` results seen so far, best-first.
///
/// A candidate goes into the first slot whose held result is not strictly better than it, so it
/// lands ahead of any equal scores already held. When full, a tie with the worst held result
/// still displaces it.
pub struct ResultBuffer<'a, M> {
    results: Vec<SearchResult<'a, M>>,
    capacity: usize,
    bigger_is_closer: bool,
}

impl<'a, M> ResultBuffer<'a, M> {
    pub fn new(capacity: usize, bigger_is_closer: bool) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
            capacity,
            bigger_is_closer,
        }
    }

    /// Offers a candidate. Returns false if it was discarded.
    pub fn push(&mut self, score: Score, entry: &'a Entry<M>) -> bool {
        let pos = self
            .results
            .partition_point(|held| is_better(self.bigger_is_closer, held.score, score));

        if pos == self.capacity {
            // Full, and strictly worse than everything held.
            return false;
        }
        if self.results.len() == self.capacity {
            self.results.pop();
        }
        self.results.insert(pos, SearchResult { score, entry });
        true
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.results.len() == self.capacity
    }

    pub fn as_slice(&self) -> &[SearchResult<'a, M>] {
        &self.results
    }

    pub fn into_results(self) -> Vec<SearchResult<'a, M>> {
        self.results
    }
}
