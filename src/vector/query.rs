//! Exact top-K search over a sorted entry slice.
//!
//! The slice is split recursively at its midpoint until every partition is at or below
//! the configured threshold. Each leaf is scanned into its own [`ResultBuffer`], and sibling
//! results are merged on the way back up. The left half of every split runs as a separate
//! rayon task while the current thread takes the right half.
use itertools::Itertools;
use tracing::trace;

use crate::utils::types::Score;
use crate::vector::buffer::ResultBuffer;
use crate::vector::entry::{Entry, SearchResult};
use crate::vector::metric::{compare_scores, is_better, DistanceMetric};

/// Filter applied to each entry before it is scored. Entries it rejects are never scored.
pub type Predicate<'p, M> = dyn Fn(&Entry<M>) -> bool + Sync + 'p;

/// Split position for a partition of `len` entries. Fixed so that tie outcomes are reproducible.
pub fn split_point(len: usize) -> usize {
    len / 2
}

/// Everything a query needs besides the entries themselves.
pub struct QueryContext<'q, M, D: ?Sized> {
    pub vector: &'q [f32],
    pub top_k: usize,
    pub predicate: Option<&'q Predicate<'q, M>>,
    pub metric: &'q D,
    pub threshold: usize,
}

impl<'q, M, D> QueryContext<'q, M, D>
where
    M: Sync,
    D: DistanceMetric + ?Sized,
{
    /// Ranks `entries` against the query vector, best-first, at most `top_k` long.
    pub fn run<'a>(&self, entries: &'a [Entry<M>]) -> Vec<SearchResult<'a, M>> {
        if self.top_k == 0 || entries.is_empty() {
            return Vec::new();
        }
        // A threshold of 0 would split a single entry forever.
        if entries.len() <= self.threshold.max(1) {
            return self.scan(entries);
        }

        let half = split_point(entries.len());
        let (left, right) = entries.split_at(half);
        trace!(partition = entries.len(), left = left.len(), right = right.len(), "splitting partition");

        let (right_results, left_results) = rayon::join(|| self.run(right), || self.run(left));
        merge_ranked(left_results, right_results, self.top_k, self.metric.bigger_is_closer())
    }

    fn scan<'a>(&self, entries: &'a [Entry<M>]) -> Vec<SearchResult<'a, M>> {
        let mut buffer = ResultBuffer::new(self.top_k, self.metric.bigger_is_closer());
        for entry in entries {
            if let Some(predicate) = self.predicate {
                if !predicate(entry) {
                    continue;
                }
            }
            let score: Score = self.metric.distance(self.vector, &entry.vector);
            buffer.push(score, entry);
        }
        buffer.into_results()
    }
}

/// Merges two best-first lists into one, capped at `top_k`.
///
/// A left head is taken only when it is strictly better than the right head, so ties go right.
/// Once either side runs out the rest comes from the other.
pub fn merge_ranked<'a, M>(
    left: Vec<SearchResult<'a, M>>,
    right: Vec<SearchResult<'a, M>>,
    top_k: usize,
    bigger_is_closer: bool,
) -> Vec<SearchResult<'a, M>> {
    left.into_iter()
        .merge_by(right, |l, r| is_better(bigger_is_closer, l.score, r.score))
        .take(top_k)
        .collect()
}

/// Single-threaded full scan and stable sort. Used as ground truth for the partitioned search.
pub fn brute_force_query<'a, M, D>(
    entries: &'a [Entry<M>],
    vector: &[f32],
    top_k: usize,
    predicate: Option<&Predicate<'_, M>>,
    metric: &D,
) -> Vec<SearchResult<'a, M>>
where
    D: DistanceMetric + ?Sized,
{
    let bigger_is_closer = metric.bigger_is_closer();
    let mut scored: Vec<_> = entries
        .iter()
        .filter(|e| predicate.is_none_or(|p| p(*e)))
        .map(|entry| SearchResult {
            score: metric.distance(vector, &entry.vector),
            entry,
        })
        .collect();
    scored.sort_by(|a, b| compare_scores(bigger_is_closer, a.score, b.score));
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::metric::DotProduct;

    fn result<'a>(score: Score, entry: &'a Entry<()>) -> SearchResult<'a, ()> {
        SearchResult { score, entry }
    }

    #[test]
    fn merge_takes_right_on_ties() {
        let l = Entry::new("left", vec![], ());
        let r = Entry::new("right", vec![], ());
        let merged = merge_ranked(vec![result(1.0, &l)], vec![result(1.0, &r)], 2, true);
        let ids: Vec<_> = merged.iter().map(|m| m.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["right", "left"]);
    }

    #[test]
    fn merge_drains_remaining_side_up_to_top_k() {
        let es: Vec<_> = (0..4).map(|i| Entry::new(format!("{i}"), vec![], ())).collect();
        let left = vec![result(9.0, &es[0])];
        let right = vec![result(8.0, &es[1]), result(7.0, &es[2]), result(6.0, &es[3])];
        let merged = merge_ranked(left, right, 3, true);
        let scores: Vec<_> = merged.iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![9.0, 8.0, 7.0]);
    }

    #[test]
    fn merge_follows_polarity() {
        let es: Vec<_> = (0..4).map(|i| Entry::new(format!("{i}"), vec![], ())).collect();
        let left = vec![result(1.0, &es[0]), result(4.0, &es[1])];
        let right = vec![result(2.0, &es[2]), result(3.0, &es[3])];
        let merged = merge_ranked(left, right, 4, false);
        let scores: Vec<_> = merged.iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn split_is_at_midpoint() {
        assert_eq!(split_point(101), 50);
        assert_eq!(split_point(200), 100);
    }

    #[test]
    fn zero_threshold_still_reaches_base_case() {
        let entries: Vec<_> = (0..9)
            .map(|i| Entry::new(format!("{i}"), vec![i as f32], ()))
            .collect();
        let ctx: QueryContext<'_, (), _> = QueryContext {
            vector: &[1.0],
            top_k: 3,
            predicate: None,
            metric: &DotProduct,
            threshold: 0,
        };
        let scores: Vec<_> = ctx.run(&entries).iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![8.0, 7.0, 6.0]);
    }

    #[test]
    fn zero_top_k_skips_predicate() {
        let entries = vec![Entry::new("a", vec![1.0], ())];
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let predicate = |_: &Entry<()>| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            true
        };
        let ctx = QueryContext {
            vector: &[1.0],
            top_k: 0,
            predicate: Some(&predicate as &Predicate<'_, ()>),
            metric: &DotProduct,
            threshold: 1,
        };
        assert!(ctx.run(&entries).is_empty());
        assert_eq!(calls.load(std::sync::atomic::Ordering::Relaxed), 0);
    }

    #[test]
    fn predicate_called_once_per_entry_across_partitions() {
        let entries: Vec<_> = (0..37)
            .map(|i| Entry::new(format!("{i:03}"), vec![i as f32], ()))
            .collect();
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let predicate = |_: &Entry<()>| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            true
        };
        let ctx = QueryContext {
            vector: &[1.0],
            top_k: 5,
            predicate: Some(&predicate as &Predicate<'_, ()>),
            metric: &DotProduct,
            threshold: 4,
        };
        let results = ctx.run(&entries);
        assert_eq!(calls.load(std::sync::atomic::Ordering::Relaxed), 37);
        let scores: Vec<_> = results.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![36.0, 35.0, 34.0, 33.0, 32.0]);
    }
}
