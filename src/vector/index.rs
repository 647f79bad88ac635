use std::cmp::Ordering;

use tracing::debug;

use crate::utils::config::IndexConfig;
use crate::utils::errors::{DBError, Result};
use crate::utils::types::PointId;
use crate::vector::entry::{Entry, SearchResult};
use crate::vector::metric::DistanceMetric;
use crate::vector::query::{Predicate, QueryContext};

/// Entries kept in strictly increasing id order, searched exhaustively under metric `D`.
///
/// Every operation relies on the sort order. [`VectorIndex::new`] trusts its input, so bulk
/// loads must be pre-sorted; [`VectorIndex::try_new`] and [`VectorIndex::from_unsorted`] check
/// or establish the order instead.
///
/// Queries borrow the index immutably and mutations need `&mut self`, so results can never
/// observe a concurrent upsert or delete.
#[derive(Debug, Clone)]
pub struct VectorIndex<M, D> {
    entries: Vec<Entry<M>>,
    metric: D,
    config: IndexConfig,
}

impl<M, D: DistanceMetric> VectorIndex<M, D> {
    /// Adopts `entries` as-is. They MUST already be sorted by id with no duplicates.
    pub fn new(metric: D, entries: Vec<Entry<M>>) -> Self {
        Self::with_config(metric, entries, IndexConfig::default())
    }

    /// A `parallel_threshold` of 0 is raised to 1; use [`try_with_config`](Self::try_with_config)
    /// to reject it instead.
    pub fn with_config(metric: D, entries: Vec<Entry<M>>, mut config: IndexConfig) -> Self {
        config.parallel_threshold = config.parallel_threshold.max(1);
        debug_assert!(
            find_order_violation(&entries).is_none(),
            "entries must be strictly increasing by id"
        );
        debug!(entries = entries.len(), threshold = config.parallel_threshold, "vector index constructed");
        Self {
            entries,
            metric,
            config,
        }
    }

    /// Like [`new`](Self::new), but rejects unsorted or duplicate ids and mixed dimensions.
    pub fn try_new(metric: D, entries: Vec<Entry<M>>) -> Result<Self> {
        Self::try_with_config(metric, entries, IndexConfig::default())
    }

    pub fn try_with_config(metric: D, entries: Vec<Entry<M>>, config: IndexConfig) -> Result<Self> {
        config.validate()?;
        if let Some(err) = find_order_violation(&entries) {
            return Err(err);
        }
        check_dimensions(&entries)?;
        Ok(Self::with_config(metric, entries, config))
    }

    /// Sorts `entries` by id before adopting them. Costs O(n log n) on top of [`new`](Self::new).
    pub fn from_unsorted(metric: D, mut entries: Vec<Entry<M>>) -> Result<Self> {
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(pair) = entries.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(DBError::DuplicateId(pair[0].id.clone()));
        }
        check_dimensions(&entries)?;
        Ok(Self::new(metric, entries))
    }

    fn search(&self, id: &str) -> std::result::Result<usize, usize> {
        self.entries.binary_search_by(|e| e.id.as_str().cmp(id))
    }

    pub fn get(&self, id: &str) -> Option<&Entry<M>> {
        self.search(id).ok().map(|n| &self.entries[n])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.search(id).is_ok()
    }

    /// Replaces the entry with the same id, or inserts it at its sorted position.
    pub fn upsert(&mut self, entry: Entry<M>) {
        match self.search(&entry.id) {
            Ok(n) => self.entries[n] = entry,
            Err(n) => self.entries.insert(n, entry),
        }
    }

    /// [`upsert`](Self::upsert) that refuses vectors whose length differs from the index's.
    pub fn try_upsert(&mut self, entry: Entry<M>) -> Result<()> {
        self.check_vector(&entry.vector)?;
        self.upsert(entry);
        Ok(())
    }

    /// Removes the entry with this id, if any. Returns it.
    pub fn delete(&mut self, id: &str) -> Option<Entry<M>> {
        self.search(id).ok().map(|n| self.entries.remove(n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector length of the stored entries, taken from the first one.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|e| e.vector.len())
    }

    /// All entries in id order.
    pub fn entries(&self) -> &[Entry<M>] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry<M>> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PointId> {
        self.entries.iter().map(|e| &e.id)
    }

    pub fn metric(&self) -> &D {
        &self.metric
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn into_entries(self) -> Vec<Entry<M>> {
        self.entries
    }

    fn check_vector(&self, vector: &[f32]) -> Result<()> {
        match self.dimension() {
            Some(expected) if expected != vector.len() => Err(DBError::VectorLengthMismatch {
                expected,
                actual: vector.len(),
            }),
            _ => Ok(()),
        }
    }
}

impl<M: Sync, D: DistanceMetric> VectorIndex<M, D> {
    /// Returns at most `top_k` entries ranked best-first by the metric's polarity.
    ///
    /// Entries rejected by `predicate` are skipped without being scored.
    /// Panics if `vector` differs in length from any scored entry.
    pub fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        predicate: Option<&Predicate<'_, M>>,
    ) -> Vec<SearchResult<'_, M>> {
        debug!(entries = self.entries.len(), top_k, filtered = predicate.is_some(), "query started");
        let ctx = QueryContext {
            vector,
            top_k,
            predicate,
            metric: &self.metric,
            threshold: self.config.parallel_threshold,
        };
        let results = ctx.run(&self.entries);
        debug!(results = results.len(), "query finished");
        results
    }

    /// [`query`](Self::query) that reports a query vector of the wrong length instead of panicking.
    pub fn try_query(
        &self,
        vector: &[f32],
        top_k: usize,
        predicate: Option<&Predicate<'_, M>>,
    ) -> Result<Vec<SearchResult<'_, M>>> {
        self.check_vector(vector)?;
        Ok(self.query(vector, top_k, predicate))
    }
}

impl<'a, M, D> IntoIterator for &'a VectorIndex<M, D> {
    type Item = &'a Entry<M>;
    type IntoIter = std::slice::Iter<'a, Entry<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn find_order_violation<M>(entries: &[Entry<M>]) -> Option<DBError> {
    entries.windows(2).enumerate().find_map(|(i, w)| match w[0].id.cmp(&w[1].id) {
        Ordering::Less => None,
        Ordering::Equal => Some(DBError::DuplicateId(w[1].id.clone())),
        Ordering::Greater => Some(DBError::UnsortedEntries {
            position: i + 1,
            id: w[1].id.clone(),
        }),
    })
}

fn check_dimensions<M>(entries: &[Entry<M>]) -> Result<()> {
    let Some(first) = entries.first() else {
        return Ok(());
    };
    let expected = first.vector.len();
    match entries.iter().find(|e| e.vector.len() != expected) {
        Some(e) => Err(DBError::VectorLengthMismatch {
            expected,
            actual: e.vector.len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::metric::DotProduct;

    fn entry(id: &str) -> Entry<()> {
        Entry::new(id, vec![1.0, 0.0], ())
    }

    #[test]
    fn order_violation_reports_position() {
        let entries = vec![entry("a"), entry("c"), entry("b")];
        assert_eq!(
            find_order_violation(&entries),
            Some(DBError::UnsortedEntries { position: 2, id: "b".into() })
        );
    }

    #[test]
    fn order_violation_reports_duplicates() {
        let entries = vec![entry("a"), entry("a")];
        assert_eq!(find_order_violation(&entries), Some(DBError::DuplicateId("a".into())));
    }

    #[test]
    fn upsert_into_empty_index() {
        let mut index = VectorIndex::new(DotProduct, Vec::new());
        index.upsert(entry("m"));
        index.upsert(entry("a"));
        index.upsert(entry("z"));
        let ids: Vec<_> = index.ids().map(String::as_str).collect();
        assert_eq!(ids, vec!["a", "m", "z"]);
        assert_eq!(index.dimension(), Some(2));
    }
}
