use std::fmt;

use crate::utils::types::{PointId, Score, Vector};

/// One indexed item. The index never looks inside `metadata` except through a query predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<M> {
    pub id: PointId,
    pub vector: Vector,
    pub metadata: M,
}

impl<M> Entry<M> {
    pub fn new(id: impl Into<PointId>, vector: Vector, metadata: M) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata,
        }
    }
}

// Only the first few components are printed; embeddings run to thousands of dimensions.
const DISPLAY_COMPONENTS: usize = 3;

impl<M: fmt::Debug> fmt::Display for Entry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.vector.len().min(DISPLAY_COMPONENTS);
        write!(
            f,
            "ID={}, Metadata={:?}, Vector={:?}",
            self.id,
            self.metadata,
            &self.vector[..shown]
        )
    }
}

/// A scored hit, borrowing the entry from the index that produced it.
#[derive(Debug)]
pub struct SearchResult<'a, M> {
    pub score: Score,
    pub entry: &'a Entry<M>,
}

impl<M> Clone for SearchResult<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for SearchResult<'_, M> {}
