//! In-memory vector index kept sorted by id, with exact parallel top-K search.
pub mod utils;
pub mod vector;

pub use utils::config::IndexConfig;
pub use utils::errors::{DBError, Result};
pub use utils::types::{PointId, Score, Vector};
pub use vector::entry::{Entry, SearchResult};
pub use vector::index::VectorIndex;
pub use vector::metric::{CosineSimilarity, DistanceMetric, DotProduct, Euclidean};
pub use vector::query::Predicate;
