/// The unique identifier for an entry. Entries are stored in lexicographic order of their ids.
pub type PointId = String;

/// The vector representation of an entry.
pub type Vector = Vec<f32>;

/// The score a distance metric assigns to a pair of vectors.
pub type Score = f32;
