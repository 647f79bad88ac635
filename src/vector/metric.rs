use std::cmp::Ordering;
use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::utils::types::Score;

/// Scores a pair of equal-length vectors and declares which direction is "closer".
///
/// Implementations must be pure: the query engine calls them from many threads at once.
/// Every comparison in the index is driven by [`bigger_is_closer`](Self::bigger_is_closer),
/// never by what a metric is called.
pub trait DistanceMetric: Send + Sync {
    /// Panics if `a` and `b` differ in length.
    fn distance(&self, a: &[f32], b: &[f32]) -> Score;

    fn bigger_is_closer(&self) -> bool;
}

impl<T: DistanceMetric + ?Sized> DistanceMetric for &T {
    fn distance(&self, a: &[f32], b: &[f32]) -> Score {
        (**self).distance(a, b)
    }

    fn bigger_is_closer(&self) -> bool {
        (**self).bigger_is_closer()
    }
}

impl<T: DistanceMetric + ?Sized> DistanceMetric for Box<T> {
    fn distance(&self, a: &[f32], b: &[f32]) -> Score {
        (**self).distance(a, b)
    }

    fn bigger_is_closer(&self) -> bool {
        (**self).bigger_is_closer()
    }
}

impl<T: DistanceMetric + ?Sized> DistanceMetric for Arc<T> {
    fn distance(&self, a: &[f32], b: &[f32]) -> Score {
        (**self).distance(a, b)
    }

    fn bigger_is_closer(&self) -> bool {
        (**self).bigger_is_closer()
    }
}

fn check_lengths(a: &[f32], b: &[f32]) {
    assert_eq!(a.len(), b.len(), "Vectors must be the same length");
}

/// Cosine similarity: `a·b / (|a| * |b|)`, accumulated in f64.
///
/// Declares `bigger_is_closer = false`, so the *lowest* raw cosine ranks first.
/// This is the polarity the index has always shipped with; see DESIGN.md before changing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CosineSimilarity;

impl DistanceMetric for CosineSimilarity {
    fn distance(&self, a: &[f32], b: &[f32]) -> Score {
        check_lengths(a, b);
        let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
        for (&x, &y) in a.iter().zip(b) {
            dot += f64::from(x * y);
            norm_a += f64::from(x).powi(2);
            norm_b += f64::from(y).powi(2);
        }
        (dot / (norm_a.sqrt() * norm_b.sqrt())) as Score
    }

    fn bigger_is_closer(&self) -> bool {
        false
    }
}

/// Raw inner product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DotProduct;

impl DistanceMetric for DotProduct {
    fn distance(&self, a: &[f32], b: &[f32]) -> Score {
        check_lengths(a, b);
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    fn bigger_is_closer(&self) -> bool {
        true
    }
}

/// Euclidean (L2) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl DistanceMetric for Euclidean {
    fn distance(&self, a: &[f32], b: &[f32]) -> Score {
        check_lengths(a, b);
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f32>()
            .sqrt()
    }

    fn bigger_is_closer(&self) -> bool {
        false
    }
}

/// Orders scores best-first under the given polarity. NaN ranks last for either polarity.
pub fn compare_scores(bigger_is_closer: bool, a: Score, b: Score) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = OrderedFloat(a).cmp(&OrderedFloat(b));
            if bigger_is_closer { ord.reverse() } else { ord }
        }
    }
}

/// True when `a` ranks strictly ahead of `b`.
pub fn is_better(bigger_is_closer: bool, a: Score, b: Score) -> bool {
    compare_scores(bigger_is_closer, a, b) == Ordering::Less
}
