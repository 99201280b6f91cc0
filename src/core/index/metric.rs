//! Distance functions the index is parameterized over.

/// A dissimilarity measure over `T`.
///
/// Must be non-negative and symmetric. Search results are exact when the
/// triangle inequality also holds; otherwise pruning can miss neighbors.
pub trait Metric<T: ?Sized> {
    fn distance(&self, a: &T, b: &T) -> f64;
}

impl<T: ?Sized, F> Metric<T> for F
where
    F: Fn(&T, &T) -> f64,
{
    fn distance(&self, a: &T, b: &T) -> f64 {
        self(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure<M: Metric<i64>>(metric: &M, a: i64, b: i64) -> f64 {
        metric.distance(&a, &b)
    }

    #[test]
    fn closures_are_metrics() {
        let absolute = |a: &i64, b: &i64| (a - b).abs() as f64;
        assert_eq!(measure(&absolute, 3, 10), 7.0);
        assert_eq!(measure(&absolute, 10, 3), 7.0);
    }
}
