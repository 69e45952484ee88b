//! Caller-owned memoization of basis function values.
//!
//! Nothing is cached implicitly: evaluators only consult a cache handed to
//! them explicitly, so shared curves stay free of interior mutability.

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;

use super::basis::basis_functions;
use super::knot::KnotVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BasisKey {
    knots: u64,
    degree: usize,
    span: usize,
    parameter: u64,
}

/// Basis values keyed by knot-vector identity, degree, span and parameter.
#[derive(Debug, Default, Clone)]
pub struct BasisCache {
    entries: HashMap<BasisKey, Arc<[f64]>>,
    hits: u64,
    misses: u64,
}

impl BasisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Basis values of `knots` on `span` at `u`, computed on first request.
    pub fn basis(&mut self, knots: &KnotVector, span: usize, u: f64) -> Arc<[f64]> {
        let key = BasisKey {
            knots: knots.fingerprint(),
            degree: knots.degree(),
            span,
            parameter: u.to_bits(),
        };

        if let Some(values) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(values);
        }

        self.misses += 1;
        trace!("basis cache miss: span {} at u={} (degree {})", span, u, knots.degree());
        let values: Arc<[f64]> = basis_functions(span, u, knots.degree(), knots.knots()).into();
        self.entries.insert(key, Arc::clone(&values));
        values
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hits_on_repeat() {
        let kv = KnotVector::clamped_uniform(2, 5).unwrap();
        let mut cache = BasisCache::new();
        let span = kv.find_span(0.4);

        let first = cache.basis(&kv, span, 0.4);
        let second = cache.basis(&kv, span, 0.4);
        assert_eq!(first, second);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
        assert_eq!(
            &*first,
            basis_functions(span, 0.4, 2, kv.knots()).as_slice()
        );
    }

    #[test]
    fn test_cache_separates_knot_vectors() {
        let a = KnotVector::clamped_uniform(2, 5).unwrap();
        let b = KnotVector::new(vec![0.0, 0.0, 0.0, 0.1, 0.2, 1.0, 1.0, 1.0], 2, 5).unwrap();
        let mut cache = BasisCache::new();

        let va = cache.basis(&a, a.find_span(0.5), 0.5);
        let vb = cache.basis(&b, b.find_span(0.5), 0.5);
        assert_ne!(va, vb);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.misses(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 0);
    }
}
