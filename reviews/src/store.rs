use crate::types::Review;
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only, insertion-ordered collection of reviews.
///
/// Cloning the store yields another handle to the same collection. Reads take
/// a snapshot under the read lock, so a concurrent append never interleaves
/// with an iteration.
#[derive(Clone, Default)]
pub struct ReviewStore {
    reviews: Arc<RwLock<Vec<Review>>>,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, review: Review) {
        self.reviews.write().push(review);
    }

    /// Returns a copy of every review in insertion order.
    pub fn all(&self) -> Vec<Review> {
        self.reviews.read().clone()
    }

    pub fn len(&self) -> usize {
        self.reviews.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.read().is_empty()
    }
}
