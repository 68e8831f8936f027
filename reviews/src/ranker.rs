use crate::types::AnnotatedReview;

/// Orders reviews by compound sentiment, most positive first.
///
/// The sort is stable: reviews with equal scores keep their relative order.
pub fn rank(mut reviews: Vec<AnnotatedReview>) -> Vec<AnnotatedReview> {
    reviews.sort_by(|a, b| b.sentiment.compound.total_cmp(&a.sentiment.compound));
    reviews
}
