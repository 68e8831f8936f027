//! Sentiment scoring of review text.
//!
//! Everything outside this module depends only on the [`SentimentScorer`]
//! trait. [`LexiconScorer`] is the scorer the service ships with: a compact
//! valence lexicon with the usual heuristics for negation, intensifiers,
//! contrastive "but", capitalisation and exclamation marks.

use crate::types::{AnnotatedReview, Review, SentimentScores};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ScorerError {
    #[error("sentiment scoring failed: {0}")]
    Failed(String),
}

/// Scores a piece of text. Implementations must be pure.
pub trait SentimentScorer: Send + Sync {
    fn polarity_scores(&self, text: &str) -> Result<SentimentScores, ScorerError>;
}

/// Attaches freshly computed sentiment to reviews copied out of the store.
#[derive(Clone)]
pub struct SentimentAnnotator {
    scorer: Arc<dyn SentimentScorer>,
}

impl SentimentAnnotator {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { scorer }
    }

    pub fn annotate(&self, review: Review) -> Result<AnnotatedReview, ScorerError> {
        let sentiment = self.scorer.polarity_scores(&review.body)?;
        Ok(AnnotatedReview { review, sentiment })
    }

    /// Annotates every review, failing on the first scorer error.
    pub fn annotate_all(&self, reviews: Vec<Review>) -> Result<Vec<AnnotatedReview>, ScorerError> {
        reviews
            .into_iter()
            .map(|review| self.annotate(review))
            .collect()
    }
}

// Normalisation constant approximating the maximum expected raw score.
const ALPHA: f64 = 15.0;

const BOOST_INCREMENT: f64 = 0.293;
const DAMPEN_INCREMENT: f64 = -0.293;
const CAPS_INCREMENT: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "didnt", "doesnt", "dont", "hadnt", "hasnt",
    "havent", "isnt", "never", "no", "nobody", "none", "nope", "nor", "not", "nothing",
    "nowhere", "shouldnt", "wasnt", "werent", "without", "wont", "wouldnt",
];

const BOOSTERS: &[&str] = &[
    "absolutely", "amazingly", "completely", "deeply", "especially", "exceptionally",
    "extremely", "highly", "incredibly", "most", "really", "so", "super", "thoroughly",
    "totally", "truly", "utterly", "very",
];

const DAMPENERS: &[&str] = &[
    "almost", "barely", "hardly", "kinda", "less", "little", "marginally", "occasionally",
    "partly", "slightly", "somewhat", "sorta",
];

const LEXICON: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("annoyed", -1.6),
    ("annoying", -1.8),
    ("avoid", -1.2),
    ("awesome", 3.1),
    ("awful", -2.0),
    ("bad", -2.5),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("bland", -1.4),
    ("boring", -1.3),
    ("broken", -1.5),
    ("burnt", -1.5),
    ("clean", 1.7),
    ("cold", -0.7),
    ("comfortable", 2.3),
    ("cozy", 1.9),
    ("delicious", 2.7),
    ("delightful", 2.9),
    ("dirty", -1.9),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("disgusting", -2.4),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("fantastic", 2.6),
    ("fast", 1.1),
    ("favorite", 2.0),
    ("fine", 0.8),
    ("fresh", 1.3),
    ("friendly", 2.2),
    ("fun", 2.3),
    ("gross", -2.1),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("hate", -2.7),
    ("helpful", 1.8),
    ("horrible", -2.5),
    ("hot", 0.3),
    ("impressed", 2.1),
    ("lazy", -1.4),
    ("like", 1.5),
    ("liked", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("mediocre", -1.0),
    ("mess", -1.5),
    ("nice", 1.8),
    ("okay", 0.9),
    ("overpriced", -1.7),
    ("perfect", 2.7),
    ("pleasant", 2.3),
    ("poor", -2.1),
    ("recommend", 1.5),
    ("rude", -2.0),
    ("sad", -2.1),
    ("slow", -0.9),
    ("sick", -2.3),
    ("stale", -1.6),
    ("tasty", 2.0),
    ("terrible", -2.1),
    ("thanks", 1.9),
    ("ugly", -2.3),
    ("unfriendly", -1.5),
    ("unhappy", -1.8),
    ("upset", -1.6),
    ("warm", 0.9),
    ("welcoming", 1.9),
    ("wonderful", 2.7),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wow", 2.8),
    ("wrong", -2.1),
    ("yummy", 2.4),
];

/// Lexicon-driven scorer with VADER-style heuristics.
pub struct LexiconScorer {
    lexicon: HashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        LexiconScorer {
            lexicon: LEXICON.iter().copied().collect(),
        }
    }
}

struct Token {
    word: String,
    shouting: bool,
}

fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .filter_map(|raw| {
            let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
            let word: String = trimmed
                .chars()
                .filter(|c| *c != '\'')
                .flat_map(char::to_lowercase)
                .collect();
            if word.is_empty() {
                return None;
            }
            let shouting = trimmed.chars().any(char::is_alphabetic)
                && trimmed
                    .chars()
                    .filter(|c| c.is_alphabetic())
                    .all(char::is_uppercase);
            Some(Token { word, shouting })
        })
        .collect()
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self::default()
    }

    fn valence(&self, tokens: &[Token], index: usize, mixed_case: bool) -> f64 {
        let token = &tokens[index];
        let Some(&base) = self.lexicon.get(token.word.as_str()) else {
            return 0.0;
        };

        let mut valence = base;
        if token.shouting && mixed_case {
            valence += CAPS_INCREMENT * base.signum();
        }

        for (distance, scale) in [(1usize, 1.0), (2, 0.95), (3, 0.9)] {
            let Some(prev) = index.checked_sub(distance).map(|i| &tokens[i]) else {
                break;
            };
            let word = prev.word.as_str();
            if BOOSTERS.contains(&word) {
                valence += BOOST_INCREMENT * scale * base.signum();
            } else if DAMPENERS.contains(&word) {
                valence += DAMPEN_INCREMENT * scale * base.signum();
            }
            if NEGATIONS.contains(&word) {
                valence *= NEGATION_SCALAR;
            }
        }

        valence
    }
}

impl SentimentScorer for LexiconScorer {
    fn polarity_scores(&self, text: &str) -> Result<SentimentScores, ScorerError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Ok(SentimentScores::default());
        }

        // Capitalised words only count as emphasis when the rest of the text is not shouting too.
        let mixed_case = tokens.iter().any(|t| !t.shouting);

        let mut valences: Vec<f64> = (0..tokens.len())
            .map(|i| self.valence(&tokens, i, mixed_case))
            .collect();

        if let Some(but) = tokens.iter().position(|t| t.word == "but") {
            for (i, valence) in valences.iter_mut().enumerate() {
                if i < but {
                    *valence *= 0.5;
                } else if i > but {
                    *valence *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
        let emphasis = exclamations as f64 * EXCLAMATION_INCREMENT;
        if sum > 0.0 {
            sum += emphasis;
        } else if sum < 0.0 {
            sum -= emphasis;
        }
        let compound = normalize(sum);

        let mut pos_sum = 0.0;
        let mut neg_sum = 0.0;
        let mut neu_count = 0.0;
        for valence in &valences {
            if *valence > 0.0 {
                pos_sum += valence + 1.0;
            } else if *valence < 0.0 {
                neg_sum += valence - 1.0;
            } else {
                neu_count += 1.0;
            }
        }
        if pos_sum > neg_sum.abs() {
            pos_sum += emphasis;
        } else if pos_sum < neg_sum.abs() {
            neg_sum -= emphasis;
        }

        let total = pos_sum + neg_sum.abs() + neu_count;
        Ok(SentimentScores {
            neg: round_to((neg_sum / total).abs(), 3),
            neu: round_to(neu_count / total, 3),
            pos: round_to(pos_sum / total, 3),
            compound: round_to(compound, 4),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{FailingScorer, FixedScorer};
    use chrono::NaiveDate;

    fn score(text: &str) -> SentimentScores {
        LexiconScorer::new().polarity_scores(text).unwrap()
    }

    #[test]
    fn test_polarity_direction() {
        assert!(score("The food was great and the staff were friendly").compound > 0.5);
        assert!(score("Terrible service, the worst tacos I have had").compound < -0.5);
        assert_eq!(score("We ordered at the counter").compound, 0.0);
        assert_eq!(score("").compound, 0.0);
    }

    #[test]
    fn test_proportions_sum_to_one() {
        let scores = score("Good burgers but the fries were cold and bland");
        let total = scores.neg + scores.neu + scores.pos;
        assert!((total - 1.0).abs() < 0.01, "total was {total}");
        assert!(scores.neg > 0.0);
        assert!(scores.pos > 0.0);
    }

    #[test]
    fn test_negation_flips_polarity() {
        assert!(score("The salsa was good").compound > 0.0);
        assert!(score("The salsa was not good").compound < 0.0);
        assert!(score("The salsa wasn't good").compound < 0.0);
    }

    #[test]
    fn test_intensifiers_and_emphasis() {
        let plain = score("The staff were friendly").compound;
        assert!(score("The staff were very friendly").compound > plain);
        assert!(score("The staff were friendly!!").compound > plain);
        assert!(score("The staff were FRIENDLY").compound > plain);
        assert!(score("The staff were slightly friendly").compound < plain);
    }

    #[test]
    fn test_but_shifts_weight_to_second_clause() {
        assert!(score("The room was nice but the service was terrible").compound < 0.0);
        assert!(score("The room was dirty but the staff were wonderful").compound > 0.0);
    }

    #[test]
    fn test_compound_is_bounded() {
        let gushing = "best best best amazing amazing love love love perfect!!!!!!";
        let compound = score(gushing).compound;
        assert!((-1.0..=1.0).contains(&compound));
        let ranting = "worst worst worst horrible horrible hate hate terrible!!!!!!";
        let compound = score(ranting).compound;
        assert!((-1.0..=1.0).contains(&compound));
    }

    #[test]
    fn test_annotator_copies_review() {
        let timestamp = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let review = Review::new("r1", "text", "Fresno, California", timestamp);
        let annotator = SentimentAnnotator::new(Arc::new(FixedScorer::new([("text", 0.25)])));

        let annotated = annotator.annotate(review.clone()).unwrap();
        assert_eq!(annotated.review, review);
        assert_eq!(annotated.sentiment.compound, 0.25);
    }

    #[test]
    fn test_annotator_propagates_scorer_failure() {
        let timestamp = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let review = Review::new("r1", "text", "Fresno, California", timestamp);
        let annotator = SentimentAnnotator::new(Arc::new(FailingScorer));

        assert!(matches!(
            annotator.annotate_all(vec![review]),
            Err(ScorerError::Failed(_))
        ));
    }
}
