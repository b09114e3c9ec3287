//! Intent Classifier
//!
//! Maps a raw user utterance to one of four intents using ordered keyword
//! membership tests. Product keywords are tested first, then category
//! keywords, then promotion keywords; the first matching set wins and an
//! utterance matching none of them is `unknown_intent`.

use crate::models::UserIntent;

/// Static keyword lists — zero allocation
const PRODUCT_KEYWORDS: &[&str] = &[
    "buscar", "tienes", "producto", "disponible", "tienda", "pagina",
    "precio", "comprar", "encontrar",
];

const CATEGORY_KEYWORDS: &[&str] = &[
    "categorías", "tipos de producto", "clases de producto", "variedad",
];

const PROMOTION_KEYWORDS: &[&str] = &["promociones", "ofertas", "descuentos"];

/// Keyword intent classifier
pub struct IntentClassifier;

impl IntentClassifier {
    /// Classify a user utterance.
    ///
    /// Total and deterministic: always returns a label, including for the
    /// empty string. Membership is plain substring containment over the
    /// lower-cased utterance; no scoring.
    pub fn classify(utterance: &str) -> UserIntent {
        let utterance = utterance.to_lowercase();

        if PRODUCT_KEYWORDS.iter().any(|kw| utterance.contains(kw)) {
            UserIntent::SearchProduct
        } else if CATEGORY_KEYWORDS.iter().any(|kw| utterance.contains(kw)) {
            UserIntent::ListCategories
        } else if PROMOTION_KEYWORDS.iter().any(|kw| utterance.contains(kw)) {
            UserIntent::CheckPromotions
        } else {
            UserIntent::UnknownIntent
        }
    }
}
