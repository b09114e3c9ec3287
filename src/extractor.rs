//! Structured Answer Extractor
//!
//! Retrieves the single closest catalog document for an utterance and
//! parses its flat text block back into a field mapping. Only the
//! top-ranked document is used and no similarity threshold is applied:
//! any non-empty result set is accepted, however weak the match.

use tracing::debug;

use crate::index::ProductIndex;
use crate::models::{
    ProductFields, CATEGORIES_PREFIX, DESCRIPTION_PREFIX, NAME_PREFIX, PRICE_PREFIX,
};
use crate::Result;

/// Parse a flat product block back into a field mapping.
///
/// Each line is matched against the four fixed prefixes; lines matching
/// none are silently ignored, so a malformed or re-ordered block yields a
/// partial mapping rather than an error.
pub fn parse_product_block(block: &str) -> ProductFields {
    let mut fields = ProductFields::default();

    for line in block.lines() {
        if let Some(rest) = line.strip_prefix(NAME_PREFIX) {
            fields.name = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(PRICE_PREFIX) {
            fields.price = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(DESCRIPTION_PREFIX) {
            fields.description = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(CATEGORIES_PREFIX) {
            fields.categories = Some(rest.trim().to_string());
        }
    }

    fields
}

/// Retrieve the closest catalog document for `utterance` and parse it.
///
/// An empty index yields the empty mapping without touching the embedder;
/// a query-embedding failure propagates as an error.
pub async fn extract(index: &ProductIndex, utterance: &str) -> Result<ProductFields> {
    if index.is_empty() {
        debug!("Similarity index is empty, returning empty mapping");
        return Ok(ProductFields::default());
    }

    let results = index.nearest(utterance, 1).await?;

    let Some(document) = results.first() else {
        return Ok(ProductFields::default());
    };

    Ok(parse_product_block(&document.content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::models::ProductRecord;
    use std::sync::Arc;

    /// Embedder returning the same vector for every input; with a single
    /// indexed document, top-1 retrieval is independent of the scores.
    struct ConstantEmbedder;

    #[async_trait::async_trait]
    impl Embedder for ConstantEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.5])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.5]).collect())
        }
    }

    fn crema() -> ProductRecord {
        ProductRecord {
            name: "Crema X".to_string(),
            price: "500".to_string(),
            description: "Hidratante".to_string(),
            categories: vec!["Facial".to_string()],
        }
    }

    #[test]
    fn test_round_trip_complete_record() {
        let record = crema();
        let fields = parse_product_block(&record.to_document());

        assert_eq!(fields.name.as_deref(), Some("Crema X"));
        assert_eq!(fields.price.as_deref(), Some("500"));
        assert_eq!(fields.description.as_deref(), Some("Hidratante"));
        assert_eq!(fields.categories.as_deref(), Some("Facial"));
    }

    #[test]
    fn test_round_trip_missing_fields_yield_sentinels() {
        // Records normalized with sentinels still parse to all four keys.
        let record = ProductRecord {
            name: "N/A".to_string(),
            price: "N/A".to_string(),
            description: "N/A".to_string(),
            categories: vec![],
        };

        let fields = parse_product_block(&record.to_document());
        assert_eq!(fields.name.as_deref(), Some("N/A"));
        assert_eq!(fields.price.as_deref(), Some("N/A"));
        assert_eq!(fields.description.as_deref(), Some("N/A"));
        assert_eq!(fields.categories.as_deref(), Some("Sin categorías"));
        assert!(!fields.is_empty());
    }

    #[test]
    fn test_unknown_lines_are_ignored() {
        let block = "Producto: Crema X\nStock: 12\nPrecio: 500";
        let fields = parse_product_block(block);

        assert_eq!(fields.name.as_deref(), Some("Crema X"));
        assert_eq!(fields.price.as_deref(), Some("500"));
        assert!(fields.description.is_none());
        assert!(fields.categories.is_none());
    }

    #[test]
    fn test_malformed_block_yields_partial_mapping() {
        let fields = parse_product_block("sin prefijos reconocibles");
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn test_empty_index_yields_empty_mapping() {
        let index = ProductIndex::build(Arc::new(ConstantEmbedder), &[])
            .await
            .unwrap();

        let fields = extract(&index, "tienes crema").await.unwrap();
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn test_single_product_end_to_end() {
        let index = ProductIndex::build(Arc::new(ConstantEmbedder), &[crema()])
            .await
            .unwrap();

        let fields = extract(&index, "tienes crema").await.unwrap();
        assert_eq!(fields.name.as_deref(), Some("Crema X"));
        assert_eq!(fields.price.as_deref(), Some("500"));
    }
}
