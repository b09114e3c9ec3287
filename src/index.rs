//! In-memory similarity index
//!
//! Built once at startup from the full catalog and read-only afterwards.
//! Retrieval embeds the query text and ranks stored documents by cosine
//! similarity; no similarity threshold is applied anywhere.

use std::sync::Arc;
use tracing::info;

use crate::embedding::Embedder;
use crate::models::ProductRecord;
use crate::Result;

/// A catalog document stored with its embedding vector.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    /// Flat text block of the source product record.
    pub content: String,
    pub embedding: Vec<f32>,
}

/// Immutable nearest-neighbor index over product flat blocks.
pub struct ProductIndex {
    embedder: Arc<dyn Embedder>,
    documents: Vec<IndexedDocument>,
}

impl ProductIndex {
    /// Embed every record's flat block and build the index.
    ///
    /// An empty catalog yields an empty index without calling the embedder.
    pub async fn build(embedder: Arc<dyn Embedder>, records: &[ProductRecord]) -> Result<Self> {
        let blocks: Vec<String> = records.iter().map(|r| r.to_document()).collect();

        let documents = if blocks.is_empty() {
            Vec::new()
        } else {
            let embeddings = embedder.embed_batch(&blocks).await?;
            blocks
                .into_iter()
                .zip(embeddings)
                .map(|(content, embedding)| IndexedDocument { content, embedding })
                .collect()
        };

        info!("Similarity index built with {} documents", documents.len());

        Ok(Self {
            embedder,
            documents,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Rank documents by cosine similarity to the query, descending, and
    /// return at most `k`. An empty index short-circuits to an empty
    /// result without calling the embedder.
    pub async fn nearest(&self, query: &str, k: usize) -> Result<Vec<&IndexedDocument>> {
        if self.documents.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let mut ranked: Vec<(f32, &IndexedDocument)> = self
            .documents
            .iter()
            .map(|doc| (cosine_similarity(&query_embedding, &doc.embedding), doc))
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(ranked.into_iter().take(k).map(|(_, doc)| doc).collect())
    }
}

/// Cosine similarity between two vectors; 0.0 for mismatched or empty inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut mag_a = 0.0f32;
    let mut mag_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a.sqrt() * mag_b.sqrt())
}
