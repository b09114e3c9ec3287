//! Storefront Assistant
//!
//! A conversational assistant for an e-commerce storefront:
//! - Loads the product catalog from a WooCommerce-style backend
//! - Indexes product text for embedding-based similarity search
//! - Classifies user questions into intents with keyword rules
//! - Routes questions to the similarity index or a chat-completion model
//! - Formats answers with fixed response templates
//!
//! PIPELINE:
//! catalog → index (startup) ; question → classify → {extract | fallback} → respond

pub mod api;
pub mod catalog;
pub mod classifier;
pub mod completion;
pub mod embedding;
pub mod error;
pub mod extractor;
pub mod fallback;
pub mod formatter;
pub mod index;
pub mod models;
pub mod orchestrator;

pub use error::Result;

// Re-export common types
pub use classifier::IntentClassifier;
pub use models::*;
