//! Core data models for the storefront assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Flat Block Format =================
//

/// Line prefixes of the flat text block stored in the similarity index.
pub const NAME_PREFIX: &str = "Producto:";
pub const PRICE_PREFIX: &str = "Precio:";
pub const DESCRIPTION_PREFIX: &str = "Descripción:";
pub const CATEGORIES_PREFIX: &str = "Categorías:";

/// Sentinel for a missing scalar field.
pub const MISSING_FIELD: &str = "N/A";
/// Sentinel rendered when a product has no categories.
pub const MISSING_CATEGORIES: &str = "Sin categorías";

//
// ================= Products =================
//

/// A normalized catalog product. Immutable once loaded.
///
/// Field values are trimmed, single-line plain text; descriptions have
/// their markup stripped by the catalog loader before a record is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductRecord {
    pub name: String,
    pub price: String,
    pub description: String,
    pub categories: Vec<String>,
}

impl ProductRecord {
    /// Serialize into the flat text block stored in the similarity index.
    ///
    /// All four fields are always emitted; an empty category list is
    /// rendered with its sentinel so re-parsing yields all four keys.
    pub fn to_document(&self) -> String {
        let categories = if self.categories.is_empty() {
            MISSING_CATEGORIES.to_string()
        } else {
            self.categories.join(", ")
        };

        format!(
            "{} {}\n{} {}\n{} {}\n{} {}",
            NAME_PREFIX, self.name,
            PRICE_PREFIX, self.price,
            DESCRIPTION_PREFIX, self.description,
            CATEGORIES_PREFIX, categories,
        )
    }
}

/// Field mapping recovered from a retrieved flat block.
///
/// Fields absent from the block stay `None`; the formatter substitutes
/// sentinels at render time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
}

impl ProductFields {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.categories.is_none()
    }
}

//
// ================= Intents =================
//

/// Classifier-level intent labels.
///
/// Closed set. Intentionally NOT the same enumeration as the formatter's
/// template keys; the formatter resolves unknown labels via its catch-all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserIntent {
    SearchProduct,
    ListCategories,
    CheckPromotions,
    UnknownIntent,
}

impl UserIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserIntent::SearchProduct => "search_product",
            UserIntent::ListCategories => "list_categories",
            UserIntent::CheckPromotions => "check_promotions",
            UserIntent::UnknownIntent => "unknown_intent",
        }
    }
}

//
// ================= Conversation =================
//

/// Role of a turn's author.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    System,
}

/// One message within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Ordered, append-only sequence of turns.
///
/// Turns are only ever added at the end; prior turns are never mutated.
/// Role alternation is expected but not enforced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation from a single user question.
    pub fn from_question(question: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.push(ConversationTurn::user(question));
        conversation
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// The most recent turn, if any.
    pub fn latest(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl fmt::Display for UserIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TurnRole::User => "user",
            TurnRole::System => "system",
        };
        write!(f, "{}", s)
    }
}
