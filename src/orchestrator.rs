//! Turn Orchestrator
//!
//! Reads the latest turn of a conversation, classifies it, and dispatches
//! to the structured retrieval path or the fallback model path, appending
//! exactly one system turn. Prior turns are never mutated.

use std::sync::Arc;
use tracing::info;

use crate::classifier::IntentClassifier;
use crate::completion::CompletionProvider;
use crate::error::AssistantError;
use crate::extractor;
use crate::fallback;
use crate::index::ProductIndex;
use crate::models::{Conversation, ConversationTurn, UserIntent};
use crate::Result;

/// Dispatch target selected for a classified utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchPath {
    Structured,
    Fallback,
}

fn dispatch_path(intent: UserIntent) -> DispatchPath {
    match intent {
        UserIntent::SearchProduct | UserIntent::ListCategories | UserIntent::CheckPromotions => {
            DispatchPath::Structured
        }
        UserIntent::UnknownIntent => DispatchPath::Fallback,
    }
}

/// Per-process orchestrator holding the read-only index and the
/// completion provider for the lifetime of the process.
pub struct TurnOrchestrator {
    index: ProductIndex,
    completions: Arc<dyn CompletionProvider>,
}

impl TurnOrchestrator {
    pub fn new(index: ProductIndex, completions: Arc<dyn CompletionProvider>) -> Self {
        Self { index, completions }
    }

    /// Advance the conversation by exactly one system turn.
    ///
    /// The structured path appends the raw field mapping serialized as a
    /// JSON string; it does not pass through the formatter. The fallback
    /// path appends the responder's text. Completion-provider failures
    /// propagate; retrieval degradations do not.
    pub async fn advance(&self, mut conversation: Conversation) -> Result<Conversation> {
        let utterance = conversation
            .latest()
            .map(|turn| turn.content.clone())
            .ok_or_else(|| {
                AssistantError::OrchestrationError("conversation has no turns".to_string())
            })?;

        let intent = IntentClassifier::classify(&utterance);
        info!(intent = %intent, "Classified utterance");

        let content = match dispatch_path(intent) {
            DispatchPath::Structured => {
                let fields = extractor::extract(&self.index, &utterance).await?;
                serde_json::to_string(&fields)?
            }
            DispatchPath::Fallback => {
                fallback::respond(self.completions.as_ref(), &utterance).await?
            }
        };

        conversation.push(ConversationTurn::system(content));
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::models::{ProductRecord, TurnRole};

    struct ConstantEmbedder;

    #[async_trait::async_trait]
    impl Embedder for ConstantEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0]).collect())
        }
    }

    struct FixedCompletion(&'static str);

    #[async_trait::async_trait]
    impl CompletionProvider for FixedCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    async fn orchestrator_with(records: &[ProductRecord]) -> TurnOrchestrator {
        let index = ProductIndex::build(Arc::new(ConstantEmbedder), records)
            .await
            .unwrap();
        TurnOrchestrator::new(index, Arc::new(FixedCompletion("respuesta del modelo")))
    }

    fn crema() -> ProductRecord {
        ProductRecord {
            name: "Crema X".to_string(),
            price: "500".to_string(),
            description: "Hidratante".to_string(),
            categories: vec!["Facial".to_string()],
        }
    }

    #[tokio::test]
    async fn test_structured_path_appends_stringified_mapping() {
        let orchestrator = orchestrator_with(&[crema()]).await;

        let conversation = orchestrator
            .advance(Conversation::from_question("tienes crema"))
            .await
            .unwrap();

        assert_eq!(conversation.len(), 2);
        let turn = conversation.latest().unwrap();
        assert_eq!(turn.role, TurnRole::System);

        // The raw mapping is serialized, not rendered through a template.
        assert!(turn.content.contains("\"name\":\"Crema X\""));
        assert!(turn.content.contains("\"price\":\"500\""));
    }

    #[tokio::test]
    async fn test_fallback_path_appends_model_text() {
        let orchestrator = orchestrator_with(&[]).await;

        let conversation = orchestrator
            .advance(Conversation::from_question("hola, ¿cómo estás?"))
            .await
            .unwrap();

        assert_eq!(conversation.len(), 2);
        assert_eq!(
            conversation.latest().unwrap().content,
            "respuesta del modelo"
        );
    }

    #[tokio::test]
    async fn test_advance_adds_exactly_one_turn_on_both_branches() {
        let orchestrator = orchestrator_with(&[crema()]).await;

        for question in ["tienes crema", "cuéntame un chiste"] {
            let input = Conversation::from_question(question);
            let before = input.len();
            let output = orchestrator.advance(input).await.unwrap();
            assert_eq!(output.len(), before + 1);
        }
    }

    #[tokio::test]
    async fn test_structured_path_with_empty_index_yields_empty_mapping() {
        let orchestrator = orchestrator_with(&[]).await;

        let conversation = orchestrator
            .advance(Conversation::from_question("tienes crema"))
            .await
            .unwrap();

        assert_eq!(conversation.latest().unwrap().content, "{}");
    }

    #[tokio::test]
    async fn test_prior_turns_are_preserved_in_order() {
        let orchestrator = orchestrator_with(&[crema()]).await;

        let mut input = Conversation::from_question("hola");
        input.push(ConversationTurn::system("¡Hola!"));
        input.push(ConversationTurn::user("tienes crema"));

        let output = orchestrator.advance(input).await.unwrap();
        assert_eq!(output.len(), 4);
        assert_eq!(output.turns()[0].content, "hola");
        assert_eq!(output.turns()[1].content, "¡Hola!");
        assert_eq!(output.turns()[2].content, "tienes crema");
    }

    #[tokio::test]
    async fn test_empty_conversation_is_an_error() {
        let orchestrator = orchestrator_with(&[]).await;

        let result = orchestrator.advance(Conversation::new()).await;
        assert!(matches!(
            result,
            Err(AssistantError::OrchestrationError(_))
        ));
    }
}
