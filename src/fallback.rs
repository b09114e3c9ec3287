//! Fallback Responder
//!
//! Handles utterances that did not match a catalog intent by forwarding
//! them to the chat-completion provider. Provider failures propagate to
//! the caller; there is no retry and no truncation.

use tracing::info;

use crate::classifier::IntentClassifier;
use crate::completion::CompletionProvider;
use crate::formatter::{self, ResponseData};
use crate::Result;

/// Build the fixed instruction prompt embedding the user utterance.
fn build_prompt(utterance: &str) -> String {
    format!(
        "Consulta: {}\nResponde con claridad sobre la intención detectada.",
        utterance
    )
}

/// Forward `utterance` to the completion provider and return its text.
///
/// The utterance is reclassified here; if the resulting label were one of
/// the formatter's template keys the answer would be wrapped through the
/// formatter. The classifier's labels and the template keys are disjoint
/// sets, so in practice the raw model output is returned unchanged.
pub async fn respond(completions: &dyn CompletionProvider, utterance: &str) -> Result<String> {
    let intent = IntentClassifier::classify(utterance);

    let answer = completions.complete(&build_prompt(utterance)).await?;

    if formatter::has_template(intent.as_str()) {
        info!("Wrapping fallback answer with the {} template", intent);
        return Ok(formatter::format(
            intent.as_str(),
            &ResponseData::Text(answer),
        ));
    }

    Ok(answer)
}
