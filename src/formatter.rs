//! Response Formatter
//!
//! Selects a fixed template for a formatter-level intent label and
//! interpolates the payload into user-facing text. Labels outside the
//! template table resolve to a fixed not-understood message, so formatting
//! is total. The template table is process-wide and read-only.
//!
//! The template keys (`price_query`, `product_query`, `general_help`,
//! `general`) are an independent label set from the classifier's intents;
//! classifier labels passed here land on the catch-all.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::models::{ProductFields, MISSING_CATEGORIES, MISSING_FIELD};

/// Fixed catch-all for labels without a template.
pub const NOT_UNDERSTOOD: &str = "Lo siento, no entendí tu consulta.";

lazy_static! {
    static ref RESPONSE_TEMPLATES: HashMap<&'static str, &'static str> = {
        let mut templates = HashMap::new();
        templates.insert(
            "price_query",
            "El producto '{name}' tiene un precio de {price}.",
        );
        templates.insert(
            "product_query",
            "Aquí tienes información sobre el producto:\n\
             Nombre: {name}\n\
             Descripción: {description}\n\
             Categorías: {categories}",
        );
        templates.insert(
            "general_help",
            "Puedes preguntarme sobre productos, precios o información general. \
             ¡Estoy aquí para ayudarte!",
        );
        templates.insert(
            "general",
            "Esto es lo que encontré relacionado con tu consulta:\n{response}",
        );
        templates
    };
}

/// Payload accepted by the formatter: a parsed field mapping for the
/// product templates, or an opaque answer for the general templates.
#[derive(Debug, Clone)]
pub enum ResponseData {
    Fields(ProductFields),
    Text(String),
}

/// Whether `intent` has a template of its own.
pub fn has_template(intent: &str) -> bool {
    RESPONSE_TEMPLATES.contains_key(intent)
}

/// Render `data` for the given intent label.
///
/// Missing fields default to their sentinels; unrecognized labels return
/// the fixed not-understood message. Never fails.
pub fn format(intent: &str, data: &ResponseData) -> String {
    match intent {
        "price_query" | "product_query" => {
            let template = RESPONSE_TEMPLATES[intent];
            let empty = ProductFields::default();
            let fields = match data {
                ResponseData::Fields(fields) => fields,
                ResponseData::Text(_) => &empty,
            };

            template
                .replace("{name}", fields.name.as_deref().unwrap_or(MISSING_FIELD))
                .replace("{price}", fields.price.as_deref().unwrap_or(MISSING_FIELD))
                .replace(
                    "{description}",
                    fields.description.as_deref().unwrap_or(MISSING_FIELD),
                )
                .replace(
                    "{categories}",
                    fields.categories.as_deref().unwrap_or(MISSING_CATEGORIES),
                )
        }
        "general_help" | "general" => {
            let template = RESPONSE_TEMPLATES[intent];
            let response = match data {
                ResponseData::Text(text) => text.clone(),
                ResponseData::Fields(fields) => {
                    serde_json::to_string(fields).unwrap_or_default()
                }
            };
            template.replace("{response}", &response)
        }
        _ => NOT_UNDERSTOOD.to_string(),
    }
}
