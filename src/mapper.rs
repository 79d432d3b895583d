use serde::{Deserialize, Serialize};

use crate::config::RelayConfig;

/// One element of the source form, as scraped from the live document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceField {
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
}

/// Kind of input created in the shadow form. Mapped fields are hidden in
/// mapping mode but plain text in identity mode; the asymmetry is inherited
/// and load-bearing for endpoints that filter on input type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Hidden,
    Text,
}

/// One input to be created in the shadow form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowInput {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: InputKind,
}

/// Translate the source form's fields into shadow inputs, in document order.
///
/// Unchecked checkboxes are skipped; no other element type is. In mapping
/// mode a field whose name is absent from the map is dropped entirely. No
/// dedup is performed: two sources mapping to one destination name yield two
/// inputs, and which value the endpoint keeps is the endpoint's business.
pub fn map_fields(config: &RelayConfig, fields: &[SourceField]) -> Vec<ShadowInput> {
    let mut inputs = Vec::new();

    for field in fields {
        if field.r#type == "checkbox" && !field.checked {
            continue;
        }

        match &config.mapping {
            Some(mapping) => {
                let Some(destination) = mapping.get(&field.name) else {
                    continue;
                };
                inputs.push(ShadowInput {
                    name: destination.clone(),
                    value: apply_transform(config, destination, &field.value),
                    kind: InputKind::Hidden,
                });
            }
            None => {
                inputs.push(ShadowInput {
                    name: field.name.clone(),
                    value: apply_transform(config, &field.name, &field.value),
                    kind: InputKind::Text,
                });
            }
        }
    }

    inputs
}

/// The literal fields that ride along with every submission: configured
/// additional fields in insertion order, then the debug pair when a debug
/// email is set. Transforms do not apply here.
pub fn extra_inputs(config: &RelayConfig) -> Vec<ShadowInput> {
    let mut inputs: Vec<ShadowInput> = config
        .additional_fields
        .iter()
        .map(|(name, value)| ShadowInput {
            name: name.clone(),
            value: value.clone(),
            kind: InputKind::Hidden,
        })
        .collect();

    if let Some(email) = config.debug_email.as_deref().filter(|e| !e.is_empty()) {
        inputs.push(ShadowInput {
            name: "debug".into(),
            value: "1".into(),
            kind: InputKind::Hidden,
        });
        inputs.push(ShadowInput {
            name: "debugEmail".into(),
            value: email.into(),
            kind: InputKind::Hidden,
        });
    }

    inputs
}

fn apply_transform(config: &RelayConfig, destination: &str, raw: &str) -> String {
    match config.transforms.get(destination) {
        Some(transform) => transform(raw),
        None => raw.to_string(),
    }
}
