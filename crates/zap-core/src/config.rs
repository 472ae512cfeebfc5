//! Runtime bot configuration.

use serde::{Deserialize, Serialize};

/// Minimum number of digits (exclusive) for a whitelisted phone number.
const MIN_NUMBER_DIGITS: usize = 8;

/// Default persona handed to the model.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant. Answer briefly and naturally.";

/// The generative model variant used for replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    /// Fast, cheap model used by default.
    #[default]
    #[serde(rename = "gemini-2.5-flash")]
    Flash,
    /// Larger preview model.
    #[serde(rename = "gemini-3-pro-preview")]
    Pro,
}

impl ModelType {
    /// The model identifier sent to the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Flash => "gemini-2.5-flash",
            ModelType::Pro => "gemini-3-pro-preview",
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active bot configuration.
///
/// Missing keys in a persisted document fall back to [`BotConfig::default`],
/// so loading an older file merges it over the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotConfig {
    /// Model variant.
    pub model: ModelType,

    /// Generation randomness.
    pub temperature: f32,

    /// Persona / prompt prefix.
    pub system_instruction: String,

    /// Master switch. When false no message is processed.
    pub is_active: bool,

    /// Normalized phone numbers (digits only) allowed to trigger replies.
    pub allowed_numbers: Vec<String>,

    /// When true only senders in `allowed_numbers` are answered.
    pub only_allowed: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            model: ModelType::default(),
            temperature: 0.7,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            is_active: true,
            allowed_numbers: Vec::new(),
            only_allowed: true,
        }
    }
}

impl BotConfig {
    /// Apply a partial update. Present fields overwrite, absent fields are kept.
    pub fn apply(&mut self, patch: BotConfigPatch) {
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(temperature) = patch.temperature {
            self.temperature = temperature;
        }
        if let Some(system_instruction) = patch.system_instruction {
            self.system_instruction = system_instruction;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(allowed_numbers) = patch.allowed_numbers {
            self.allowed_numbers = allowed_numbers;
        }
        if let Some(only_allowed) = patch.only_allowed {
            self.only_allowed = only_allowed;
        }
        self.normalize();
    }

    /// Enforce the whitelist invariant: unique, digit-only, plausible length.
    pub fn normalize(&mut self) {
        self.allowed_numbers = normalize_allowed_numbers(&self.allowed_numbers);
    }

    /// Check whether a normalized sender number is whitelisted.
    pub fn is_allowed(&self, number: &str) -> bool {
        self.allowed_numbers.iter().any(|n| n == number)
    }
}

/// A partial configuration update as sent by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_numbers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_allowed: Option<bool>,
}

/// Strip everything but ASCII digits.
///
/// Returns `None` if the result is too short to be a phone number.
pub fn normalize_number(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() > MIN_NUMBER_DIGITS).then_some(digits)
}

/// Normalize a whitelist, dropping invalid entries and duplicates.
///
/// The first occurrence of each number keeps its position.
pub fn normalize_allowed_numbers(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for number in raw.iter().filter_map(|n| normalize_number(n)) {
        if !out.contains(&number) {
            out.push(number);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BotConfig::default();
        assert_eq!(config.model, ModelType::Flash);
        assert!(config.is_active);
        assert!(config.only_allowed);
        assert!(config.allowed_numbers.is_empty());
    }

    #[test]
    fn test_partial_document_merges_over_defaults() {
        let config: BotConfig =
            serde_json::from_str(r#"{"temperature": 0.2, "isActive": false}"#).unwrap();
        assert_eq!(config.temperature, 0.2);
        assert!(!config.is_active);
        assert_eq!(config.system_instruction, DEFAULT_SYSTEM_INSTRUCTION);
        assert!(config.only_allowed);
    }

    #[test]
    fn test_model_wire_names() {
        let json = serde_json::to_string(&ModelType::Pro).unwrap();
        assert_eq!(json, "\"gemini-3-pro-preview\"");
        let model: ModelType = serde_json::from_str("\"gemini-2.5-flash\"").unwrap();
        assert_eq!(model, ModelType::Flash);
    }

    #[test]
    fn test_apply_patch_keeps_absent_fields() {
        let mut config = BotConfig::default();
        config.apply(BotConfigPatch {
            only_allowed: Some(false),
            ..Default::default()
        });
        assert!(!config.only_allowed);
        assert!(config.is_active);
        assert_eq!(config.temperature, 0.7);
    }

    #[test]
    fn test_apply_patch_normalizes_numbers() {
        let mut config = BotConfig::default();
        config.apply(BotConfigPatch {
            allowed_numbers: Some(vec![
                "+55 (11) 99999-8888".to_string(),
                "5511999998888".to_string(),
                "1234".to_string(),
            ]),
            ..Default::default()
        });
        assert_eq!(config.allowed_numbers, vec!["5511999998888".to_string()]);
    }

    #[test]
    fn test_normalize_number() {
        assert_eq!(normalize_number("55 11 99999 8888"), Some("5511999998888".to_string()));
        assert_eq!(normalize_number("12345678"), None);
        assert_eq!(normalize_number("123456789"), Some("123456789".to_string()));
    }

    #[test]
    fn test_patch_deserializes_camel_case() {
        let patch: BotConfigPatch =
            serde_json::from_str(r#"{"systemInstruction": "Be terse", "onlyAllowed": true}"#)
                .unwrap();
        assert_eq!(patch.system_instruction.as_deref(), Some("Be terse"));
        assert_eq!(patch.only_allowed, Some(true));
        assert!(patch.model.is_none());
    }
}
