//! Document configuration.
//!
//! ```
//! use spark_bridge::config::DocumentConfig;
//!
//! let config = DocumentConfig::from_json(r##"{
//!     "spacingScale": 8,
//!     "initialStyleSheet": { "card": { "bgColor": "#222", "padding": 12 } }
//! }"##).unwrap();
//!
//! assert_eq!(config.spacing_scale, 8.0);
//! assert_eq!(config.fallback_kind, "div");
//! assert!(config.initial_style_sheet.contains_key("card"));
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::props::{PropValue, StyleObject};
use crate::style::{Compiler, StyleSheet, DEFAULT_SPACING_SCALE};

/// Settings for a [`Document`](crate::reconciler::Document).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentConfig {
    /// Element kinds that absorb all-text children as their `children` prop.
    pub text_kinds: Vec<String>,
    /// Kind used for element types the registry does not know.
    pub fallback_kind: String,
    /// Pixels per spacing step.
    pub spacing_scale: f64,
    /// Class name → style object. Wins over the compiler.
    pub initial_style_sheet: IndexMap<String, Value>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            text_kinds: vec!["label".into(), "button".into()],
            fallback_kind: "div".into(),
            spacing_scale: DEFAULT_SPACING_SCALE,
            initial_style_sheet: IndexMap::new(),
        }
    }
}

impl DocumentConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.spacing_scale.is_finite() || self.spacing_scale <= 0.0 {
            return Err(Error::Config(format!(
                "spacingScale must be a positive number, got {}",
                self.spacing_scale
            )));
        }
        if self.fallback_kind.trim().is_empty() {
            return Err(Error::Config("fallbackKind must not be blank".into()));
        }
        for (class, style) in &self.initial_style_sheet {
            if !style.is_object() {
                return Err(Error::Config(format!(
                    "initialStyleSheet entry {class:?} is not an object"
                )));
            }
        }
        Ok(())
    }

    /// True if `kind` absorbs all-text children.
    pub fn is_text_kind(&self, kind: &str) -> bool {
        self.text_kinds.iter().any(|k| k.eq_ignore_ascii_case(kind))
    }

    /// Build the shared style sheet described by this configuration.
    pub fn style_sheet(&self) -> StyleSheet {
        let initial = self.initial_style_sheet.iter().filter_map(|(class, style)| {
            let PropValue::Map(map) = PropValue::from_json(style) else {
                return None;
            };
            let style: StyleObject = map.as_ref().clone();
            Some((class.clone(), style))
        });
        StyleSheet::with_initial(Compiler::new(self.spacing_scale), initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgba;

    #[test]
    fn test_defaults() {
        let config = DocumentConfig::default();
        assert!(config.is_text_kind("label"));
        assert!(config.is_text_kind("Button"));
        assert!(!config.is_text_kind("div"));
        assert_eq!(config.spacing_scale, 4.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DocumentConfig::from_json(r#"{ "textKinds": ["label"] }"#).unwrap();
        assert!(!config.is_text_kind("button"));
        assert_eq!(config.fallback_kind, "div");
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            DocumentConfig::from_json(r#"{ "spacingScale": 0 }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            DocumentConfig::from_json(r#"{ "initialStyleSheet": { "x": 3 } }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(DocumentConfig::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_style_sheet_seeded_from_config() {
        let config = DocumentConfig::from_json(
            r#"{ "spacingScale": 2, "initialStyleSheet": { "p-4": { "padding": 1 } } }"#,
        )
        .unwrap();
        let sheet = config.style_sheet();
        assert_eq!(sheet.resolve("p-4").unwrap()["padding"].as_f64(), Some(1.0));
        assert_eq!(sheet.resolve("p-2").unwrap()["padding"].as_f64(), Some(4.0));
    }

    #[test]
    fn test_hex_colors_in_initial_sheet() {
        let config = DocumentConfig::from_json(
            r##"{ "initialStyleSheet": { "card": { "bgColor": "#222", "padding": 12 } } }"##,
        )
        .unwrap();
        let card = config.style_sheet().resolve("card").unwrap();
        assert_eq!(card["bgColor"].as_color(), Some(Rgba::rgb(0x22, 0x22, 0x22)));
        assert_eq!(card["padding"].as_f64(), Some(12.0));
    }
}
