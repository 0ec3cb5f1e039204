//! Theme settings
//!
//! Projects carry two theme payloads: the typed `themeSettings` object and a
//! legacy `theme` field that may be a JSON string or an object. Both are
//! modelled as optional fields only; precedence is resolved by the services
//! crate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::lenient;

/// New-style theme settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    pub font_family: Option<String>,
    pub primary_color: Option<String>,
    pub hover_color: Option<String>,
    pub button_text_color: Option<String>,
    pub custom_plan_button_color: Option<String>,
    pub custom_plan_button_text_color: Option<String>,
    pub popular_badge_border_color: Option<String>,
    pub popular_badge_color: Option<String>,
    pub popular_badge_text_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub border_radius: Option<String>,
    pub pricing_background_color: Option<String>,
    pub pricing_border_color: Option<String>,
    pub pricing_description_color: Option<String>,
    pub pricing_header_background_color: Option<String>,
    pub pricing_header_text_color: Option<String>,
    pub pricing_price_color: Option<String>,
    pub pricing_text_color: Option<String>,
    pub font_color: Option<String>,
    pub custom_plan_card_button_color: Option<String>,
    pub custom_plan_card_button_text_color: Option<String>,
    pub custom_plan_card_background_color: Option<String>,
    pub custom_plan_card_font_family: Option<String>,
    pub custom_plan_card_border_color: Option<String>,
    pub custom_plan_card_border_width: Option<String>,
    #[serde(rename = "customCSS")]
    pub custom_css: Option<String>,
    pub show_pricing_header: Option<bool>,
    pub show_project_name: Option<bool>,
}

/// Legacy theme payload
///
/// Only the keys that still participate in resolution are kept.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTheme {
    pub font_family: Option<String>,
    pub primary_color: Option<String>,
    pub button_text_color: Option<String>,
    pub font_color: Option<String>,
    pub custom_plan_button_color: Option<String>,
    pub custom_plan_button_text_color: Option<String>,
    pub popular_badge_color: Option<String>,
    pub popular_badge_border_color: Option<String>,
    pub popular_badge_text_color: Option<String>,
}

impl LegacyTheme {
    /// Parse the raw `theme` field
    ///
    /// Accepts a JSON object or a string containing one. Anything else,
    /// including malformed JSON, yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let parsed = match value {
            Value::String(raw) => serde_json::from_str::<Value>(raw).ok()?,
            Value::Object(_) => value.clone(),
            _ => return None,
        };

        match serde_json::from_value::<LegacyTheme>(parsed) {
            Ok(theme) => Some(theme),
            Err(e) => {
                debug!("Ignoring malformed legacy theme: {}", e);
                None
            }
        }
    }
}
