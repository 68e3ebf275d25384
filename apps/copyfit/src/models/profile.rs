use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::FontSpec;

/// Per-role typographic overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleStyle {
    #[serde(default)]
    pub uppercase: bool,
    #[serde(default)]
    pub weight: Option<u16>,
    /// Forced text color (hex); bypasses contrast picking for this role.
    #[serde(default)]
    pub color: Option<String>,
}

/// Rendering profile threaded explicitly into every fitting call.
///
/// Replaces process-wide style toggles: two fits with different profiles never
/// interfere with each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderProfile {
    pub font: FontSpec,
    /// BCP-47-ish locale tag ("en", "de-DE") used for hyphenation.
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub roles: HashMap<String, RoleStyle>,
}

impl RenderProfile {
    pub fn new(font: FontSpec) -> Self {
        RenderProfile {
            font,
            locale: None,
            roles: HashMap::new(),
        }
    }

    pub fn style_for(&self, role: &str) -> RoleStyle {
        self.roles.get(role).cloned().unwrap_or_default()
    }

    /// Font used for `role`, after applying any weight override.
    pub fn font_for(&self, role: &str) -> FontSpec {
        let mut font = self.font;
        if let Some(weight) = self.roles.get(role).and_then(|s| s.weight) {
            font.weight = weight;
        }
        font
    }

    /// Applies the role's case transform to `text`.
    pub fn transform_text(&self, role: &str, text: &str) -> String {
        if self.roles.get(role).is_some_and(|s| s.uppercase) {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }
}
