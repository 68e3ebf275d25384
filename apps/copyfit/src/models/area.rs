use serde::{Deserialize, Serialize};

use crate::errors::{CopyfitError, Result};
use crate::models::role::RoleKind;

// ────────────────────────────────────────────────────────────────────────────
// Geometry and constraints
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Align {
    #[serde(default)]
    pub h: HAlign,
    #[serde(default)]
    pub v: VAlign,
}

/// Line-count limit: either a fixed maximum or a `{min, max}` range.
/// Only `max` constrains fitting; `min` is advisory for copywriters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxLines {
    Fixed(u32),
    Range { min: u32, max: u32 },
}

impl MaxLines {
    pub fn max(&self) -> u32 {
        match *self {
            MaxLines::Fixed(n) => n,
            MaxLines::Range { max, .. } => max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineHeight {
    /// Line height as a multiple of font size.
    pub value: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Optical {
    /// Cap height (px) the template designer intended for this area.
    pub target_cap_height_px: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSizing {
    /// Cap height as a fraction of font size for the template font.
    pub cap_height_ratio: f32,
    #[serde(default)]
    pub optical: Option<Optical>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    pub max_lines: MaxLines,
    pub min_font: u32,
    pub line_height: LineHeight,
    pub font_sizing: FontSizing,
}

// ────────────────────────────────────────────────────────────────────────────
// Area
// ────────────────────────────────────────────────────────────────────────────

/// A fixed rectangular region of a template where one text role renders.
///
/// `kind` is filled in by `Template::new` from the role/id naming; it is never
/// recomputed by downstream code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub role: String,
    pub shape: Shape,
    #[serde(default)]
    pub align: Align,
    pub constraints: Constraints,
    /// Optional areas are dropped from the render when their copy fails to fit.
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub kind: RoleKind,
}

impl Area {
    pub fn max_lines(&self) -> u32 {
        self.constraints.max_lines.max()
    }

    pub fn line_height(&self) -> f32 {
        self.constraints.line_height.value
    }

    pub fn is_single_line(&self) -> bool {
        self.max_lines() == 1
    }

    fn check(&self) -> Result<()> {
        let c = &self.constraints;
        let problem = if self.shape.w <= 0.0 || self.shape.h <= 0.0 {
            Some("shape must have positive width and height")
        } else if c.max_lines.max() == 0 {
            Some("maxLines must be at least 1")
        } else if c.min_font == 0 {
            Some("minFont must be positive")
        } else if c.line_height.value <= 0.0 {
            Some("lineHeight must be positive")
        } else if c.font_sizing.cap_height_ratio <= 0.0 {
            Some("capHeightRatio must be positive")
        } else {
            None
        };
        match problem {
            Some(msg) => Err(CopyfitError::InvalidTemplate(format!(
                "area '{}': {msg}",
                self.id
            ))),
            None => Ok(()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Template
// ────────────────────────────────────────────────────────────────────────────

/// Immutable template definition: canvas width plus its areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub canvas_width: f32,
    pub areas: Vec<Area>,
}

impl Template {
    /// Validates geometry and attaches a `RoleKind` to every area.
    pub fn new(id: impl Into<String>, canvas_width: f32, mut areas: Vec<Area>) -> Result<Self> {
        for area in &mut areas {
            area.check()?;
            area.kind = RoleKind::classify(&area.role, &area.id);
        }
        Ok(Template {
            id: id.into(),
            canvas_width,
            areas,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: Template = serde_json::from_str(raw)?;
        Template::new(parsed.id, parsed.canvas_width, parsed.areas)
    }

    /// Areas carrying `role`, in template order.
    pub fn areas_for_role(&self, role: &str) -> Vec<&Area> {
        self.areas.iter().filter(|a| a.role == role).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE_JSON: &str = r#"{
        "id": "promo-square",
        "canvasWidth": 1080,
        "areas": [
            {
                "id": "h1",
                "role": "headline",
                "shape": {"x": 72, "y": 80, "w": 936, "h": 460},
                "constraints": {
                    "maxLines": {"min": 2, "max": 3},
                    "minFont": 32,
                    "lineHeight": {"value": 1.1},
                    "fontSizing": {"capHeightRatio": 0.7, "optical": {"targetCapHeightPx": 100}}
                }
            },
            {
                "id": "btn",
                "role": "cta",
                "shape": {"x": 72, "y": 900, "w": 400, "h": 90},
                "align": {"h": "center", "v": "middle"},
                "constraints": {
                    "maxLines": 1,
                    "minFont": 20,
                    "lineHeight": {"value": 1.0},
                    "fontSizing": {"capHeightRatio": 0.7}
                }
            }
        ]
    }"#;

    #[test]
    fn test_from_json_classifies_kinds() {
        let t = Template::from_json(TEMPLATE_JSON).expect("valid template");
        assert_eq!(t.areas[0].kind, RoleKind::Headline);
        assert_eq!(t.areas[1].kind, RoleKind::Cta);
        assert_eq!(t.areas[0].max_lines(), 3);
        assert!(t.areas[1].is_single_line());
        assert_eq!(t.areas[1].align.h, HAlign::Center);
    }

    #[test]
    fn test_zero_width_area_rejected() {
        let bad = TEMPLATE_JSON.replace("\"w\": 400", "\"w\": 0");
        let err = Template::from_json(&bad).unwrap_err();
        assert!(matches!(err, CopyfitError::InvalidTemplate(_)));
    }

    #[test]
    fn test_areas_for_role_keeps_order() {
        let a = fixtures::area("b1", "bullets", 300.0, 60.0, MaxLines::Fixed(1), 14);
        let b = fixtures::area("b2", "bullets", 300.0, 60.0, MaxLines::Fixed(1), 14);
        let t = Template::new("t", 1080.0, vec![a, b]).unwrap();
        let ids: Vec<&str> = t.areas_for_role("bullets").iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2"]);
    }
}
