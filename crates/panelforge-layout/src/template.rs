#![forbid(unsafe_code)]

//! Named page layout presets.
//!
//! A [`Template`] is a list of rectangles authored against a reference page
//! size. Applying one scales every rectangle to the target page, clamps it,
//! and keeps template order as reading order. Applying is destructive;
//! confirming that intent is the caller's job.

use panelforge_core::geometry::{Rect, Size, clamp};
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Reference page size the built-in catalog is authored against.
pub const TEMPLATE_REFERENCE_SIZE: Size = Size::new(800, 1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStyle {
    Grid,
    Manga,
    Splash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub style: TemplateStyle,
    #[serde(default = "default_reference_size")]
    pub reference_size: Size,
    pub panels: Vec<Rect>,
}

fn default_reference_size() -> Size {
    TEMPLATE_REFERENCE_SIZE
}

impl Template {
    fn builtin(id: &str, name: &str, style: TemplateStyle, panels: &[(i32, i32, i32, i32)]) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            style,
            reference_size: TEMPLATE_REFERENCE_SIZE,
            panels: panels
                .iter()
                .map(|&(x, y, w, h)| Rect::new(x, y, w, h))
                .collect(),
        }
    }

    /// Template rectangles scaled to `page` and clamped, in reading order.
    #[must_use]
    pub fn layout_for(&self, page: Size, min_size: i32) -> Vec<Rect> {
        self.panels
            .iter()
            .map(|rect| clamp(rect.scaled(self.reference_size, page), page, min_size))
            .collect()
    }
}

/// Ordered collection of templates, looked up by id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    #[must_use]
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// The presets shipped with the editor.
    #[must_use]
    pub fn builtin() -> Self {
        use TemplateStyle::{Grid, Manga, Splash};
        Self::new(vec![
            Template::builtin(
                "grid-2x2",
                "Four panel grid",
                Grid,
                &[
                    (20, 20, 370, 470),
                    (410, 20, 370, 470),
                    (20, 510, 370, 470),
                    (410, 510, 370, 470),
                ],
            ),
            Template::builtin(
                "grid-2x3",
                "Six panel grid",
                Grid,
                &[
                    (20, 20, 370, 306),
                    (410, 20, 370, 306),
                    (20, 346, 370, 306),
                    (410, 346, 370, 306),
                    (20, 672, 370, 306),
                    (410, 672, 370, 306),
                ],
            ),
            Template::builtin(
                "grid-3x3",
                "Nine panel grid",
                Grid,
                &[
                    (20, 20, 240, 306),
                    (280, 20, 240, 306),
                    (540, 20, 240, 306),
                    (20, 346, 240, 306),
                    (280, 346, 240, 306),
                    (540, 346, 240, 306),
                    (20, 672, 240, 306),
                    (280, 672, 240, 306),
                    (540, 672, 240, 306),
                ],
            ),
            // Manga pages read right to left within a row.
            Template::builtin(
                "manga-action",
                "Manga action",
                Manga,
                &[(20, 20, 760, 460), (510, 500, 270, 480), (20, 500, 470, 480)],
            ),
            Template::builtin(
                "manga-dialogue",
                "Manga dialogue",
                Manga,
                &[
                    (20, 20, 760, 220),
                    (410, 260, 370, 340),
                    (20, 260, 370, 340),
                    (20, 620, 760, 360),
                ],
            ),
            Template::builtin("splash-full", "Full splash", Splash, &[(0, 0, 800, 1000)]),
            Template::builtin(
                "splash-inset",
                "Splash with inset",
                Splash,
                &[(0, 0, 800, 1000), (500, 700, 260, 260)],
            ),
        ])
    }

    /// Load a catalog from `{"templates": [...]}` JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|template| template.id == id)
    }

    /// Like [`get`](Self::get), but as a `Result` for `?` chains.
    pub fn require(&self, id: &str) -> Result<&Template, LayoutError> {
        self.get(id).ok_or_else(|| LayoutError::UnknownTemplate { id: id.to_owned() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
