//! Declarative description of a composed poster.

use crate::color::HexColor;
use crate::decorations::Shadow;
use crate::path::{PathSegment, Rect};
use crate::styles::BasemapTheme;
use crate::texture::Texture;
use serde::Serialize;
use std::collections::BTreeSet;

/// Canonical composition size. Every scene is laid out at this resolution.
pub const DESIGN_WIDTH: u32 = 800;
pub const DESIGN_HEIGHT: u32 = 1000;

/// What the basemap provider is asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasemapRequest {
    pub lat: f64,
    pub lng: f64,
    pub zoom: f64,
    /// Style id as written in the design (may be unknown to the registry).
    pub style_id: String,
    pub theme: BasemapTheme,
}

/// Vertical anchoring of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAnchor {
    /// `y` is the top of the line box.
    Top,
    /// `y` is the alphabetic baseline.
    Baseline,
}

/// A single line of horizontally centered text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub text: String,
    /// Horizontal center.
    pub x: f32,
    pub y: f32,
    pub anchor: TextAnchor,
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,
    /// Extra space between letters, in design pixels.
    pub letter_spacing: f32,
    pub color: HexColor,
    /// Text wider than this is compressed horizontally.
    pub max_width: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        color: HexColor,
    },
    Texture {
        rect: Rect,
        texture: Texture,
        opacity: f32,
    },
    FillPath {
        path: Vec<PathSegment>,
        color: HexColor,
        shadow: Option<Shadow>,
    },
    StrokePath {
        path: Vec<PathSegment>,
        color: HexColor,
        width: f32,
    },
    /// Basemap bitmap covering `dest`, clipped to `clip`.
    Basemap {
        request: BasemapRequest,
        dest: Rect,
        clip: Vec<PathSegment>,
    },
    Text(TextRun),
}

/// An ordered list of draw operations at design resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Human-readable name, used for artifact filenames and document titles.
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Color the scene is flattened onto and letterboxed with.
    pub background: HexColor,
    pub ops: Vec<DrawOp>,
}

impl Scene {
    /// Every font family referenced by text runs, sorted and deduplicated.
    pub fn font_families(&self) -> Vec<String> {
        self.text_runs()
            .map(|run| run.font_family.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(run) => Some(run),
            _ => None,
        })
    }

    /// Basemap requests and their destination boxes, in paint order.
    pub fn basemap_requests(&self) -> impl Iterator<Item = (&BasemapRequest, &Rect)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Basemap { request, dest, .. } => Some((request, dest)),
            _ => None,
        })
    }
}
