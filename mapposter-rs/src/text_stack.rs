//! Vertical stacking of the text block beneath the frame.
//!
//! Visible elements are laid out top to bottom in a fixed order. Hidden
//! elements are skipped without leaving a gap, so the block closes up when
//! the customer turns lines off.

use crate::design::{Design, SizeTier};
use crate::frame::FrameGeometry;
use serde::Serialize;

/// Distance from the frame bottom to the first line.
pub const GAP_BELOW_FRAME: f32 = 40.0;
/// Gap between consecutive elements before the line-spacing multiplier.
pub const ELEMENT_GAP: f32 = 14.0;
/// Line box height as a multiple of font size.
pub const LINE_HEIGHT: f32 = 1.2;
/// Extra drop applied when the city is the only visible line, for optical centering.
pub const LONE_CITY_NUDGE: f32 = 24.0;

pub const CITY_FONT_SIZE: f32 = 64.0;
pub const COORDINATES_FONT_SIZE: f32 = 20.0;
pub const COUNTRY_FONT_SIZE: f32 = 26.0;
pub const MESSAGE_FONT_SIZE: f32 = 24.0;
pub const HEADLINE_FONT_SIZE: f32 = 44.0;

/// Text elements of the stack, in stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextElement {
    City,
    Coordinates,
    Country,
    Message,
}

impl TextElement {
    pub const ORDER: [TextElement; 4] = [
        TextElement::City,
        TextElement::Coordinates,
        TextElement::Country,
        TextElement::Message,
    ];

    pub fn base_font_size(&self) -> f32 {
        match self {
            TextElement::City => CITY_FONT_SIZE,
            TextElement::Coordinates => COORDINATES_FONT_SIZE,
            TextElement::Country => COUNTRY_FONT_SIZE,
            TextElement::Message => MESSAGE_FONT_SIZE,
        }
    }

    pub fn tier_multiplier(&self, tier: SizeTier) -> f32 {
        match self {
            // The custom message gets a bigger "L" for emphasis
            TextElement::Message => message_tier(tier),
            _ => match tier {
                SizeTier::S => 0.8,
                SizeTier::M => 1.0,
                SizeTier::L => 1.2,
            },
        }
    }

    /// Tracking in em before the letter-spacing multiplier.
    pub fn tracking_em(&self) -> f32 {
        match self {
            TextElement::City => 0.12,
            TextElement::Coordinates => 0.05,
            TextElement::Country => 0.2,
            TextElement::Message => 0.02,
        }
    }
}

fn message_tier(tier: SizeTier) -> f32 {
    match tier {
        SizeTier::S => 0.75,
        SizeTier::M => 1.0,
        SizeTier::L => 1.56,
    }
}

/// Headline size multiplier.
pub fn headline_tier(tier: SizeTier) -> f32 {
    match tier {
        SizeTier::S => 0.75,
        SizeTier::M => 1.0,
        SizeTier::L => 1.5,
    }
}

/// One placed element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStackEntry {
    pub element: TextElement,
    /// Top of the element's line box.
    pub y: f32,
    /// Height of the line box(es).
    pub height: f32,
    pub font_size: f32,
    /// Number of lines (2 for a city containing a line break).
    pub lines: u32,
}

/// Placement of every visible element, in stacking order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TextStackLayout {
    pub entries: Vec<TextStackEntry>,
}

impl TextStackLayout {
    pub fn get(&self, element: TextElement) -> Option<&TextStackEntry> {
        self.entries.iter().find(|entry| entry.element == element)
    }

    pub fn position(&self, element: TextElement) -> Option<f32> {
        self.get(element).map(|entry| entry.y)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Bottom of the last line box.
    pub fn bottom(&self) -> Option<f32> {
        self.entries.last().map(|entry| entry.y + entry.height)
    }
}

/// Which elements are visible, with their size tier and line count.
pub fn visible_elements(design: &Design) -> Vec<(TextElement, SizeTier, u32)> {
    let text = &design.text;
    TextElement::ORDER
        .into_iter()
        .filter_map(|element| match element {
            TextElement::City if text.show_city && !design.location.name.trim().is_empty() => {
                let lines = if design.location.name.contains('\n') { 2 } else { 1 };
                Some((element, text.city.size, lines))
            }
            TextElement::Coordinates if text.show_coordinates => {
                Some((element, text.coordinates.size, 1))
            }
            TextElement::Country
                if text.show_country && !design.location.country.trim().is_empty() =>
            {
                Some((element, text.country.size, 1))
            }
            TextElement::Message if text.message.is_present() => {
                Some((element, text.message.size, 1))
            }
            _ => None,
        })
        .collect()
}

/// Compute the vertical position of every visible text element.
pub fn compute_text_positions(design: &Design, frame: &FrameGeometry) -> TextStackLayout {
    let gap = ELEMENT_GAP * design.style.line_spacing as f32;
    let visible = visible_elements(design);
    let lone_city = matches!(visible.as_slice(), [(TextElement::City, _, _)]);

    let mut cursor = frame.bottom() + GAP_BELOW_FRAME;
    if lone_city {
        cursor += LONE_CITY_NUDGE;
    }

    let mut entries = Vec::with_capacity(visible.len());
    for (element, tier, lines) in visible {
        let font_size = element.base_font_size() * element.tier_multiplier(tier);
        let height = font_size * LINE_HEIGHT * lines as f32;
        entries.push(TextStackEntry {
            element,
            y: cursor,
            height,
            font_size,
            lines,
        });
        cursor += height + gap;
    }

    log::debug!("Text stack: {:?}", entries);
    TextStackLayout { entries }
}
