//! Text measurement and layout helpers using cosmic-text.

use crate::style::{TextAlign, TextBaseline};
use cosmic_text::{Attrs, Buffer, CacheKeyFlags, Family, FontSystem, Metrics, Shaping, Style, Weight};

/// Line height used for shaping, as a multiple of the font size.
pub(crate) const LINE_HEIGHT: f32 = 1.2;

/// Font selection for text drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Family name. Unknown families fall back to the generic sans-serif face.
    pub family: String,
    /// Font size in pixels.
    pub size_px: f32,
    /// Weight (100-900).
    pub weight: u16,
    /// Italic style.
    pub italic: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size_px: 10.0,
            weight: 400,
            italic: false,
        }
    }
}

/// Line metrics of shaped text.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TextMetrics {
    /// Advance width of the text in pixels.
    pub width: f32,
    /// Distance from baseline to the top of the line box.
    pub ascent: f32,
    /// Distance from baseline to the bottom of the line box.
    pub descent: f32,
}

/// Map a family name onto a cosmic-text family, falling back to sans-serif.
pub(crate) fn resolve_family<'a>(font_system: &FontSystem, family: &'a str) -> Family<'a> {
    match family.to_ascii_lowercase().as_str() {
        "sans-serif" => return Family::SansSerif,
        "serif" => return Family::Serif,
        "monospace" => return Family::Monospace,
        _ => {}
    }
    let found = font_system.db().faces().any(|face| {
        face.families
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(family))
    });
    if found {
        Family::Name(family)
    } else {
        log::debug!(target: "canvas", "font family {:?} not loaded, using sans-serif", family);
        Family::SansSerif
    }
}

/// Whether the font database holds at least one face.
///
/// cosmic-text panics when shaping against an empty database.
pub(crate) fn has_faces(font_system: &FontSystem) -> bool {
    font_system.db().faces().next().is_some()
}

/// Shape `text` into a cosmic-text buffer.
///
/// The font database must hold at least one face (see `has_faces`).
pub(crate) fn shape_text(
    font_system: &mut FontSystem,
    text: &str,
    font: &FontSpec,
    letter_spacing: f32,
    hinting_enabled: bool,
) -> Buffer {
    let metrics = Metrics::new(font.size_px, font.size_px * LINE_HEIGHT);
    let mut buffer = Buffer::new(font_system, metrics);

    let family = resolve_family(font_system, &font.family);
    let flags = if hinting_enabled {
        CacheKeyFlags::empty()
    } else {
        CacheKeyFlags::DISABLE_HINTING
    };
    let attrs = Attrs::new()
        .family(family)
        .weight(Weight(font.weight))
        .style(if font.italic { Style::Italic } else { Style::Normal })
        .letter_spacing(letter_spacing)
        .cache_key_flags(flags);

    buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);
    buffer
}

/// Measure shaped text.
pub(crate) fn buffer_metrics(buffer: &Buffer, font: &FontSpec) -> TextMetrics {
    let mut width: f32 = 0.0;
    let mut ascent: f32 = 0.0;
    let mut descent: f32 = 0.0;
    for run in buffer.layout_runs() {
        width = width.max(run.line_w);
        ascent = ascent.max(run.line_y - run.line_top);
        descent = descent.max((run.line_top + run.line_height) - run.line_y);
    }
    if ascent == 0.0 && descent == 0.0 {
        ascent = font.size_px * 0.8;
        descent = font.size_px * 0.2;
    }
    TextMetrics {
        width,
        ascent,
        descent,
    }
}

/// Calculate X offset for text alignment.
pub(crate) fn calculate_text_x_offset(width: f32, align: TextAlign) -> f32 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Right => -width,
        TextAlign::Center => -width / 2.0,
    }
}

/// Calculate the offset from the anchor y to the alphabetic baseline.
pub(crate) fn calculate_text_y_offset(ascent: f32, descent: f32, baseline: TextBaseline) -> f32 {
    match baseline {
        TextBaseline::Top => ascent,
        TextBaseline::Middle => (ascent - descent) / 2.0,
        TextBaseline::Alphabetic => 0.0,
        TextBaseline::Bottom => -descent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_offset() {
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Left), 0.0);
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Center), -50.0);
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Right), -100.0);
    }

    #[test]
    fn test_y_offset() {
        assert_eq!(calculate_text_y_offset(16.0, 4.0, TextBaseline::Top), 16.0);
        assert_eq!(calculate_text_y_offset(16.0, 4.0, TextBaseline::Middle), 6.0);
        assert_eq!(calculate_text_y_offset(16.0, 4.0, TextBaseline::Alphabetic), 0.0);
        assert_eq!(calculate_text_y_offset(16.0, 4.0, TextBaseline::Bottom), -4.0);
    }

    #[test]
    fn test_empty_database_has_no_faces() {
        let font_system = FontSystem::new_with_locale_and_db("en".to_string(), fontdb::Database::new());
        assert!(!has_faces(&font_system));
    }
}
