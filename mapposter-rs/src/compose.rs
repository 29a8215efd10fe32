//! Composition of a design into a scene.

use crate::color::HexColor;
use crate::decorations::{glow_shape, pin_parts};
use crate::design::Design;
use crate::frame::{frame_geometry, FrameGeometry};
use crate::path::Rect;
use crate::scene::{BasemapRequest, DrawOp, Scene, TextAnchor, TextRun, DESIGN_HEIGHT, DESIGN_WIDTH};
use crate::styles::{resolve_style, MapStyle};
use crate::text_stack::{
    compute_text_positions, headline_tier, TextElement, TextStackLayout, HEADLINE_FONT_SIZE,
    LINE_HEIGHT,
};

/// Distance from the frame top up to the headline baseline.
pub const HEADLINE_OFFSET: f32 = 36.0;
pub const FRAME_BORDER_WIDTH: f32 = 4.0;
/// Horizontal margin text is kept within.
pub const TEXT_MARGIN: f32 = 60.0;
pub const HEADLINE_TRACKING_EM: f32 = 0.02;

const WATERMARK_FONT_SIZE: f32 = 14.0;
const WATERMARK_BOTTOM_OFFSET: f32 = 24.0;
const WATERMARK_ALPHA: f32 = 0.35;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeOptions {
    /// Text stamped along the bottom edge, e.g. for previews.
    pub watermark: Option<String>,
}

/// Colors after applying overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedColors {
    pub background: HexColor,
    pub text: HexColor,
}

/// Background: custom color over style. Text: font color over the custom
/// background's paired text color over the style's text color.
pub fn resolve_colors(design: &Design, style: &MapStyle) -> ResolvedColors {
    let custom = design.style.background.as_ref();
    ResolvedColors {
        background: custom.map(|bg| bg.color).unwrap_or(style.background),
        text: design
            .style
            .font_color
            .or_else(|| custom.and_then(|bg| bg.text_color))
            .unwrap_or(style.text_color),
    }
}

/// Lay out a design as an ordered scene.
///
/// Paint order: background, texture, glow, clipped basemap, headline,
/// frame border, pin, text stack, watermark. Pure: the same design and
/// options always yield an equal scene.
pub fn compose(design: &Design, options: &ComposeOptions) -> Scene {
    let style = resolve_style(&design.map.style);
    let colors = resolve_colors(design, style);
    let headline = design.text.headline.display_text();
    let frame = frame_geometry(design.frame.shape, headline.is_some());
    let stack = compute_text_positions(design, &frame);
    let page = Rect::new(0.0, 0.0, DESIGN_WIDTH as f32, DESIGN_HEIGHT as f32);

    let mut ops = vec![DrawOp::FillRect {
        rect: page,
        color: colors.background,
    }];

    if let Some(background) = &design.style.background {
        if let Some(texture) = background.texture {
            if background.texture_opacity > 0.0 {
                ops.push(DrawOp::Texture {
                    rect: page,
                    texture,
                    opacity: background.texture_opacity as f32,
                });
            }
        }
    }

    if design.glow.enabled {
        if let Some((path, color, shadow)) = glow_shape(
            &frame,
            design.glow.style,
            design.glow.intensity as f32,
            colors.text,
        ) {
            ops.push(DrawOp::FillPath {
                path,
                color,
                shadow: Some(shadow),
            });
        }
    }

    ops.push(DrawOp::Basemap {
        request: BasemapRequest {
            lat: design.location.lat,
            lng: design.location.lng,
            zoom: design.map.zoom,
            style_id: design.map.style.clone(),
            theme: style.basemap,
        },
        dest: frame.rect,
        clip: frame.clip_path(),
    });

    if let Some(text) = headline {
        let font_size = HEADLINE_FONT_SIZE * headline_tier(design.text.headline.size);
        ops.push(DrawOp::Text(TextRun {
            text,
            x: frame.center().0,
            y: frame.y() - HEADLINE_OFFSET,
            anchor: TextAnchor::Baseline,
            font_family: design.text.headline.font.clone(),
            font_size,
            font_weight: 400,
            letter_spacing: HEADLINE_TRACKING_EM * font_size * design.style.letter_spacing as f32,
            color: colors.text,
            max_width: Some(page.width - 2.0 * TEXT_MARGIN),
        }));
    }

    if design.frame.border {
        ops.push(DrawOp::StrokePath {
            path: frame.outline_path(),
            color: colors.text,
            width: FRAME_BORDER_WIDTH,
        });
    }

    if design.pin.enabled {
        let (cx, cy) = frame.center();
        for part in pin_parts(design.pin.style, design.pin.size, design.pin.color, cx, cy) {
            ops.push(DrawOp::FillPath {
                path: part.path,
                color: part.color,
                shadow: part.shadow,
            });
        }
    }

    push_text_stack(&mut ops, design, &frame, &stack, colors.text);

    if let Some(watermark) = options.watermark.as_deref().filter(|w| !w.trim().is_empty()) {
        ops.push(DrawOp::Text(TextRun {
            text: watermark.to_string(),
            x: page.width / 2.0,
            y: page.height - WATERMARK_BOTTOM_OFFSET,
            anchor: TextAnchor::Baseline,
            font_family: "sans-serif".to_string(),
            font_size: WATERMARK_FONT_SIZE,
            font_weight: 400,
            letter_spacing: 0.2 * WATERMARK_FONT_SIZE,
            color: colors.text.with_alpha(WATERMARK_ALPHA),
            max_width: Some(page.width - 2.0 * TEXT_MARGIN),
        }));
    }

    log::debug!(
        "Composed {:?}: {} ops, frame {:?}",
        design.location.name,
        ops.len(),
        frame.rect
    );

    Scene {
        title: design.location.name.replace('\n', " "),
        width: DESIGN_WIDTH,
        height: DESIGN_HEIGHT,
        background: colors.background,
        ops,
    }
}

fn push_text_stack(
    ops: &mut Vec<DrawOp>,
    design: &Design,
    frame: &FrameGeometry,
    stack: &TextStackLayout,
    color: HexColor,
) {
    let x = frame.center().0;
    let max_width = Some(DESIGN_WIDTH as f32 - 2.0 * TEXT_MARGIN);
    let letter_spacing = design.style.letter_spacing as f32;
    let text = &design.text;

    for entry in &stack.entries {
        let (content, font_family, font_weight) = match entry.element {
            TextElement::City => (design.location.name.clone(), &text.city.font, 700),
            TextElement::Coordinates => (design.coordinates_label(), &text.coordinates.font, 400),
            TextElement::Country => (design.location.country.to_uppercase(), &text.country.font, 400),
            TextElement::Message => (text.message.text.trim().to_string(), &text.message.font, 400),
        };
        let line_height = entry.font_size * LINE_HEIGHT;
        // Breaks past the last available line fold into it
        for (i, line) in content.splitn(entry.lines.max(1) as usize, '\n').enumerate() {
            ops.push(DrawOp::Text(TextRun {
                text: line.replace('\n', " ").trim().to_string(),
                x,
                y: entry.y + i as f32 * line_height,
                anchor: TextAnchor::Top,
                font_family: font_family.clone(),
                font_size: entry.font_size,
                font_weight,
                letter_spacing: entry.element.tracking_em() * entry.font_size * letter_spacing,
                color,
                max_width,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::BackgroundOverride;
    use crate::frame::FrameShape;
    use crate::styles::default_style;
    use crate::texture::Texture;

    fn op_kinds(scene: &Scene) -> Vec<&'static str> {
        scene
            .ops
            .iter()
            .map(|op| match op {
                DrawOp::FillRect { .. } => "rect",
                DrawOp::Texture { .. } => "texture",
                DrawOp::FillPath { shadow: Some(_), .. } => "shadowed",
                DrawOp::FillPath { .. } => "fill",
                DrawOp::StrokePath { .. } => "stroke",
                DrawOp::Basemap { .. } => "basemap",
                DrawOp::Text(_) => "text",
            })
            .collect()
    }

    #[test]
    fn test_paint_order() {
        let mut design = Design::default();
        design.frame.shape = FrameShape::Heart;
        design.frame.border = true;
        design.glow.enabled = true;
        design.text.headline.text = "Where it began".to_string();
        design.text.show_coordinates = false;
        design.text.show_country = false;
        design.pin.enabled = true;
        design.style.background = Some(BackgroundOverride {
            color: HexColor::rgb(250, 240, 230),
            text_color: None,
            texture: Some(Texture::Grain),
            texture_opacity: 0.2,
        });
        let scene = compose(
            &design,
            &ComposeOptions {
                watermark: Some("PREVIEW".to_string()),
            },
        );
        assert_eq!(
            op_kinds(&scene),
            vec![
                "rect", "texture", "shadowed", "basemap", "text", "stroke", "shadowed", "fill",
                "text", "text"
            ]
        );
    }

    fn text_of(scene: &Scene) -> Vec<&str> {
        scene.text_runs().map(|run| run.text.as_str()).collect()
    }

    #[test]
    fn test_extra_city_breaks_fold_into_second_line() {
        let mut design = Design::default();
        design.location.name = "Saint\nPierre et\nMiquelon".to_string();
        design.text.show_coordinates = false;
        design.text.show_country = false;
        let scene = compose(&design, &ComposeOptions::default());
        assert_eq!(text_of(&scene), vec!["Saint", "Pierre et Miquelon"]);
    }

    #[test]
    fn test_minimal_scene() {
        let mut design = Design::default();
        design.text.show_coordinates = false;
        design.text.show_country = false;
        design.text.show_city = false;
        let scene = compose(&design, &ComposeOptions::default());
        assert_eq!(op_kinds(&scene), vec!["rect", "basemap"]);
        assert_eq!((scene.width, scene.height), (DESIGN_WIDTH, DESIGN_HEIGHT));
    }

    #[test]
    fn test_color_precedence() {
        let style = default_style();
        let mut design = Design::default();
        assert_eq!(resolve_colors(&design, style).text, style.text_color);
        assert_eq!(resolve_colors(&design, style).background, style.background);

        design.style.background = Some(BackgroundOverride {
            color: HexColor::rgb(1, 2, 3),
            text_color: Some(HexColor::rgb(4, 5, 6)),
            texture: None,
            texture_opacity: 0.35,
        });
        let colors = resolve_colors(&design, style);
        assert_eq!(colors.background, HexColor::rgb(1, 2, 3));
        assert_eq!(colors.text, HexColor::rgb(4, 5, 6));

        design.style.font_color = Some(HexColor::rgb(7, 8, 9));
        assert_eq!(resolve_colors(&design, style).text, HexColor::rgb(7, 8, 9));
    }

    #[test]
    fn test_headline_above_frame() {
        let mut design = Design::default();
        design.text.headline.text = "Our Home".to_string();
        design.text.headline.all_caps = true;
        let scene = compose(&design, &ComposeOptions::default());
        let frame = frame_geometry(design.frame.shape, true);
        let headline = scene.text_runs().next().unwrap();
        assert_eq!(headline.text, "OUR HOME");
        assert_eq!(headline.y, frame.y() - HEADLINE_OFFSET);
        assert_eq!(headline.anchor, TextAnchor::Baseline);
    }

    #[test]
    fn test_multiline_city_emits_two_runs() {
        let mut design = Design::default();
        design.location.name = "Rio de\nJaneiro".to_string();
        design.text.show_coordinates = false;
        design.text.show_country = false;
        let scene = compose(&design, &ComposeOptions::default());
        let runs: Vec<_> = scene.text_runs().collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Rio de");
        assert_eq!(runs[1].text, "Janeiro");
        assert!(runs[1].y > runs[0].y);
        assert_eq!(scene.title, "Rio de Janeiro");
    }

    #[test]
    fn test_glow_beneath_basemap() {
        let mut design = Design::default();
        design.glow.enabled = true;
        let scene = compose(&design, &ComposeOptions::default());
        let glow = scene
            .ops
            .iter()
            .position(|op| matches!(op, DrawOp::FillPath { shadow: Some(_), .. }))
            .unwrap();
        let basemap = scene
            .ops
            .iter()
            .position(|op| matches!(op, DrawOp::Basemap { .. }))
            .unwrap();
        assert!(glow < basemap);
    }

    #[test]
    fn test_blank_watermark_ignored() {
        let design = Design::default();
        let plain = compose(&design, &ComposeOptions::default());
        let blank = compose(
            &design,
            &ComposeOptions {
                watermark: Some("  ".to_string()),
            },
        );
        assert_eq!(plain, blank);
    }
}
