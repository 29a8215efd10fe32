//! The poster design document and its JSON format.

use crate::color::HexColor;
use crate::decorations::{GlowStyle, PinStyle};
use crate::error::DesignError;
use crate::frame::FrameShape;
use crate::styles::DEFAULT_STYLE_ID;
use crate::texture::Texture;
use serde::{Deserialize, Serialize};

/// Current design document version.
pub const DESIGN_VERSION: u32 = 1;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;
/// City names may break onto a second line, no further.
pub const MAX_CITY_LINES: usize = 2;

/// Text size tier. Multipliers depend on the element, see `text_stack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SizeTier {
    S,
    #[default]
    M,
    L,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapSettings {
    pub zoom: f64,
    /// Style id. Unknown ids are accepted and render with the default style.
    pub style: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            zoom: 12.0,
            style: DEFAULT_STYLE_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameSettings {
    pub shape: FrameShape,
    pub border: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlowSettings {
    pub enabled: bool,
    pub style: GlowStyle,
    /// 0..=1
    pub intensity: f64,
}

impl Default for GlowSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            style: GlowStyle::default(),
            intensity: 0.5,
        }
    }
}

/// Font and size of one text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElementStyle {
    pub font: String,
    #[serde(default)]
    pub size: SizeTier,
}

impl TextElementStyle {
    fn with_font(font: &str) -> Self {
        Self {
            font: font.to_string(),
            size: SizeTier::M,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Headline {
    pub text: String,
    pub font: String,
    pub size: SizeTier,
    pub all_caps: bool,
}

impl Default for Headline {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: "Great Vibes".to_string(),
            size: SizeTier::M,
            all_caps: false,
        }
    }
}

impl Headline {
    /// The text as rendered, or `None` when blank.
    pub fn display_text(&self) -> Option<String> {
        let text = self.text.trim();
        if text.is_empty() {
            None
        } else if self.all_caps {
            Some(text.to_uppercase())
        } else {
            Some(text.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomMessage {
    pub text: String,
    pub font: String,
    pub size: SizeTier,
}

impl Default for CustomMessage {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: "Montserrat".to_string(),
            size: SizeTier::M,
        }
    }
}

impl CustomMessage {
    pub fn is_present(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextSettings {
    pub show_city: bool,
    pub show_coordinates: bool,
    pub show_country: bool,
    pub city: TextElementStyle,
    pub coordinates: TextElementStyle,
    pub country: TextElementStyle,
    pub headline: Headline,
    pub message: CustomMessage,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            show_city: true,
            show_coordinates: true,
            show_country: true,
            city: TextElementStyle::with_font("Playfair Display"),
            coordinates: TextElementStyle::with_font("Montserrat"),
            country: TextElementStyle::with_font("Montserrat"),
            headline: Headline::default(),
            message: CustomMessage::default(),
        }
    }
}

/// Custom background replacing the style's background color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundOverride {
    pub color: HexColor,
    /// Text color paired with this background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<HexColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<Texture>,
    #[serde(default = "default_texture_opacity")]
    pub texture_opacity: f64,
}

fn default_texture_opacity() -> f64 {
    0.35
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleSettings {
    pub letter_spacing: f64,
    pub line_spacing: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<HexColor>,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            letter_spacing: 1.0,
            line_spacing: 1.0,
            background: None,
            font_color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PinSettings {
    pub enabled: bool,
    pub style: PinStyle,
    pub color: HexColor,
    pub size: SizeTier,
}

impl Default for PinSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            style: PinStyle::default(),
            color: HexColor::rgb(0xe6, 0x39, 0x46),
            size: SizeTier::M,
        }
    }
}

/// Complete description of one poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    pub version: u32,
    pub location: Location,
    #[serde(default)]
    pub map: MapSettings,
    #[serde(default)]
    pub frame: FrameSettings,
    #[serde(default)]
    pub glow: GlowSettings,
    #[serde(default)]
    pub text: TextSettings,
    #[serde(default)]
    pub style: StyleSettings,
    #[serde(default)]
    pub pin: PinSettings,
}

impl Default for Design {
    fn default() -> Self {
        Self {
            version: DESIGN_VERSION,
            location: Location {
                name: "New York".to_string(),
                lat: 40.7128,
                lng: -74.006,
                country: "United States".to_string(),
            },
            map: MapSettings::default(),
            frame: FrameSettings::default(),
            glow: GlowSettings::default(),
            text: TextSettings::default(),
            style: StyleSettings::default(),
            pin: PinSettings::default(),
        }
    }
}

impl Design {
    /// Parse and validate a design document.
    pub fn from_json(json: &str) -> Result<Self, DesignError> {
        let design: Design = serde_json::from_str(json)?;
        design.validate()?;
        Ok(design)
    }

    pub fn to_json(&self) -> Result<String, DesignError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DesignError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check ranges that the JSON schema alone cannot express.
    pub fn validate(&self) -> Result<(), DesignError> {
        if self.version != DESIGN_VERSION {
            return Err(DesignError::UnsupportedVersion {
                found: self.version,
                expected: DESIGN_VERSION,
            });
        }
        if self.location.name.matches('\n').count() > MAX_CITY_LINES - 1 {
            return Err(DesignError::InvalidField {
                field: "location.name",
                message: format!("city names span at most {MAX_CITY_LINES} lines"),
            });
        }
        check_range("location.lat", self.location.lat, -90.0, 90.0)?;
        check_range("location.lng", self.location.lng, -180.0, 180.0)?;
        check_range("map.zoom", self.map.zoom, MIN_ZOOM, MAX_ZOOM)?;
        check_range("glow.intensity", self.glow.intensity, 0.0, 1.0)?;
        check_positive("style.letterSpacing", self.style.letter_spacing)?;
        check_positive("style.lineSpacing", self.style.line_spacing)?;
        if let Some(background) = &self.style.background {
            check_range(
                "style.background.textureOpacity",
                background.texture_opacity,
                0.0,
                1.0,
            )?;
        }
        Ok(())
    }

    pub fn has_headline(&self) -> bool {
        self.text.headline.display_text().is_some()
    }

    /// Coordinates label, e.g. `40.7128°N / 74.0060°W`.
    pub fn coordinates_label(&self) -> String {
        format_coordinates(self.location.lat, self.location.lng)
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), DesignError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(DesignError::InvalidField {
            field,
            message: format!("{value} is outside {min}..={max}"),
        })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), DesignError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DesignError::InvalidField {
            field,
            message: format!("{value} must be a positive number"),
        })
    }
}

/// Format a latitude/longitude pair with hemisphere letters and four decimals.
pub fn format_coordinates(lat: f64, lng: f64) -> String {
    let ns = if lat < 0.0 { 'S' } else { 'N' };
    let ew = if lng < 0.0 { 'W' } else { 'E' };
    format!("{:.4}°{} / {:.4}°{}", lat.abs(), ns, lng.abs(), ew)
}
