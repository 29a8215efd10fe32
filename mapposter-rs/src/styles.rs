//! Built-in map styles.
//!
//! A style pairs poster background and text colors with the theme handed to
//! the basemap provider. Lookups never fail: an unknown id resolves to
//! [`DEFAULT_STYLE_ID`].

use crate::color::HexColor;
use serde::Serialize;

pub const DEFAULT_STYLE_ID: &str = "minimal";

/// Colors and provider key used to request and substitute a basemap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasemapTheme {
    /// Style key substituted into basemap URL templates.
    pub provider_style: &'static str,
    pub land: HexColor,
    pub water: HexColor,
    pub roads: HexColor,
    pub parks: HexColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStyle {
    pub id: &'static str,
    pub name: &'static str,
    pub background: HexColor,
    pub text_color: HexColor,
    pub basemap: BasemapTheme,
}

pub const STYLES: &[MapStyle] = &[
    MapStyle {
        id: "minimal",
        name: "Minimal",
        background: HexColor::rgb(0xff, 0xff, 0xff),
        text_color: HexColor::rgb(0x1f, 0x1f, 0x1f),
        basemap: BasemapTheme {
            provider_style: "light-v11",
            land: HexColor::rgb(0xf4, 0xf4, 0xf2),
            water: HexColor::rgb(0xd6, 0xdb, 0xe0),
            roads: HexColor::rgb(0x9a, 0x9a, 0x9a),
            parks: HexColor::rgb(0xe6, 0xe8, 0xe2),
        },
    },
    MapStyle {
        id: "midnight",
        name: "Midnight",
        background: HexColor::rgb(0x0f, 0x17, 0x2a),
        text_color: HexColor::rgb(0xf5, 0xf1, 0xe6),
        basemap: BasemapTheme {
            provider_style: "dark-v11",
            land: HexColor::rgb(0x1b, 0x24, 0x38),
            water: HexColor::rgb(0x0a, 0x10, 0x1f),
            roads: HexColor::rgb(0xc9, 0xa8, 0x5c),
            parks: HexColor::rgb(0x1e, 0x2e, 0x33),
        },
    },
    MapStyle {
        id: "vintage",
        name: "Vintage",
        background: HexColor::rgb(0xf3, 0xe9, 0xd2),
        text_color: HexColor::rgb(0x5b, 0x41, 0x2b),
        basemap: BasemapTheme {
            provider_style: "vintage",
            land: HexColor::rgb(0xec, 0xdf, 0xc0),
            water: HexColor::rgb(0xa9, 0xc3, 0xbf),
            roads: HexColor::rgb(0x8c, 0x6a, 0x4a),
            parks: HexColor::rgb(0xcf, 0xd1, 0xa4),
        },
    },
    MapStyle {
        id: "ocean",
        name: "Ocean",
        background: HexColor::rgb(0xe8, 0xf1, 0xf5),
        text_color: HexColor::rgb(0x12, 0x3c, 0x58),
        basemap: BasemapTheme {
            provider_style: "ocean",
            land: HexColor::rgb(0xf7, 0xfa, 0xfb),
            water: HexColor::rgb(0x5b, 0x9b, 0xc2),
            roads: HexColor::rgb(0x2f, 0x5f, 0x80),
            parks: HexColor::rgb(0xcf, 0xe5, 0xdc),
        },
    },
    MapStyle {
        id: "forest",
        name: "Forest",
        background: HexColor::rgb(0x1f, 0x35, 0x2b),
        text_color: HexColor::rgb(0xe9, 0xe4, 0xd4),
        basemap: BasemapTheme {
            provider_style: "forest",
            land: HexColor::rgb(0x2a, 0x44, 0x37),
            water: HexColor::rgb(0x16, 0x26, 0x2b),
            roads: HexColor::rgb(0xd8, 0xcf, 0xb0),
            parks: HexColor::rgb(0x35, 0x57, 0x42),
        },
    },
    MapStyle {
        id: "blush",
        name: "Blush",
        background: HexColor::rgb(0xfb, 0xe9, 0xe7),
        text_color: HexColor::rgb(0x7a, 0x2e, 0x3b),
        basemap: BasemapTheme {
            provider_style: "blush",
            land: HexColor::rgb(0xfd, 0xf3, 0xf1),
            water: HexColor::rgb(0xf0, 0xc4, 0xc8),
            roads: HexColor::rgb(0xb5, 0x5d, 0x6c),
            parks: HexColor::rgb(0xf6, 0xdc, 0xd6),
        },
    },
    MapStyle {
        id: "noir",
        name: "Noir",
        background: HexColor::rgb(0x00, 0x00, 0x00),
        text_color: HexColor::rgb(0xff, 0xff, 0xff),
        basemap: BasemapTheme {
            provider_style: "noir",
            land: HexColor::rgb(0x11, 0x11, 0x11),
            water: HexColor::rgb(0x00, 0x00, 0x00),
            roads: HexColor::rgb(0xee, 0xee, 0xee),
            parks: HexColor::rgb(0x22, 0x22, 0x22),
        },
    },
];

/// Resolve a style id, falling back to the default style for unknown ids.
pub fn resolve_style(style_id: &str) -> &'static MapStyle {
    find_style(style_id).unwrap_or_else(|| {
        log::debug!("Unknown map style {:?}, using {:?}", style_id, DEFAULT_STYLE_ID);
        default_style()
    })
}

/// Exact lookup without fallback.
pub fn find_style(style_id: &str) -> Option<&'static MapStyle> {
    STYLES.iter().find(|style| style.id == style_id)
}

pub fn default_style() -> &'static MapStyle {
    // STYLES[0] is the default style
    &STYLES[0]
}

pub fn style_ids() -> impl Iterator<Item = &'static str> {
    STYLES.iter().map(|style| style.id)
}
