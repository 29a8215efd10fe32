//! Font readiness for export passes.
//!
//! Poster text references font families by name. Before a scene is
//! rasterized every family is checked against the font database; families
//! that are not installed render with the generic sans-serif face instead.

use futures::future::BoxFuture;
use futures::FutureExt;
use mapposter_canvas2d::{CustomFont, FontConfig, ResolvedFontConfig};
use std::path::Path;
use std::sync::Arc;

/// Generic CSS family names that always resolve to some installed face.
const GENERIC_FAMILIES: &[&str] = &["serif", "sans-serif", "monospace", "cursive", "fantasy"];

lazy_static! {
    static ref SYSTEM_FONTS: ResolvedFontConfig = FontConfig::default().resolve();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontReadiness {
    /// The family is installed and will be used as requested.
    Ready,
    /// The family is unavailable; text falls back to sans-serif, or is left
    /// out when no faces are loaded at all.
    Fallback,
}

/// Source of fonts for export surfaces.
pub trait FontProvider: Send + Sync {
    /// Resolve once `family` can be drawn, or is known to fall back.
    fn ensure_font_loaded<'a>(&'a self, family: &'a str) -> BoxFuture<'a, FontReadiness>;

    /// Font database cloned into every export surface.
    fn resolved(&self) -> &ResolvedFontConfig;
}

/// A font database built from a [`FontConfig`].
#[derive(Debug, Clone)]
pub struct FontLibrary {
    resolved: ResolvedFontConfig,
}

impl FontLibrary {
    pub fn new(config: &FontConfig) -> Self {
        Self {
            resolved: config.resolve(),
        }
    }

    /// System fonts only. The scan runs once per process.
    pub fn system() -> Self {
        Self {
            resolved: SYSTEM_FONTS.clone(),
        }
    }

    /// Only the given directories, without system fonts.
    pub fn from_dirs<P: AsRef<Path>>(dirs: &[P]) -> Self {
        Self::new(&FontConfig {
            load_system_fonts: false,
            font_dirs: dirs.iter().map(|d| d.as_ref().to_path_buf()).collect(),
            ..Default::default()
        })
    }

    /// Register font bytes, optionally under a different family name.
    pub fn with_font_data(mut self, data: Vec<u8>, family_name: Option<String>) -> Self {
        let added = FontConfig {
            custom_fonts: vec![CustomFont {
                data: Arc::new(data),
                family_name,
            }],
            load_system_fonts: false,
            ..Default::default()
        }
        .resolve();
        log::debug!(target: "fonts", "registered families {:?}", added.family_names());
        self.resolved.merge(&added);
        self
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.resolved.has_family(family)
    }

    pub fn readiness(&self, family: &str) -> FontReadiness {
        let generic = GENERIC_FAMILIES
            .iter()
            .any(|g| g.eq_ignore_ascii_case(family.trim()));
        let available = generic || self.resolved.has_family(family.trim());
        if available && self.resolved.face_count() > 0 {
            FontReadiness::Ready
        } else {
            FontReadiness::Fallback
        }
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::system()
    }
}

impl FontProvider for FontLibrary {
    fn ensure_font_loaded<'a>(&'a self, family: &'a str) -> BoxFuture<'a, FontReadiness> {
        async move {
            let readiness = self.readiness(family);
            if readiness == FontReadiness::Fallback {
                log::debug!(target: "fonts", "font family {:?} not installed, using sans-serif", family);
            }
            readiness
        }
        .boxed()
    }

    fn resolved(&self) -> &ResolvedFontConfig {
        &self.resolved
    }
}
