use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Backend-agnostic font configuration.
///
/// Describes which fonts a poster surface can draw with. It is converted to a
/// `fontdb` database once via [`FontConfig::resolve`], and the resolved
/// database is cloned into every off-screen surface.
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Custom font data to register (font file bytes + optional family override).
    pub custom_fonts: Vec<CustomFont>,
    /// Mappings from generic family names to concrete font family names.
    pub generic_families: GenericFamilyMap,
    /// Whether to load system fonts (default: true).
    pub load_system_fonts: bool,
    /// Additional directories to scan for font files.
    pub font_dirs: Vec<PathBuf>,
    /// Whether font hinting is enabled for text rendering (default: false).
    ///
    /// Poster text is rendered as vector outlines at print resolution, where
    /// hinting only distorts letterforms.
    pub hinting_enabled: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            generic_families: GenericFamilyMap::defaults(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
            hinting_enabled: false,
        }
    }
}

/// A custom font to register, consisting of raw font file data and an optional family name override.
#[derive(Clone, Debug)]
pub struct CustomFont {
    /// Raw font file data (TTF/OTF). Arc-wrapped for cheap cloning.
    pub data: Arc<Vec<u8>>,
    /// Optional family name override. If None, the family name is read from
    /// the font's name table.
    pub family_name: Option<String>,
}

/// Mappings from generic family names to concrete font family names, in priority order.
#[derive(Clone, Debug, Default)]
pub struct GenericFamilyMap {
    /// Concrete fonts for "serif" (priority order).
    pub serif: Vec<String>,
    /// Concrete fonts for "sans-serif" (priority order).
    pub sans_serif: Vec<String>,
    /// Concrete fonts for "monospace" (priority order).
    pub monospace: Vec<String>,
}

impl GenericFamilyMap {
    /// Default generic family preferences.
    pub fn defaults() -> Self {
        Self {
            sans_serif: vec![
                "Helvetica".into(),
                "Arial".into(),
                "Liberation Sans".into(),
                "DejaVu Sans".into(),
            ],
            serif: vec![
                "Times New Roman".into(),
                "Times".into(),
                "Liberation Serif".into(),
                "DejaVu Serif".into(),
            ],
            monospace: vec![
                "Courier New".into(),
                "Liberation Mono".into(),
                "DejaVu Sans Mono".into(),
            ],
        }
    }
}

impl FontConfig {
    /// Resolve this configuration into a concrete font database.
    ///
    /// System font scanning happens here, once. The result is cheap to share
    /// between surfaces compared to scanning again.
    pub fn resolve(&self) -> ResolvedFontConfig {
        ResolvedFontConfig::new(self)
    }
}

/// A [`FontConfig`] that has been resolved into a concrete font database.
#[derive(Clone)]
pub struct ResolvedFontConfig {
    pub(crate) fontdb: fontdb::Database,
    pub(crate) hinting_enabled: bool,
    generic_families: GenericFamilyMap,
}

impl std::fmt::Debug for ResolvedFontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFontConfig")
            .field("faces", &self.fontdb.len())
            .field("hinting_enabled", &self.hinting_enabled)
            .finish()
    }
}

impl ResolvedFontConfig {
    /// Resolve a [`FontConfig`] into a concrete font database.
    pub fn new(config: &FontConfig) -> Self {
        Self {
            fontdb: font_config_to_fontdb(config),
            hinting_enabled: config.hinting_enabled,
            generic_families: config.generic_families.clone(),
        }
    }

    /// Whether any loaded face belongs to `family` (case-insensitive).
    pub fn has_family(&self, family: &str) -> bool {
        self.fontdb.faces().any(|face| {
            face.families
                .iter()
                .any(|(name, _lang)| name.eq_ignore_ascii_case(family))
        })
    }

    /// Sorted, de-duplicated names of every loaded family.
    pub fn family_names(&self) -> Vec<String> {
        self.fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _lang)| name.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of loaded font faces.
    pub fn face_count(&self) -> usize {
        self.fontdb.len()
    }

    /// Add every face of `other` to this database.
    pub fn merge(&mut self, other: &ResolvedFontConfig) {
        for face in other.fontdb.faces() {
            self.fontdb.push_face_info(face.clone());
        }
        apply_generic_families(&mut self.fontdb, &self.generic_families);
    }
}

/// Convert a [`FontConfig`] into a [`fontdb::Database`].
pub fn font_config_to_fontdb(config: &FontConfig) -> fontdb::Database {
    let mut db = fontdb::Database::new();

    if config.load_system_fonts {
        db.load_system_fonts();
    }

    for dir in &config.font_dirs {
        db.load_fonts_dir(dir);
    }

    for font in &config.custom_fonts {
        let before = db.len();
        db.load_font_data(Vec::from(font.data.as_slice()));
        if let Some(family) = &font.family_name {
            // Alias the freshly loaded faces under the override name
            let new_ids: Vec<_> = db.faces().skip(before).map(|face| face.id).collect();
            for id in new_ids {
                if let Some(face) = db.face(id) {
                    let mut info = face.clone();
                    info.families = vec![(family.clone(), fontdb::Language::English_UnitedStates)];
                    db.push_face_info(info);
                }
            }
        }
    }

    apply_generic_families(&mut db, &config.generic_families);

    db
}

/// Apply generic family mappings, choosing the first available family from each list.
fn apply_generic_families(db: &mut fontdb::Database, families: &GenericFamilyMap) {
    let available: BTreeSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(fam, _lang)| fam.clone()))
        .collect();

    if let Some(family) = families.sans_serif.iter().find(|f| available.contains(*f)) {
        db.set_sans_serif_family(family.as_str());
    }
    if let Some(family) = families.serif.iter().find(|f| available.contains(*f)) {
        db.set_serif_family(family.as_str());
    }
    if let Some(family) = families.monospace.iter().find(|f| available.contains(*f)) {
        db.set_monospace_family(family.as_str());
    }
}
