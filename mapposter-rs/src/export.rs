//! Export pipeline: rasterize a [`Scene`] at a physical size and package it.
//!
//! Every call to [`Exporter::export`] walks the lifecycle
//! `Idle -> Preparing -> AwaitingFonts -> Rasterizing -> Packaged -> Idle`,
//! or ends in `Failed` without producing an artifact. Each pass renders on
//! its own surface inside a blocking task.
//!
//! Font readiness is a bounded wait followed by a fixed settle delay. This
//! absorbs slow font providers; it does not guarantee that every glyph is
//! available, and families that never become ready fall back to sans-serif.

use crate::basemap::{BasemapImage, BasemapProvider, BasemapQuery, PlaceholderProvider};
use crate::error::{ExportError, ExportErrorKind};
use crate::fonts::{FontProvider, FontReadiness};
use crate::render::render_scene;
use crate::scene::{Scene, DESIGN_HEIGHT, DESIGN_WIDTH};
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::ExtendedColorType;
use log::{debug, info, warn};
use mapposter_canvas2d::Canvas2dContext;
use mapposter_pdf::{raster_to_pdf, PageSize, RgbRaster};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const MIN_DPI: u32 = 72;
pub const MAX_DPI: u32 = 600;
pub const DEFAULT_DPI: u32 = 300;

/// Largest target raster accepted, in pixels (24x36 in at 400 dpi).
pub const MAX_TARGET_PIXELS: u64 = 138_240_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Whether the raster is wrapped in a paged document.
    pub fn is_paged(&self) -> bool {
        matches!(self, ExportFormat::Pdf)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Pdf => "pdf",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = ExportErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(ExportErrorKind::InvalidRequest(format!(
                "unknown format {s:?} (expected png, jpeg or pdf)"
            ))),
        }
    }
}

/// Physical print sizes, portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SizePreset {
    /// Design resolution; DPI is ignored.
    #[serde(rename = "web")]
    Web,
    #[serde(rename = "8x10")]
    In8x10,
    #[serde(rename = "11x14")]
    In11x14,
    #[default]
    #[serde(rename = "12x16")]
    In12x16,
    #[serde(rename = "16x20")]
    In16x20,
    #[serde(rename = "18x24")]
    In18x24,
    #[serde(rename = "24x36")]
    In24x36,
}

impl SizePreset {
    pub const ALL: [SizePreset; 7] = [
        SizePreset::Web,
        SizePreset::In8x10,
        SizePreset::In11x14,
        SizePreset::In12x16,
        SizePreset::In16x20,
        SizePreset::In18x24,
        SizePreset::In24x36,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SizePreset::Web => "web",
            SizePreset::In8x10 => "8x10",
            SizePreset::In11x14 => "11x14",
            SizePreset::In12x16 => "12x16",
            SizePreset::In16x20 => "16x20",
            SizePreset::In18x24 => "18x24",
            SizePreset::In24x36 => "24x36",
        }
    }

    /// Width and height in inches, or `None` for the web preset.
    pub fn inches(&self) -> Option<(f32, f32)> {
        match self {
            SizePreset::Web => None,
            SizePreset::In8x10 => Some((8.0, 10.0)),
            SizePreset::In11x14 => Some((11.0, 14.0)),
            SizePreset::In12x16 => Some((12.0, 16.0)),
            SizePreset::In16x20 => Some((16.0, 20.0)),
            SizePreset::In18x24 => Some((18.0, 24.0)),
            SizePreset::In24x36 => Some((24.0, 36.0)),
        }
    }
}

impl fmt::Display for SizePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizePreset {
    type Err = ExportErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace(['×', ' '], "x");
        SizePreset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == normalized)
            .ok_or_else(|| {
                ExportErrorKind::InvalidRequest(format!("unknown size preset {s:?}"))
            })
    }
}

/// One requested artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub size: SizePreset,
    pub dpi: u32,
}

impl ExportRequest {
    pub fn new(format: ExportFormat, size: SizePreset, dpi: u32) -> Self {
        Self { format, size, dpi }
    }

    /// DPI written into artifact metadata.
    pub fn effective_dpi(&self) -> u32 {
        match self.size {
            SizePreset::Web => MIN_DPI,
            _ => self.dpi,
        }
    }

    /// Page size for paged formats. The web preset maps one point per
    /// design pixel.
    pub fn page_size(&self) -> PageSize {
        match self.size.inches() {
            Some((width_in, height_in)) => PageSize::from_inches(width_in, height_in),
            None => PageSize {
                width_pt: DESIGN_WIDTH as f32,
                height_pt: DESIGN_HEIGHT as f32,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ExportErrorKind> {
        if self.size != SizePreset::Web && !(MIN_DPI..=MAX_DPI).contains(&self.dpi) {
            return Err(ExportErrorKind::InvalidRequest(format!(
                "dpi {} outside {}..={}",
                self.dpi, MIN_DPI, MAX_DPI
            )));
        }
        let (width, height) = self.target_dimensions();
        if width as u64 * height as u64 > MAX_TARGET_PIXELS {
            return Err(ExportErrorKind::InvalidRequest(format!(
                "{}x{} px exceeds the {} pixel limit",
                width, height, MAX_TARGET_PIXELS
            )));
        }
        Ok(())
    }

    /// Output raster size in pixels.
    pub fn target_dimensions(&self) -> (u32, u32) {
        match self.size.inches() {
            None => (DESIGN_WIDTH, DESIGN_HEIGHT),
            Some((w, h)) => (
                (w * self.dpi as f32).round() as u32,
                (h * self.dpi as f32).round() as u32,
            ),
        }
    }
}

/// Tunables for [`Exporter`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Upper bound on waiting for one font family.
    pub font_ready_timeout: Duration,
    /// Pause after fonts are ready, before rasterizing.
    pub settle_delay: Duration,
    /// Pause between consecutive passes of [`Exporter::export_all`].
    pub pass_delay: Duration,
    /// Extra render density on top of the target resolution.
    pub supersample: f32,
    pub jpeg_quality: u8,
    /// Consecutive basemap failures before artifacts carry a warning.
    pub basemap_warning_threshold: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            font_ready_timeout: Duration::from_secs(3),
            settle_delay: Duration::from_millis(150),
            pass_delay: Duration::from_millis(100),
            supersample: 1.0,
            jpeg_quality: 92,
            basemap_warning_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportState {
    Idle,
    Preparing,
    AwaitingFonts,
    Rasterizing,
    Packaged,
    Failed,
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportState::Idle => "idle",
            ExportState::Preparing => "preparing",
            ExportState::AwaitingFonts => "awaiting fonts",
            ExportState::Rasterizing => "rasterizing",
            ExportState::Packaged => "packaged",
            ExportState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Receives every lifecycle transition of an exporter.
pub trait ExportObserver: Send + Sync {
    fn on_state(&self, state: ExportState);
}

impl<F> ExportObserver for F
where
    F: Fn(ExportState) + Send + Sync,
{
    fn on_state(&self, state: ExportState) {
        self(state)
    }
}

/// A packaged export. Owned by the caller once returned.
#[derive(Clone, PartialEq)]
pub struct RenderedArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    /// Non-blocking notices, such as a substituted basemap.
    pub warnings: Vec<String>,
}

impl fmt::Debug for RenderedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedArtifact")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .field("warnings", &self.warnings)
            .finish()
    }
}

/// Lowercase ASCII slug for filenames. Falls back to "poster".
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "poster".to_string()
    } else {
        slug.to_string()
    }
}

pub fn artifact_filename(title: &str, request: &ExportRequest) -> String {
    format!(
        "{}-{}.{}",
        slugify(title),
        request.size,
        request.format.extension()
    )
}

/// Scale from design units to render pixels for a target raster.
///
/// The scene is rendered at the largest scale that still fits inside the
/// target, so the contain fit never has to shrink it.
pub fn render_scale(scene: &Scene, target: (u32, u32), supersample: f32) -> f32 {
    let sx = target.0 as f32 / scene.width as f32;
    let sy = target.1 as f32 / scene.height as f32;
    sx.min(sy) * supersample.max(1.0)
}

/// Rasterize `scene` at `scale`, then fit it into `target` preserving aspect
/// ratio over the scene background.
pub fn rasterize(
    scene: &Scene,
    fonts: &mapposter_canvas2d::ResolvedFontConfig,
    basemaps: &[Option<BasemapImage>],
    scale: f32,
    target: (u32, u32),
) -> Result<Canvas2dContext, ExportErrorKind> {
    let render_w = (scene.width as f32 * scale).ceil() as u32;
    let render_h = (scene.height as f32 * scale).ceil() as u32;

    let mut rendered = Canvas2dContext::with_resolved(render_w, render_h, fonts)?;
    rendered.fill_surface(scene.background.to_canvas());
    render_scene(&mut rendered, scene, scale, basemaps)?;

    if (render_w, render_h) == target {
        return Ok(rendered);
    }

    let (tw, th) = (target.0 as f32, target.1 as f32);
    let fit = (tw / render_w as f32).min(th / render_h as f32);
    let (dw, dh) = (render_w as f32 * fit, render_h as f32 * fit);
    debug!(
        target: "export",
        "resampling {}x{} into {}x{} (fit {:.4})",
        render_w, render_h, target.0, target.1, fit
    );

    let mut output = Canvas2dContext::with_resolved(target.0, target.1, fonts)?;
    output.fill_surface(scene.background.to_canvas());
    output.draw_canvas_scaled(&rendered, (tw - dw) / 2.0, (th - dh) / 2.0, dw, dh);
    Ok(output)
}

/// Encode a finished surface in the requested format.
pub fn encode(
    surface: &Canvas2dContext,
    scene: &Scene,
    request: &ExportRequest,
    jpeg_quality: u8,
) -> Result<Vec<u8>, ExportErrorKind> {
    let dpi = request.effective_dpi();
    let background = scene.background.rgb_array();
    match request.format {
        ExportFormat::Png => Ok(surface.to_png(Some(dpi as f32))?),
        ExportFormat::Jpeg => {
            let rgb = surface.get_rgb_data(background);
            let mut bytes = Vec::new();
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality.clamp(1, 100));
            encoder.set_pixel_density(PixelDensity::dpi(dpi as u16));
            encoder.encode(&rgb, surface.width(), surface.height(), ExtendedColorType::Rgb8)?;
            Ok(bytes)
        }
        ExportFormat::Pdf => {
            let rgb = surface.get_rgb_data(background);
            raster_to_pdf(
                &RgbRaster {
                    data: &rgb,
                    width: surface.width(),
                    height: surface.height(),
                },
                request.page_size(),
                Some(&scene.title),
            )
            .map_err(|e| ExportErrorKind::Pdf(e.to_string()))
        }
    }
}

/// Runs export passes against shared font and basemap providers.
pub struct Exporter {
    fonts: Arc<dyn FontProvider>,
    basemaps: Arc<dyn BasemapProvider>,
    config: ExportConfig,
    observers: Vec<Arc<dyn ExportObserver>>,
    consecutive_basemap_failures: AtomicUsize,
}

impl Exporter {
    pub fn new(fonts: Arc<dyn FontProvider>, basemaps: Arc<dyn BasemapProvider>) -> Self {
        Self {
            fonts,
            basemaps,
            config: ExportConfig::default(),
            observers: Vec::new(),
            consecutive_basemap_failures: AtomicUsize::new(0),
        }
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExportObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn transition(&self, state: ExportState) {
        debug!(target: "export", "state -> {}", state);
        for observer in &self.observers {
            observer.on_state(state);
        }
    }

    /// Produce one artifact. No partial artifact is returned on failure.
    pub async fn export(
        &self,
        scene: &Scene,
        request: &ExportRequest,
    ) -> Result<RenderedArtifact, ExportError> {
        match self.run(scene, request).await {
            Ok(artifact) => {
                self.transition(ExportState::Packaged);
                info!(
                    target: "export",
                    "exported {} ({}x{}, {} bytes)",
                    artifact.filename,
                    artifact.width,
                    artifact.height,
                    artifact.bytes.len()
                );
                self.transition(ExportState::Idle);
                Ok(artifact)
            }
            Err(err) => {
                warn!(target: "export", "{}", err);
                self.transition(ExportState::Failed);
                Err(err)
            }
        }
    }

    /// Run one pass per request, sequentially, pausing between passes.
    pub async fn export_all(
        &self,
        scene: &Scene,
        requests: &[ExportRequest],
    ) -> Vec<Result<RenderedArtifact, ExportError>> {
        let mut results = Vec::with_capacity(requests.len());
        for (i, request) in requests.iter().enumerate() {
            if i > 0 && !self.config.pass_delay.is_zero() {
                tokio::time::sleep(self.config.pass_delay).await;
            }
            results.push(self.export(scene, request).await);
        }
        results
    }

    async fn run(&self, scene: &Scene, request: &ExportRequest) -> Result<RenderedArtifact, ExportError> {
        self.transition(ExportState::Preparing);
        request
            .validate()
            .map_err(|e| ExportError::new(ExportState::Preparing, e))?;
        let target = request.target_dimensions();
        let scale = render_scale(scene, target, self.config.supersample);
        let mut warnings = Vec::new();
        let basemaps = self.fetch_basemaps(scene, scale, &mut warnings).await;

        self.transition(ExportState::AwaitingFonts);
        self.await_fonts(scene).await;

        self.transition(ExportState::Rasterizing);
        let scene_owned = scene.clone();
        let fonts = self.fonts.resolved().clone();
        let request_owned = *request;
        let jpeg_quality = self.config.jpeg_quality;
        let bytes = tokio::task::spawn_blocking(move || {
            let surface = rasterize(&scene_owned, &fonts, &basemaps, scale, target)?;
            encode(&surface, &scene_owned, &request_owned, jpeg_quality)
        })
        .await
        .map_err(|e| ExportError::new(ExportState::Rasterizing, ExportErrorKind::Task(e.to_string())))?
        .map_err(|e| ExportError::new(ExportState::Rasterizing, e))?;

        Ok(RenderedArtifact {
            bytes,
            filename: artifact_filename(&scene.title, request),
            mime_type: request.format.mime_type(),
            width: target.0,
            height: target.1,
            warnings,
        })
    }

    /// Fetch one bitmap per basemap op. Failures are replaced with a
    /// placeholder; repeated failures add a warning.
    async fn fetch_basemaps(
        &self,
        scene: &Scene,
        scale: f32,
        warnings: &mut Vec<String>,
    ) -> Vec<Option<BasemapImage>> {
        let mut images = Vec::new();
        for (request, dest) in scene.basemap_requests() {
            let query = BasemapQuery {
                lat: request.lat,
                lng: request.lng,
                zoom: request.zoom,
                width: ((dest.width * scale).ceil() as u32).max(1),
                height: ((dest.height * scale).ceil() as u32).max(1),
                style_id: request.style_id.clone(),
                theme: request.theme,
            };
            let image = match self.basemaps.fetch(&query).await {
                Ok(image) => {
                    self.consecutive_basemap_failures.store(0, Ordering::SeqCst);
                    image.cover(query.width, query.height)
                }
                Err(err) => {
                    let failures = self.consecutive_basemap_failures.fetch_add(1, Ordering::SeqCst) + 1;
                    warn!(
                        target: "export",
                        "basemap provider {} failed, using placeholder: {}",
                        self.basemaps.name(),
                        err
                    );
                    if failures >= self.config.basemap_warning_threshold {
                        warnings.push(format!(
                            "Map imagery unavailable ({} consecutive failures); a placeholder map was used",
                            failures
                        ));
                    }
                    PlaceholderProvider::render(&query)
                }
            };
            images.push(Some(image));
        }
        images
    }

    async fn await_fonts(&self, scene: &Scene) {
        if self.fonts.resolved().face_count() == 0 && scene.text_runs().next().is_some() {
            warn!(target: "export", "no fonts are loaded, poster text will be left out");
        }
        for family in scene.font_families() {
            match tokio::time::timeout(
                self.config.font_ready_timeout,
                self.fonts.ensure_font_loaded(&family),
            )
            .await
            {
                Ok(FontReadiness::Ready) => debug!(target: "export", "font {:?} ready", family),
                Ok(FontReadiness::Fallback) => {
                    debug!(target: "export", "font {:?} falls back to sans-serif", family)
                }
                Err(_) => warn!(
                    target: "export",
                    "font {:?} not ready after {:?}, continuing",
                    family,
                    self.config.font_ready_timeout
                ),
            }
        }
        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }
    }
}
