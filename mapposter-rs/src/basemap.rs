//! Basemap bitmap providers.
//!
//! The engine treats basemaps as opaque bitmaps. Providers may fail; the
//! exporter substitutes a [`PlaceholderProvider`] bitmap when they do.

use crate::error::BasemapError;
use crate::styles::BasemapTheme;
use backon::{ExponentialBuilder, Retryable};
use futures::future::BoxFuture;
use futures::FutureExt;
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use log::{info, warn};
use mapposter_canvas2d::CanvasImageDataRef;
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

static MAPPOSTER_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

lazy_static! {
    static ref BASEMAP_CLIENT: Client = reqwest::ClientBuilder::new()
        .user_agent(MAPPOSTER_USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_default();
}

/// A basemap request at a concrete pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct BasemapQuery {
    pub lat: f64,
    pub lng: f64,
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
    pub style_id: String,
    pub theme: BasemapTheme,
}

/// Non-premultiplied RGBA bitmap.
#[derive(Clone, PartialEq)]
pub struct BasemapImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for BasemapImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasemapImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl BasemapImage {
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            rgba: image.into_raw(),
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, BasemapError> {
        Ok(Self::from_rgba_image(image::load_from_memory(bytes)?.to_rgba8()))
    }

    /// Scale and center-crop to exactly `width` x `height`.
    pub fn cover(self, width: u32, height: u32) -> Self {
        if self.width == width && self.height == height {
            return self;
        }
        match RgbaImage::from_raw(self.width, self.height, self.rgba) {
            Some(image) => Self::from_rgba_image(
                DynamicImage::ImageRgba8(image)
                    .resize_to_fill(width, height, FilterType::Triangle)
                    .to_rgba8(),
            ),
            // Buffer did not match its dimensions; nothing sensible to scale
            None => Self::from_rgba_image(RgbaImage::new(width, height)),
        }
    }

    pub fn as_image_data(&self) -> CanvasImageDataRef<'_> {
        CanvasImageDataRef {
            data: &self.rgba,
            width: self.width,
            height: self.height,
        }
    }
}

/// Source of basemap bitmaps.
pub trait BasemapProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch<'a>(&'a self, query: &'a BasemapQuery) -> BoxFuture<'a, Result<BasemapImage, BasemapError>>;
}

/// Fetches static map images over HTTP.
///
/// The URL template may reference `{lat}`, `{lng}`, `{zoom}`, `{width}`,
/// `{height}`, `{style}` (the theme's provider key) and `{styleId}`.
#[derive(Debug, Clone)]
pub struct StaticMapProvider {
    url_template: String,
    max_retries: usize,
}

impl StaticMapProvider {
    pub fn new(url_template: impl Into<String>) -> Result<Self, BasemapError> {
        let url_template = url_template.into();
        if !(url_template.starts_with("http://") || url_template.starts_with("https://")) {
            return Err(BasemapError::InvalidRequest(format!(
                "Basemap URL template must be an http(s) URL: {url_template}"
            )));
        }
        Ok(Self {
            url_template,
            max_retries: 3,
        })
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn url_for(&self, query: &BasemapQuery) -> String {
        self.url_template
            .replace("{lat}", &format!("{:.6}", query.lat))
            .replace("{lng}", &format!("{:.6}", query.lng))
            .replace("{zoom}", &format!("{}", query.zoom))
            .replace("{width}", &query.width.to_string())
            .replace("{height}", &query.height.to_string())
            .replace("{styleId}", &query.style_id)
            .replace("{style}", query.theme.provider_style)
    }

    async fn fetch_once(url: &str) -> Result<Vec<u8>, BasemapError> {
        let response = BASEMAP_CLIENT.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(BasemapError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Network errors and transient statuses are worth retrying.
fn is_transient(err: &BasemapError) -> bool {
    match err {
        BasemapError::Http(e) => e
            .status()
            .map(|s| s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS)
            .unwrap_or(true),
        BasemapError::Status { status, .. } => {
            *status >= 500 || *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
        }
        _ => false,
    }
}

impl BasemapProvider for StaticMapProvider {
    fn name(&self) -> &str {
        "static-map"
    }

    fn fetch<'a>(&'a self, query: &'a BasemapQuery) -> BoxFuture<'a, Result<BasemapImage, BasemapError>> {
        async move {
            let url = self.url_for(query);
            info!(target: "basemap", "Fetching basemap {}", url);
            let bytes = (|| async { Self::fetch_once(&url).await })
                .retry(
                    ExponentialBuilder::default()
                        .with_min_delay(Duration::from_millis(250))
                        .with_max_delay(Duration::from_secs(5))
                        .with_max_times(self.max_retries),
                )
                .when(is_transient)
                .notify(|err, dur| {
                    warn!(
                        target: "basemap",
                        "Retrying basemap load from {} in {:.1}s: {}",
                        url,
                        dur.as_secs_f32(),
                        err
                    );
                })
                .await?;
            Ok(BasemapImage::decode(&bytes)?.cover(query.width, query.height))
        }
        .boxed()
    }
}

/// Serves one local image for every request, scaled to fit.
#[derive(Debug, Clone)]
pub struct ImageFileProvider {
    path: PathBuf,
}

impl ImageFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BasemapProvider for ImageFileProvider {
    fn name(&self) -> &str {
        "image-file"
    }

    fn fetch<'a>(&'a self, query: &'a BasemapQuery) -> BoxFuture<'a, Result<BasemapImage, BasemapError>> {
        async move {
            let bytes = tokio::fs::read(&self.path).await?;
            Ok(BasemapImage::decode(&bytes)?.cover(query.width, query.height))
        }
        .boxed()
    }
}

/// Tries `primary`, then `secondary` if it fails.
#[derive(Clone)]
pub struct FallbackProvider {
    primary: Arc<dyn BasemapProvider>,
    secondary: Arc<dyn BasemapProvider>,
}

impl FallbackProvider {
    pub fn new(primary: Arc<dyn BasemapProvider>, secondary: Arc<dyn BasemapProvider>) -> Self {
        Self { primary, secondary }
    }
}

impl BasemapProvider for FallbackProvider {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn fetch<'a>(&'a self, query: &'a BasemapQuery) -> BoxFuture<'a, Result<BasemapImage, BasemapError>> {
        async move {
            match self.primary.fetch(query).await {
                Ok(image) => Ok(image),
                Err(err) => {
                    warn!(
                        target: "basemap",
                        "Basemap provider {} failed ({}), trying {}",
                        self.primary.name(),
                        err,
                        self.secondary.name()
                    );
                    self.secondary.fetch(query).await
                }
            }
        }
        .boxed()
    }
}

/// Draws a stylized stand-in map from the theme colors. Never fails and is
/// deterministic for a given query.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderProvider;

impl PlaceholderProvider {
    pub fn render(query: &BasemapQuery) -> BasemapImage {
        let (w, h) = (query.width.max(1), query.height.max(1));
        let theme = &query.theme;
        let rgba = |c: crate::color::HexColor| Rgba([c.r, c.g, c.b, 255]);
        let mut image = RgbaImage::from_pixel(w, h, rgba(theme.land));

        // Seed layout from the location so neighboring places look different
        let seed = ((query.lat * 1000.0).round() as i64 ^ ((query.lng * 1000.0).round() as i64) << 7)
            .unsigned_abs();
        let phase = (seed % 628) as f32 / 100.0;
        let unit = w.min(h) as f32;

        // Park
        let park_x = (seed % 5) as f32 / 10.0 + 0.1;
        let park_y = ((seed / 5) % 4) as f32 / 10.0 + 0.1;
        let (px0, py0) = ((park_x * w as f32) as u32, (park_y * h as f32) as u32);
        let (px1, py1) = (
            (px0 + (0.22 * unit) as u32).min(w),
            (py0 + (0.16 * unit) as u32).min(h),
        );
        for y in py0..py1 {
            for x in px0..px1 {
                image.put_pixel(x, y, rgba(theme.parks));
            }
        }

        // Road grid, denser when zoomed out
        let spacing = (unit / (4.0 + (22.0 - query.zoom as f32).max(0.0) / 2.0)).max(8.0) as u32;
        let thickness = ((unit / 400.0).round() as u32).max(1);
        let offset = (seed % spacing as u64) as u32;
        for y in 0..h {
            for x in 0..w {
                let on_road = (x + offset) % spacing < thickness || (y + offset) % spacing < thickness;
                if on_road {
                    image.put_pixel(x, y, rgba(theme.roads));
                }
            }
        }

        // A winding river across the lower half
        let half_width = 0.05 * h as f32;
        for x in 0..w {
            let t = x as f32 / w as f32;
            let center = h as f32 * (0.65 + 0.08 * (t * std::f32::consts::TAU + phase).sin());
            let top = (center - half_width).max(0.0) as u32;
            let bottom = ((center + half_width) as u32).min(h);
            for y in top..bottom {
                image.put_pixel(x, y, rgba(theme.water));
            }
        }

        BasemapImage::from_rgba_image(image)
    }
}

impl BasemapProvider for PlaceholderProvider {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn fetch<'a>(&'a self, query: &'a BasemapQuery) -> BoxFuture<'a, Result<BasemapImage, BasemapError>> {
        async move { Ok(Self::render(query)) }.boxed()
    }
}
