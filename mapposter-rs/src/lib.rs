#![allow(clippy::uninlined_format_args)]
#![doc = include_str!("../README.md")]

pub mod basemap;
pub mod color;
pub mod compose;
pub mod decorations;
pub mod design;
pub mod error;
pub mod export;
pub mod fonts;
pub mod frame;
pub mod path;
pub mod render;
pub mod scene;
pub mod styles;
pub mod text_stack;
pub mod texture;

#[macro_use]
extern crate lazy_static;

pub use basemap::{
    BasemapImage, BasemapProvider, BasemapQuery, FallbackProvider, ImageFileProvider,
    PlaceholderProvider, StaticMapProvider,
};
pub use color::HexColor;
pub use compose::{compose, ComposeOptions};
pub use design::Design;
pub use error::{BasemapError, DesignError, ExportError, ExportErrorKind};
pub use export::{
    ExportConfig, ExportFormat, ExportObserver, ExportRequest, ExportState, Exporter,
    RenderedArtifact, SizePreset,
};
pub use fonts::{FontLibrary, FontProvider, FontReadiness};
pub use frame::{frame_geometry, FrameGeometry, FrameShape};
pub use mapposter_canvas2d;
pub use scene::{DrawOp, Scene};
pub use styles::{resolve_style, MapStyle};
pub use text_stack::{compute_text_positions, TextElement, TextStackLayout};
