//! Single-page PDF documents that carry one raster image edge to edge.

use anyhow::{bail, Error as AnyError};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};
use std::io::Write;

/// PDF user space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// An 8-bit RGB raster, row-major with no padding.
#[derive(Debug, Clone, Copy)]
pub struct RgbRaster<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// Physical page size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    pub fn from_inches(width_in: f32, height_in: f32) -> Self {
        Self {
            width_pt: width_in * POINTS_PER_INCH,
            height_pt: height_in * POINTS_PER_INCH,
        }
    }
}

/// Write a one-page PDF with `raster` stretched over the whole page.
///
/// The image is stored losslessly (FlateDecode) at its native resolution, so
/// the effective print density is `raster.width / page width in inches`.
pub fn raster_to_pdf(
    raster: &RgbRaster<'_>,
    page: PageSize,
    title: Option<&str>,
) -> Result<Vec<u8>, AnyError> {
    if raster.width == 0 || raster.height == 0 {
        bail!("Raster dimensions must be non-zero");
    }
    let expected = raster.width as usize * raster.height as usize * 3;
    if raster.data.len() != expected {
        bail!(
            "Raster data length {} does not match {}x{} RGB image",
            raster.data.len(),
            raster.width,
            raster.height
        );
    }
    if !(page.width_pt.is_finite() && page.height_pt.is_finite())
        || page.width_pt <= 0.0
        || page.height_pt <= 0.0
    {
        bail!("Invalid page size {}x{} pt", page.width_pt, page.height_pt);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raster.data)?;
    let compressed = encoder.finish()?;
    log::debug!(
        "Embedding {}x{} raster ({} bytes compressed) on {}x{} pt page",
        raster.width,
        raster.height,
        compressed.len(),
        page.width_pt,
        page.height_pt
    );

    // Allocate the indirect reference IDs
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let content_id = Ref::new(4);
    let image_id = Ref::new(5);
    let info_id = Ref::new(6);
    let image_name = Name(b"Im1");

    let mut writer = Pdf::new();
    writer.catalog(catalog_id).pages(page_tree_id);
    writer.pages(page_tree_id).kids([page_id]).count(1);

    let mut pdf_page = writer.page(page_id);
    pdf_page.media_box(Rect::new(0.0, 0.0, page.width_pt, page.height_pt));
    pdf_page.parent(page_tree_id);
    pdf_page.contents(content_id);
    let mut resources = pdf_page.resources();
    resources.x_objects().pair(image_name, image_id);
    resources.finish();
    pdf_page.finish();

    let mut image = writer.image_xobject(image_id, &compressed);
    image.filter(Filter::FlateDecode);
    image.width(raster.width as i32);
    image.height(raster.height as i32);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.finish();

    // Image space is the unit square; scale it to cover the page
    let mut content = Content::new();
    content
        .save_state()
        .transform([page.width_pt, 0.0, 0.0, page.height_pt, 0.0, 0.0])
        .x_object(image_name)
        .restore_state();
    writer.stream(content_id, &content.finish());

    let mut info = writer.document_info(info_id);
    if let Some(title) = title {
        info.title(TextStr(title));
    }
    info.producer(TextStr(concat!("mapposter-pdf ", env!("CARGO_PKG_VERSION"))));
    info.finish();

    Ok(writer.finish())
}
