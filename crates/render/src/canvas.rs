//! Print canvas compositor.
//!
//! A variant is drawn onto a white 8.5"x11" canvas at 300 DPI. Square
//! templates use a regular grid; hexagonal templates shift every odd row
//! right by half a cell, so cells are narrowed until the shifted row fits.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use tracing::{debug, warn};

use crate::compress::fit_within;
use crate::crop::cover_crop;
use crate::error::{RenderError, RenderResult};
use crate::face::{FaceDetector, face_crop};
use crate::flow::{RenderedImage, VariantRenderer};
use crate::grid::{GridDimensions, GridTemplate};
use crate::order::RenderOrder;
use crate::photo::PhotoLoader;
use crate::variants::Variant;

pub const PRINT_WIDTH: u32 = 2550;
pub const PRINT_HEIGHT: u32 = 3300;
pub const PRINT_DPI: u32 = 300;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PLACEHOLDER: Rgba<u8> = Rgba([224, 224, 224, 255]);
const CENTER_ACCENT: Rgba<u8> = Rgba([212, 175, 55, 255]);
const CENTER_BORDER: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    pub gap: u32,
}

impl CanvasSpec {
    /// The fixed print size. Only the gap comes from the order.
    pub fn print(gap: u32) -> Self {
        Self {
            width: PRINT_WIDTH,
            height: PRINT_HEIGHT,
            gap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Row-major cell rectangles, one per grid cell.
pub fn layout_cells(grid: &GridDimensions, template: GridTemplate, spec: &CanvasSpec) -> Vec<CellRect> {
    let cols = grid.cols.max(1) as u32;
    let rows = grid.rows.max(1) as u32;
    let gap = spec.gap;

    let usable_w = spec.width.saturating_sub(gap * (cols + 1));
    let usable_h = spec.height.saturating_sub(gap * (rows + 1));
    let cell_w = match template {
        GridTemplate::Square => usable_w / cols,
        GridTemplate::Hexagonal => 2 * usable_w / (2 * cols + 1),
    }
    .max(1);
    let cell_h = (usable_h / rows).max(1);

    (0..grid.total_cells as u32)
        .map(|index| {
            let (row, col) = (index / cols, index % cols);
            let shift = match template {
                GridTemplate::Hexagonal if row % 2 == 1 => cell_w / 2,
                _ => 0,
            };
            CellRect {
                x: gap + shift + col * (cell_w + gap),
                y: gap + row * (cell_h + gap),
                width: cell_w,
                height: cell_h,
            }
        })
        .collect()
}

/// What to draw into one cell.
pub enum CellFill {
    Empty,
    /// Occupied cell whose photo could not be loaded.
    Placeholder,
    /// Tile already cropped to the cell size.
    Photo(DynamicImage),
}

/// Draws `cells` (aligned with the variant's positions) onto a fresh canvas.
/// CPU bound; run it off the async workers.
pub fn compose_variant(
    spec: &CanvasSpec,
    template: GridTemplate,
    grid: &GridDimensions,
    cells: &[CellFill],
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(spec.width, spec.height, BACKGROUND);
    let rects = layout_cells(grid, template, spec);

    if let Some(rect) = rects.get(grid.center_index) {
        if matches!(cells.get(grid.center_index), Some(CellFill::Photo(_) | CellFill::Placeholder)) {
            let border = CENTER_BORDER.min(spec.gap);
            let frame = CellRect {
                x: rect.x - border,
                y: rect.y - border,
                width: rect.width + 2 * border,
                height: rect.height + 2 * border,
            };
            fill_rect(&mut canvas, &frame, CENTER_ACCENT);
        }
    }

    for (rect, cell) in rects.iter().zip(cells) {
        match cell {
            CellFill::Empty => {}
            CellFill::Placeholder => fill_rect(&mut canvas, rect, PLACEHOLDER),
            CellFill::Photo(tile) => {
                let tile = if (tile.width(), tile.height()) == (rect.width, rect.height) {
                    tile.to_rgba8()
                } else {
                    cover_crop(tile, rect.width, rect.height).to_rgba8()
                };
                imageops::overlay(&mut canvas, &tile, rect.x as i64, rect.y as i64);
            }
        }
    }
    canvas
}

fn fill_rect(canvas: &mut RgbaImage, rect: &CellRect, color: Rgba<u8>) {
    let x_end = (rect.x + rect.width).min(canvas.width());
    let y_end = (rect.y + rect.height).min(canvas.height());
    for y in rect.y..y_end {
        for x in rect.x..x_end {
            canvas.put_pixel(x, y, color);
        }
    }
}

pub fn encode_png(canvas: &RgbaImage) -> RenderResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    // Print output is opaque; RGB keeps the file a quarter smaller.
    DynamicImage::ImageRgba8(canvas.clone())
        .to_rgb8()
        .write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

pub fn data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Loads member photos and composites a variant onto the print canvas.
pub struct CanvasRenderer {
    loader: Arc<dyn PhotoLoader>,
    detector: Arc<dyn FaceDetector>,
    max_photo_dimension: u32,
}

impl CanvasRenderer {
    pub fn new(
        loader: Arc<dyn PhotoLoader>,
        detector: Arc<dyn FaceDetector>,
        max_photo_dimension: u32,
    ) -> Self {
        Self {
            loader,
            detector,
            max_photo_dimension,
        }
    }

    /// Loads one photo and crops it down to `rect`, so only cell-sized
    /// tiles outlive this call.
    async fn load_cell(&self, reference: Option<&str>, rect: &CellRect) -> CellFill {
        let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
            return CellFill::Placeholder;
        };
        let photo = match self.loader.load(reference).await {
            Ok(photo) => fit_within(photo, self.max_photo_dimension),
            Err(e) => {
                warn!(error = %e, "Photo failed to load, drawing placeholder");
                return CellFill::Placeholder;
            }
        };
        let jpeg = match face_crop(self.detector.as_ref(), &photo, rect.width, rect.height).await {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!(error = %e, "Photo crop failed, drawing placeholder");
                return CellFill::Placeholder;
            }
        };
        drop(photo);
        match image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg) {
            Ok(tile) => CellFill::Photo(tile),
            Err(e) => {
                warn!(error = %e, "Cropped tile failed to decode, drawing placeholder");
                CellFill::Placeholder
            }
        }
    }
}

#[async_trait]
impl VariantRenderer for CanvasRenderer {
    async fn render(&self, order: &RenderOrder, variant: &Variant) -> RenderResult<RenderedImage> {
        let spec = CanvasSpec::print(order.settings.gap);
        let template = order.grid_template;
        let grid = variant.grid;
        let rects = layout_cells(&grid, template, &spec);

        let mut cells = Vec::with_capacity(variant.positions.len());
        for (slot, rect) in variant.positions.iter().zip(&rects) {
            let cell = match slot {
                Some(member) => self.load_cell(member.photo.as_deref(), rect).await,
                None => CellFill::Empty,
            };
            cells.push(cell);
        }
        debug!(
            order_id = %order.id,
            variant_id = %variant.id,
            cells = cells.len(),
            "Photos loaded, compositing"
        );

        let png = tokio::task::spawn_blocking(move || {
            let canvas = compose_variant(&spec, template, &grid, &cells);
            encode_png(&canvas)
        })
        .await
        .map_err(|e| RenderError::Task(e.to_string()))??;

        Ok(RenderedImage {
            png,
            width: spec.width,
            height: spec.height,
        })
    }
}
