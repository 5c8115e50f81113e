//! Centered "cover" cropping: fill the target rectangle completely and
//! clip whichever source axis overflows.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::RenderResult;

/// Source-space window that a cover crop samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub fn cover_crop_rect(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> CropRect {
    let (width, height) = window_size(src_w, src_h, target_w, target_h);
    CropRect {
        x: (src_w - width) / 2,
        y: (src_h - height) / 2,
        width,
        height,
    }
}

/// Same window as [`cover_crop_rect`] but centered on `focus` (source
/// pixels), clamped so it never leaves the image.
pub fn cover_crop_rect_around(
    src_w: u32,
    src_h: u32,
    target_w: u32,
    target_h: u32,
    focus: (f64, f64),
) -> CropRect {
    let (width, height) = window_size(src_w, src_h, target_w, target_h);
    let x = (focus.0 - width as f64 / 2.0).clamp(0.0, (src_w - width) as f64);
    let y = (focus.1 - height as f64 / 2.0).clamp(0.0, (src_h - height) as f64);
    CropRect {
        x: x.round() as u32,
        y: y.round() as u32,
        width,
        height,
    }
}

fn window_size(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> (u32, u32) {
    let (src_w, src_h) = (src_w.max(1), src_h.max(1));
    let (target_w, target_h) = (target_w.max(1), target_h.max(1));
    let scale = f64::max(
        target_w as f64 / src_w as f64,
        target_h as f64 / src_h as f64,
    );
    let width = ((target_w as f64 / scale).round() as u32).clamp(1, src_w);
    let height = ((target_h as f64 / scale).round() as u32).clamp(1, src_h);
    (width, height)
}

pub fn crop_to_rect(image: &DynamicImage, rect: CropRect, target_w: u32, target_h: u32) -> DynamicImage {
    image
        .crop_imm(rect.x, rect.y, rect.width, rect.height)
        .resize_exact(target_w.max(1), target_h.max(1), FilterType::CatmullRom)
}

pub fn cover_crop(image: &DynamicImage, target_w: u32, target_h: u32) -> DynamicImage {
    let rect = cover_crop_rect(image.width(), image.height(), target_w, target_h);
    crop_to_rect(image, rect, target_w, target_h)
}

/// JPEG-encodes `image`; `quality` is on the 0.0..=1.0 scale.
pub fn encode_jpeg(image: &DynamicImage, quality: f32) -> RenderResult<Vec<u8>> {
    let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&image.to_rgb8())?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn tall_source_crops_vertically() {
        let rect = cover_crop_rect(100, 200, 50, 50);
        assert_eq!(rect, CropRect { x: 0, y: 50, width: 100, height: 100 });
    }

    #[test]
    fn wide_source_crops_horizontally() {
        let rect = cover_crop_rect(200, 100, 50, 50);
        assert_eq!(rect, CropRect { x: 50, y: 0, width: 100, height: 100 });
    }

    #[test]
    fn matching_aspect_uses_whole_image() {
        let rect = cover_crop_rect(300, 400, 600, 800);
        assert_eq!(rect, CropRect { x: 0, y: 0, width: 300, height: 400 });
    }

    #[test]
    fn output_has_target_dimensions() {
        let source = DynamicImage::ImageRgb8(RgbImage::new(100, 200));
        let cropped = cover_crop(&source, 50, 50);
        assert_eq!((cropped.width(), cropped.height()), (50, 50));
    }

    #[test]
    fn crop_keeps_the_middle_band() {
        // Red top quarter, green middle half, blue bottom quarter.
        let source = RgbImage::from_fn(100, 200, |_, y| match y {
            0..50 => Rgb([255, 0, 0]),
            50..150 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let cropped = cover_crop(&DynamicImage::ImageRgb8(source), 50, 50).to_rgb8();
        assert_eq!(cropped.get_pixel(25, 0), &Rgb([0, 255, 0]));
        assert_eq!(cropped.get_pixel(25, 49), &Rgb([0, 255, 0]));
    }

    #[test]
    fn focus_window_is_clamped() {
        let rect = cover_crop_rect_around(200, 100, 50, 50, (190.0, 50.0));
        assert_eq!(rect, CropRect { x: 100, y: 0, width: 100, height: 100 });

        let rect = cover_crop_rect_around(200, 100, 50, 50, (60.0, 50.0));
        assert_eq!(rect.x, 10);
    }

    #[test]
    fn jpeg_output_has_soi_marker() {
        let source = DynamicImage::ImageRgb8(RgbImage::new(16, 16));
        let bytes = encode_jpeg(&source, 0.95).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
