//! Size-targeted JPEG compression.

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use crate::crop::encode_jpeg;
use crate::error::RenderResult;

#[derive(Debug, Clone, Copy)]
pub struct CompressionOptions {
    pub target_bytes: usize,
    pub max_dimension: u32,
    pub min_quality: f32,
    pub max_quality: f32,
    pub max_iterations: u32,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            target_bytes: 500 * 1024,
            max_dimension: 1600,
            min_quality: 0.5,
            max_quality: 0.9,
            max_iterations: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Compressed {
    pub bytes: Vec<u8>,
    pub quality: f32,
    pub iterations: u32,
    pub width: u32,
    pub height: u32,
}

/// Downscales to `max_dimension` (aspect preserved) when needed.
pub fn fit_within(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    if max_dimension == 0 || (image.width() <= max_dimension && image.height() <= max_dimension) {
        return image;
    }
    image.resize(max_dimension, max_dimension, FilterType::Triangle)
}

/// Tries `max_quality` first, then bisects the quality range. The last
/// attempt drops straight to `min_quality` while nothing has fit. Returns
/// the highest-quality encoding under `target_bytes`, or the lowest-quality
/// one if nothing fit.
pub fn compress_image(image: DynamicImage, options: &CompressionOptions) -> RenderResult<Compressed> {
    let image = fit_within(image, options.max_dimension);
    let (width, height) = (image.width(), image.height());

    let mut low = options.min_quality;
    let mut high = options.max_quality;
    let mut quality = options.max_quality;
    let mut best_fit: Option<(Vec<u8>, f32)> = None;
    let mut lowest: Option<(Vec<u8>, f32)> = None;
    let mut iterations = 0;
    let max_iterations = options.max_iterations.max(1);

    while iterations < max_iterations {
        iterations += 1;
        if iterations == max_iterations && iterations > 1 && best_fit.is_none() {
            quality = options.min_quality;
        }
        let bytes = encode_jpeg(&image, quality)?;
        debug!(iteration = iterations, quality, size = bytes.len(), "JPEG attempt");

        if bytes.len() <= options.target_bytes {
            let better = best_fit.as_ref().is_none_or(|(_, q)| quality > *q);
            if better {
                best_fit = Some((bytes, quality));
            }
            if quality >= options.max_quality {
                break;
            }
            low = quality;
        } else {
            let lower = lowest.as_ref().is_none_or(|(_, q)| quality < *q);
            if lower {
                lowest = Some((bytes, quality));
            }
            high = quality;
        }
        quality = (low + high) / 2.0;
    }

    let (bytes, quality) = match (best_fit, lowest) {
        (Some(fit), _) => fit,
        (None, Some(lowest)) => lowest,
        (None, None) => (encode_jpeg(&image, options.min_quality)?, options.min_quality),
    };
    Ok(Compressed { bytes, quality, iterations, width, height })
}
