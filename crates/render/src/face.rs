//! Face-aware cropping entry points.
//!
//! No detector ships with GroupFrame. [`NoFaceDetection`] always reports an
//! empty result, so [`face_crop`] falls through to the centered cover crop.
//! The trait stays async so a model-backed detector can slot in without
//! touching call sites.

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::crop::{cover_crop, cover_crop_rect_around, crop_to_rect, encode_jpeg};
use crate::error::RenderResult;

pub const FACE_CROP_JPEG_QUALITY: f32 = 0.95;

/// Bounding box in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FaceBox {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn load_models(&self) -> RenderResult<()> {
        Ok(())
    }

    async fn detect_faces(&self, image: &DynamicImage) -> RenderResult<Vec<FaceBox>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceDetection;

#[async_trait]
impl FaceDetector for NoFaceDetection {
    async fn detect_faces(&self, _image: &DynamicImage) -> RenderResult<Vec<FaceBox>> {
        Ok(Vec::new())
    }
}

/// Crops around the first detected face, or the image center when there is
/// none. A detector error is logged and treated as "no faces".
pub async fn crop_for_cell(
    detector: &dyn FaceDetector,
    image: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> RenderResult<DynamicImage> {
    let focus = match detector.detect_faces(image).await {
        Ok(faces) => faces.first().map(FaceBox::center),
        Err(e) => {
            warn!(error = %e, "Face detection failed, using centered crop");
            None
        }
    };
    let cropped = match focus {
        Some(focus) => {
            let rect = cover_crop_rect_around(
                image.width(),
                image.height(),
                target_w,
                target_h,
                focus,
            );
            crop_to_rect(image, rect, target_w, target_h)
        }
        None => cover_crop(image, target_w, target_h),
    };
    Ok(cropped)
}

/// Cell-sized crop encoded as JPEG at [`FACE_CROP_JPEG_QUALITY`].
pub async fn face_crop(
    detector: &dyn FaceDetector,
    image: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> RenderResult<Vec<u8>> {
    let cropped = crop_for_cell(detector, image, target_w, target_h).await?;
    encode_jpeg(&cropped, FACE_CROP_JPEG_QUALITY)
}
