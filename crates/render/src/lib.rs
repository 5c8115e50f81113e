pub mod canvas;
pub mod compress;
pub mod crop;
pub mod error;
pub mod face;
pub mod flow;
pub mod grid;
pub mod order;
pub mod photo;
pub mod variants;

pub use canvas::{CanvasRenderer, CanvasSpec};
pub use error::RenderError;
pub use face::{FaceDetector, NoFaceDetection};
pub use flow::{
    FlowConfig, HttpOrderSource, OrderSource, RenderFlow, RenderReport, RenderStatus,
    RenderedImage, VariantListing, VariantRenderer,
};
pub use grid::{Eligibility, GridDimensions, GridTemplate};
pub use order::{CanvasSettings, Member, RenderOrder};
pub use photo::{HttpPhotoLoader, PhotoLoader};
pub use variants::{Variant, generate_grid_variants};
