use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("At least {required} members with photos are needed to generate variants (found {found})")]
    InsufficientMembers { required: usize, found: usize },
    #[error("Order is not eligible for variants: {0}")]
    NotEligible(String),
    #[error("Order fetch timed out after {} seconds", .0.as_secs())]
    FetchTimeout(Duration),
    #[error("Failed to fetch order: {0}")]
    Fetch(String),
    #[error("Render timed out after {} seconds", .0.as_secs())]
    RenderTimeout(Duration),
    #[error("Variant not found: {0}")]
    VariantNotFound(String),
    #[error("Failed to load photo {reference}: {reason}")]
    Photo { reference: String, reason: String },
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Render task failed: {0}")]
    Task(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
