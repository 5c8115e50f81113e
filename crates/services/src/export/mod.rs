pub mod invoice;
pub mod pdf;

pub use invoice::render_invoice;
