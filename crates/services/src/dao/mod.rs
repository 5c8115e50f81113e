pub mod ambassador;
pub mod base;
pub mod order;
pub mod otp;
pub mod reward;
pub mod user;
pub mod waitlist;

pub use base::{BaseDao, DaoError, DaoResult, PaginatedResult, PaginationParams};
