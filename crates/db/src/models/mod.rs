pub mod ambassador;
pub mod ambassador_waitlist;
pub mod background_task;
pub mod order;
pub mod otp;
pub mod reward;
pub mod user;

pub use ambassador::*;
pub use ambassador_waitlist::*;
pub use background_task::*;
pub use order::*;
pub use otp::*;
pub use reward::*;
pub use user::*;
