pub mod ambassador;
pub mod auth;
pub mod background;
pub mod dao;
pub mod dashboard;
pub mod export;
pub mod orders;
pub mod otp;
pub mod pricing;
pub mod referral;
pub mod render;
pub mod sms;

pub use ambassador::AmbassadorService;
pub use auth::AuthService;
pub use background::TaskService;
pub use dao::*;
pub use dashboard::DashboardService;
pub use orders::OrderService;
pub use otp::OtpService;
pub use render::RenderService;
