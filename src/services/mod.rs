pub mod report_service;
pub mod subscription_service;

pub use report_service::*;
pub use subscription_service::*;
