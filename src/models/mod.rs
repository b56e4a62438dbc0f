pub mod customer;
pub mod pagination;
pub mod subscription;

pub use customer::*;
pub use pagination::*;
pub use subscription::*;
