pub mod revenuecat;

pub use revenuecat::*;
