pub mod analyze;
pub mod config;
pub mod estimate;
pub mod validate;
