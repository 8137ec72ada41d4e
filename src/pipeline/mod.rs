//! Pipeline module - orchestrates the analysis stages

pub mod aggregate;
pub mod clean;
pub mod features;
pub mod loader;
pub mod outcome;

pub use aggregate::*;
pub use clean::*;
pub use features::*;
pub use loader::*;
pub use outcome::*;
