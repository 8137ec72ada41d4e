//! Report module - terminal output, SVG charts and the export bundle

pub mod charts;
pub mod export;
pub mod summary;
pub mod table;

pub use charts::*;
pub use export::*;
pub use summary::*;
pub use table::*;
