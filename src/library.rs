//! Song library: scanning a songs folder into display entries.
//!
//! Each song package folder contributes one entry per audio file; the entry's
//! title comes from the folder name with the beatmap-set id stripped.

mod filter;
mod model;
mod scan;
mod title;

pub use filter::filter_indices;
pub use model::LibraryEntry;
#[cfg(test)]
pub use scan::scan;
pub use scan::{ScanOutcome, scan_until};
pub use title::strip_leading_numeric_prefix;
