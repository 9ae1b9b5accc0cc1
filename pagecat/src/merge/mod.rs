//! Merging selected pages into one document.
//!
//! - [`builder`]: the document construction seam and its lopdf implementation
//! - [`merger`]: the loop over the selection, with progress reporting
//! - [`metadata`]: the Info dictionary of the output

pub mod builder;
pub mod merger;
pub mod metadata;

pub use builder::{DocumentBuilder, LopdfBuilder};
pub use merger::{MergeOutput, MergeProgress, MergeStatistics, Merger};
