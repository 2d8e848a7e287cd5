//! Error types for the Recall protocol layer.

mod cache;
mod embedding;
mod search;
mod source;

pub use cache::*;
pub use embedding::*;
pub use search::*;
pub use source::*;
