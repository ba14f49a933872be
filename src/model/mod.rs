pub mod types;
pub mod transcript;

pub use types::{CountColumn, IdLookup, MatrixLevel, TranscriptId};
