//! ballgown_counts
//!
//! Turn per-sample ballgown tables (`e2t.ctab`, `e_data.ctab`, `t_data.ctab`)
//! into one transcript-by-sample read-count matrix for DESeq2-style tools.
//! Sample-local transcript ids are resolved through a shared reference
//! annotation, exon counts are summed per reference transcript, and missing
//! (transcript, sample) cells are written as 0.

pub mod types;
pub mod model;
pub mod annotation;
pub mod index;
pub mod error;
pub mod sample;
pub mod aggregate;
pub mod matrix;
pub mod pipeline;

pub use index::ReferenceIndex;

pub use annotation::ReferenceBuilder;

pub use error::CountError;
pub use types::{Locus, Strand};

pub use aggregate::{aggregate_sample, SampleResult, TranscriptAccumulator};
pub use matrix::CountMatrix;
pub use pipeline::{build_matrix, discover_samples, run, PipelineOptions, SampleDir};
pub use sample::SampleTables;

pub use model::transcript::ReferenceTranscript;
pub use model::types::{CountColumn, IdLookup, MatrixLevel};
