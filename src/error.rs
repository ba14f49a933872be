use std::path::PathBuf;

use crate::annotation::ParseError;

/// Errors raised while turning sample tables into a count matrix.
#[derive(Debug, thiserror::Error)]
pub enum CountError {
    #[error("I/O error: {source} ({})", .path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error(transparent)]
    Annotation(#[from] ParseError),

    #[error("{}:{line_no}: {problem}: {line}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line_no: usize,
        problem: String,
        line: String,
    },

    #[error("sample '{sample}': exon '{exon_id}' of transcript '{local_id}' has no row in e_data.ctab")]
    MissingExonData {
        sample: String,
        local_id: String,
        exon_id: String,
    },

    #[error("sample '{sample}': transcript '{local_id}' ({reference_key}) has no exons in e2t.ctab")]
    MissingTranscriptMapping {
        sample: String,
        local_id: String,
        reference_key: String,
    },

    #[error("no sample directories found under {}", .root.display())]
    NoSamples { root: PathBuf },
}

impl CountError {
    /// Convenience for wrapping an `io::Error` with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}
