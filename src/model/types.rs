use std::fmt;

/// Internal numeric ID (index into the transcript Vec).
pub type TranscriptId = usize;

/// Which `e_data.ctab` column supplies the per-exon read count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountColumn {
    /// All reads overlapping the exon.
    Rcount,
    /// Reads unambiguously assigned to the exon.
    #[default]
    Ucount,
    /// Multi-mapping-corrected read count.
    Mrcount,
}

impl CountColumn {
    /// 0-based column index in `e_data.ctab`.
    pub fn index(self) -> usize {
        match self {
            CountColumn::Rcount => 5,
            CountColumn::Ucount => 6,
            CountColumn::Mrcount => 7,
        }
    }
}

impl fmt::Display for CountColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CountColumn::Rcount => "rcount",
            CountColumn::Ucount => "ucount",
            CountColumn::Mrcount => "mrcount",
        };
        write!(f, "{s}")
    }
}

/// Row granularity of the output matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixLevel {
    #[default]
    Transcript,
    /// Isoforms summed per derived gene identifier.
    Gene,
}

impl MatrixLevel {
    /// Label of the first header cell.
    pub fn row_label(self) -> &'static str {
        match self {
            MatrixLevel::Transcript => "transcriptId",
            MatrixLevel::Gene => "geneId",
        }
    }
}

/// How the transcript identifier is pulled out of the attribute column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdLookup {
    /// Take the `;`-separated field at this index and strip the
    /// `transcript_id ` prefix, quotes and whitespace.
    Positional(usize),
    /// Find the attribute with this key anywhere in the column.
    ByKey(String),
}

impl Default for IdLookup {
    fn default() -> Self {
        IdLookup::Positional(1)
    }
}
