use crate::model::types::TranscriptId;
use crate::types::Locus;

/// Reference transcript from the anchor annotation.
///
/// Immutable once the index is built: per-sample counts live in
/// [`crate::aggregate::TranscriptAccumulator`], never here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTranscript {
    pub id: TranscriptId,
    pub key: String,
    pub gene_key: String,
    pub locus: Locus,
}

impl ReferenceTranscript {
    /// Build from a raw attribute value. Quotes and whitespace are removed
    /// from `raw_key` wherever they occur.
    pub fn new(id: TranscriptId, raw_key: &str, locus: Locus) -> Self {
        let key = clean_key(raw_key);
        let gene_key = derive_gene_key(&key).to_string();
        Self {
            id,
            key,
            gene_key,
            locus,
        }
    }
}

/// Remove every double quote and whitespace character.
pub fn clean_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '"' && !c.is_whitespace())
        .collect()
}

/// Strip a trailing `.<digit>` isoform suffix.
///
/// Only a single digit is removed: `ENST1.2` becomes `ENST1`, while
/// `ENST1.12` is returned unchanged.
pub fn derive_gene_key(key: &str) -> &str {
    let b = key.as_bytes();
    let n = b.len();
    if n >= 2 && b[n - 1].is_ascii_digit() && b[n - 2] == b'.' {
        &key[..n - 2]
    } else {
        key
    }
}
