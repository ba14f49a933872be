use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::annotation::io::ParseError;
use crate::index::ReferenceIndex;
use crate::model::types::IdLookup;

/// High-level builder for creating a [`ReferenceIndex`] from an annotation file.
///
/// - parses the whole file (optionally gzipped)
/// - configurable transcript id lookup (positional or by attribute key)
#[derive(Debug, Clone, Default)]
pub struct ReferenceBuilder {
    pub id_lookup: IdLookup,
}

impl ReferenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id_lookup(mut self, lookup: IdLookup) -> Self {
        self.id_lookup = lookup;
        self
    }

    /// Look the transcript id up by attribute key instead of position.
    pub fn id_key(mut self, key: &str) -> Self {
        self.id_lookup = IdLookup::ByKey(key.to_string());
        self
    }

    /// Build index from anything implementing `BufRead`.
    pub fn build_from_reader<R: BufRead>(&self, reader: R) -> Result<ReferenceIndex, ParseError> {
        ReferenceIndex::from_reader(reader, &self.id_lookup)
    }

    /// Build index from a file path.
    ///
    /// - If path ends with `.gz`, uses a gzip decoder.
    /// - Otherwise reads as plain text.
    pub fn build_from_path<P: AsRef<Path>>(&self, path: P) -> Result<ReferenceIndex, ParseError> {
        let path = path.as_ref();
        let io_err = |e| ParseError::IoPath {
            path: path.display().to_string(),
            source: e,
        };
        let file = std::fs::File::open(path).map_err(io_err)?;

        let is_gz = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        let index = if is_gz {
            let decoder = flate2::read::GzDecoder::new(file);
            self.build_from_reader(BufReader::new(decoder))
        } else {
            self.build_from_reader(BufReader::new(file))
        };

        // Read errors surface as IoPath("<reader>"); attach the real path.
        index.map_err(|e| match e {
            ParseError::IoPath { source, .. } => io_err(source),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const GTF: &str = "\
##description: anchor
chr1\tsrc\ttranscript\t101\t250\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1.1\";
chr1\tsrc\texon\t101\t150\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1.1\"; exon_number \"1\";
chr1\tsrc\texon\t201\t250\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1.1\"; exon_number \"2\";
chr2\tsrc\ttranscript\t5\t40\t.\t-\t.\tgene_id \"G2\"; transcript_id \"T2\";
";

    #[test]
    fn builder_default_indexes_only_transcripts() {
        let idx = ReferenceBuilder::new()
            .build_from_reader(Cursor::new(GTF.as_bytes()))
            .unwrap();

        assert_eq!(idx.len(), 2);
        assert!(idx.contains("T1.1"));
        assert!(idx.contains("T2"));
        assert_eq!(idx.chr_names, vec!["chr1".to_string(), "chr2".to_string()]);
    }

    #[test]
    fn builder_keyed_lookup() {
        let gtf = "chr1\tsrc\ttranscript\t1\t10\t.\t+\t.\ttranscript_id \"TX\"; gene_id \"G\";\n";
        let idx = ReferenceBuilder::new()
            .id_key("transcript_id")
            .build_from_reader(Cursor::new(gtf.as_bytes()))
            .unwrap();
        assert!(idx.contains("TX"));

        // Positional default would read `gene_id "G"` here.
        let idx = ReferenceBuilder::new()
            .id_lookup(IdLookup::Positional(1))
            .build_from_reader(Cursor::new(gtf.as_bytes()))
            .unwrap();
        assert!(idx.contains("gene_idG"));
        assert!(!idx.contains("TX"));
    }

    #[test]
    fn builder_reads_gzipped_annotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchor.gtf.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut gz = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        gz.write_all(GTF.as_bytes()).unwrap();
        gz.finish().unwrap();

        let idx = ReferenceBuilder::new().build_from_path(&path).unwrap();
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn builder_missing_file_names_path() {
        let err = ReferenceBuilder::new()
            .build_from_path("/nonexistent/anchor.gtf")
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/anchor.gtf"));
    }
}
