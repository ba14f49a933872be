use std::io::BufRead;

use thiserror::Error;

use crate::model::types::IdLookup;
use crate::types::{Locus, Strand};

/// A single parsed record line from a GTF-like annotation.
///
/// Coordinates stay 1-based inclusive, as written in the file.
/// The attribute column is kept raw; see [`AnnotationRecord::transcript_key`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub line_no: usize,
    pub seqname: String,      // chromosome / contig
    pub feature_type: String, // column 3
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub attributes: String, // column 9
}

impl AnnotationRecord {
    pub fn is_transcript(&self) -> bool {
        self.feature_type == "transcript"
    }

    pub fn locus(&self) -> Locus {
        Locus {
            chrom: self.seqname.clone(),
            start: self.start,
            end: self.end,
            strand: self.strand,
        }
    }

    /// Extract the raw (still quoted) transcript identifier.
    ///
    /// Positional lookup splits the attribute column on `;` and removes the
    /// `transcript_id ` prefix from the selected field. Keyed lookup scans all
    /// fields for `<key> <value>`.
    pub fn transcript_key(&self, lookup: &IdLookup) -> Result<String, ParseError> {
        let fields: Vec<&str> = self.attributes.split(';').collect();

        let raw = match lookup {
            IdLookup::Positional(idx) => {
                let field = fields.get(*idx).ok_or_else(|| ParseError::MissingTranscriptId {
                    line_no: self.line_no,
                    problem: format!(
                        "expected at least {} ';'-separated attributes, found {}",
                        idx + 1,
                        fields.len()
                    ),
                })?;
                field.replace("transcript_id ", "")
            }
            IdLookup::ByKey(key) => fields
                .iter()
                .find_map(|f| {
                    let mut kv = f.trim().splitn(2, char::is_whitespace);
                    match (kv.next(), kv.next()) {
                        (Some(k), Some(v)) if k == key => Some(v.to_string()),
                        _ => None,
                    }
                })
                .ok_or_else(|| ParseError::MissingTranscriptId {
                    line_no: self.line_no,
                    problem: format!("no '{key}' attribute"),
                })?,
        };

        if raw.chars().all(|c| c == '"' || c.is_whitespace()) {
            return Err(ParseError::MissingTranscriptId {
                line_no: self.line_no,
                problem: "empty transcript identifier".to_string(),
            });
        }
        Ok(raw)
    }
}

/// Parsing errors for the annotation file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error while reading '{path}': {source}")]
    IoPath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed annotation line {line_no} ({problem}): {line}")]
    MalformedLine {
        line_no: usize,
        problem: String,
        line: String,
    },

    #[error("bad coordinates in annotation line {line_no}: {line}")]
    BadCoordinates { line_no: usize, line: String },

    #[error("transcript record on line {line_no} has no usable transcript id: {problem}")]
    MissingTranscriptId { line_no: usize, problem: String },
}

/// Streaming parser for GTF-like annotation files.
///
/// Most users should go through [`crate::annotation::ReferenceBuilder`].
///
/// # Example
/// ```
/// use std::io::Cursor;
/// use ballgown_counts::annotation::AnnotationReader;
///
/// let gtf = "#hdr\nchr1\tsrc\ttranscript\t1\t9\t.\t+\t.\tgene_id \"G\"; transcript_id \"T1\";\n";
/// let recs: Vec<_> = AnnotationReader::new(Cursor::new(gtf))
///     .records()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(recs.len(), 1);
/// assert_eq!(recs[0].line_no, 2);
/// ```
pub struct AnnotationReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> AnnotationReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Returns an iterator over parsed records.
    ///
    /// - Skips blank lines
    /// - Skips comment lines starting with '#'
    pub fn records(mut self) -> impl Iterator<Item = Result<AnnotationRecord, ParseError>> {
        std::iter::from_fn(move || loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => {
                    return Some(Err(ParseError::IoPath {
                        path: "<reader>".to_string(),
                        source: e,
                    }))
                }
            }

            let line = self.buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return Some(parse_record_line(line, self.line_no));
        })
    }
}

/// Parse a single non-comment line into an `AnnotationRecord`.
pub fn parse_record_line(line: &str, line_no: usize) -> Result<AnnotationRecord, ParseError> {
    let malformed = |problem: &str| ParseError::MalformedLine {
        line_no,
        problem: problem.to_string(),
        line: line.to_string(),
    };

    // seqname source feature start end score strand phase attributes
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() != 9 {
        return Err(malformed(&format!("expected 9 columns, found {}", cols.len())));
    }

    let bad_coords = || ParseError::BadCoordinates {
        line_no,
        line: line.to_string(),
    };
    let start: u64 = cols[3].parse().map_err(|_| bad_coords())?;
    let end: u64 = cols[4].parse().map_err(|_| bad_coords())?;
    if start == 0 || end < start {
        return Err(bad_coords());
    }

    let strand = Strand::from_column(cols[6]).ok_or_else(|| malformed("unknown strand"))?;

    Ok(AnnotationRecord {
        line_no,
        seqname: cols[0].to_string(),
        feature_type: cols[2].to_string(),
        start,
        end,
        strand,
        attributes: cols[8].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TX_LINE: &str =
        "chr1\tStringTie\ttranscript\t101\t250\t1000\t+\t.\tgene_id \"G1\"; transcript_id \"T1.2\"; ref_gene_name \"ABC\";";

    #[test]
    fn parse_transcript_line() {
        let rec = parse_record_line(TX_LINE, 7).unwrap();

        assert!(rec.is_transcript());
        assert_eq!(rec.line_no, 7);
        assert_eq!(rec.seqname, "chr1");
        assert_eq!(rec.start, 101);
        assert_eq!(rec.end, 250);
        assert_eq!(rec.strand, Strand::Plus);
        assert_eq!(rec.transcript_key(&IdLookup::default()).unwrap(), " \"T1.2\"");
    }

    #[test]
    fn positional_lookup_requires_second_attribute() {
        let line = "chr1\tsrc\ttranscript\t1\t10\t.\t-\t.\ttranscript_id \"T1\"";
        let rec = parse_record_line(line, 1).unwrap();
        let err = rec.transcript_key(&IdLookup::Positional(1)).unwrap_err();
        assert!(matches!(err, ParseError::MissingTranscriptId { line_no: 1, .. }));
    }

    #[test]
    fn keyed_lookup_ignores_position() {
        let line = "chr1\tsrc\ttranscript\t1\t10\t.\t-\t.\ttranscript_id \"T9\"; gene_id \"G9\";";
        let rec = parse_record_line(line, 1).unwrap();
        let key = rec
            .transcript_key(&IdLookup::ByKey("transcript_id".into()))
            .unwrap();
        assert_eq!(key, "\"T9\"");

        let missing = rec.transcript_key(&IdLookup::ByKey("ref_id".into()));
        assert!(missing.is_err());
    }

    #[test]
    fn short_or_bad_lines_are_fatal() {
        assert!(matches!(
            parse_record_line("chr1\tsrc\texon", 3),
            Err(ParseError::MalformedLine { line_no: 3, .. })
        ));
        assert!(matches!(
            parse_record_line("chr1\tsrc\texon\t50\t10\t.\t+\t.\tx", 4),
            Err(ParseError::BadCoordinates { line_no: 4, .. })
        ));
        assert!(matches!(
            parse_record_line("chr1\tsrc\texon\t1\t10\t.\t*\t.\tx", 5),
            Err(ParseError::MalformedLine { .. })
        ));
    }

    #[test]
    fn streaming_reader_skips_comments_and_blank_lines() {
        let data = format!("#comment\n{TX_LINE}\n\n{TX_LINE}\n");
        let reader = AnnotationReader::new(Cursor::new(data.as_bytes()));

        let recs: Vec<_> = reader.records().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].line_no, 2);
        assert_eq!(recs[1].line_no, 4);
    }
}
