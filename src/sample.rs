//! Per-sample ctab tables written by the assembler for ballgown.
//!
//! Each sample directory holds:
//! - `e2t.ctab`: exon-to-transcript mapping
//! - `e_data.ctab`: exon level counts
//! - `t_data.ctab`: transcript summary, including the reference transcript name

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::CountError;
use crate::model::types::CountColumn;

pub const E2T_FILE: &str = "e2t.ctab";
pub const EXON_DATA_FILE: &str = "e_data.ctab";
pub const TRANSCRIPT_DATA_FILE: &str = "t_data.ctab";

/// Local transcript id -> exon ids, in file order (duplicates kept).
pub type ExonToTranscriptMap = HashMap<String, Vec<String>>;

/// Exon id -> read count.
pub type ExonCounts = HashMap<String, u64>;

/// One `t_data.ctab` row: sample-local id plus the reference key it joins to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSummaryRow {
    pub local_id: String,
    pub reference_key: String,
}

/// The three tables of one sample, fully loaded.
#[derive(Debug, Clone, Default)]
pub struct SampleTables {
    pub name: String,
    pub exons_by_transcript: ExonToTranscriptMap,
    pub exon_counts: ExonCounts,
    pub summary: Vec<TranscriptSummaryRow>,
}

impl SampleTables {
    /// Load `e2t.ctab`, `e_data.ctab` and `t_data.ctab` from `dir`.
    ///
    /// The sample name is the directory's base name.
    pub fn load(dir: &Path, column: CountColumn) -> Result<Self, CountError> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());

        let e2t_path = dir.join(E2T_FILE);
        let exons_by_transcript = read_e2t(open(&e2t_path)?, &e2t_path)?;

        let e_path = dir.join(EXON_DATA_FILE);
        let exon_counts = read_exon_counts(open(&e_path)?, &e_path, column)?;

        let t_path = dir.join(TRANSCRIPT_DATA_FILE);
        let summary = read_summary(open(&t_path)?, &t_path)?;

        log::debug!(
            "sample '{}': {} transcripts mapped, {} exons counted, {} summary rows",
            name,
            exons_by_transcript.len(),
            exon_counts.len(),
            summary.len()
        );

        Ok(Self {
            name,
            exons_by_transcript,
            exon_counts,
            summary,
        })
    }
}

fn open(path: &Path) -> Result<BufReader<File>, CountError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| CountError::io(e, path))
}

/// Non-header data lines of a ctab file with their 1-based line numbers.
///
/// Blank lines and lines starting with `header` are skipped.
fn data_lines<R: BufRead>(
    reader: R,
    path: &Path,
    header: &str,
) -> impl Iterator<Item = Result<(usize, String), CountError>> {
    let path: PathBuf = path.to_path_buf();
    let header = header.to_string();

    reader
        .lines()
        .enumerate()
        .filter_map(move |(i, line)| match line {
            Err(e) => Some(Err(CountError::io(e, &path))),
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() || line.starts_with(header.as_str()) {
                    None
                } else {
                    Some(Ok((i + 1, line.to_string())))
                }
            }
        })
}

fn malformed(path: &Path, line_no: usize, problem: String, line: &str) -> CountError {
    CountError::MalformedRow {
        path: path.to_path_buf(),
        line_no,
        problem,
        line: line.to_string(),
    }
}

/// Parse `e2t.ctab`: two columns, exon id then transcript id.
pub fn read_e2t<R: BufRead>(reader: R, path: &Path) -> Result<ExonToTranscriptMap, CountError> {
    let mut map = ExonToTranscriptMap::new();

    for item in data_lines(reader, path, "e_id") {
        let (line_no, line) = item?;
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() != 2 {
            return Err(malformed(
                path,
                line_no,
                format!("expected 2 columns, found {}", cols.len()),
                &line,
            ));
        }
        map.entry(cols[1].to_string())
            .or_default()
            .push(cols[0].to_string());
    }

    Ok(map)
}

/// Parse `e_data.ctab`: exon id in column 0, count in `column`.
pub fn read_exon_counts<R: BufRead>(
    reader: R,
    path: &Path,
    column: CountColumn,
) -> Result<ExonCounts, CountError> {
    let mut counts = ExonCounts::new();
    let idx = column.index();

    for item in data_lines(reader, path, "e_id") {
        let (line_no, line) = item?;
        let cols: Vec<&str> = line.split('\t').collect();
        let Some(raw) = cols.get(idx) else {
            return Err(malformed(
                path,
                line_no,
                format!("expected at least {} columns for {column}, found {}", idx + 1, cols.len()),
                &line,
            ));
        };
        let n: u64 = raw.parse().map_err(|_| {
            malformed(path, line_no, format!("{column} '{raw}' is not an integer"), &line)
        })?;
        counts.insert(cols[0].to_string(), n);
    }

    Ok(counts)
}

/// Parse `t_data.ctab`: local id in column 0, reference key in column 5.
pub fn read_summary<R: BufRead>(
    reader: R,
    path: &Path,
) -> Result<Vec<TranscriptSummaryRow>, CountError> {
    let mut rows = Vec::new();

    for item in data_lines(reader, path, "t_id") {
        let (line_no, line) = item?;
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 6 {
            return Err(malformed(
                path,
                line_no,
                format!("expected at least 6 columns, found {}", cols.len()),
                &line,
            ));
        }
        rows.push(TranscriptSummaryRow {
            local_id: cols[0].to_string(),
            reference_key: cols[5].to_string(),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn p(name: &str) -> PathBuf {
        PathBuf::from("S1").join(name)
    }

    #[test]
    fn e2t_keeps_order_and_duplicates() {
        let data = "e_id\tt_id\n1\t1\n2\t1\n3\t2\n\n1\t1\n";
        let map = read_e2t(Cursor::new(data), &p(E2T_FILE)).unwrap();

        assert_eq!(map["1"], vec!["1", "2", "1"]);
        assert_eq!(map["2"], vec!["3"]);
    }

    #[test]
    fn e2t_rejects_wrong_column_count() {
        let data = "e_id\tt_id\n1\t1\t9\n";
        let err = read_e2t(Cursor::new(data), &p(E2T_FILE)).unwrap_err();
        match err {
            CountError::MalformedRow { line_no, .. } => assert_eq!(line_no, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn exon_counts_use_selected_column_and_last_wins() {
        let data = "\
e_id\tchr\tstrand\tstart\tend\trcount\tucount\tmrcount\tcov
1\tchr1\t+\t101\t150\t9\t5\t7.5\t1.0
2\tchr1\t+\t201\t250\t4\t3\t3.0\t1.0
1\tchr1\t+\t101\t150\t11\t6\t7.0\t1.0
";
        let counts = read_exon_counts(Cursor::new(data), &p(EXON_DATA_FILE), CountColumn::Ucount).unwrap();
        assert_eq!(counts["1"], 6);
        assert_eq!(counts["2"], 3);

        let counts = read_exon_counts(Cursor::new(data), &p(EXON_DATA_FILE), CountColumn::Rcount).unwrap();
        assert_eq!(counts["1"], 11);

        // mrcount is fractional here and must be rejected, not truncated.
        let err = read_exon_counts(Cursor::new(data), &p(EXON_DATA_FILE), CountColumn::Mrcount).unwrap_err();
        assert!(err.to_string().contains("not an integer"));
    }

    #[test]
    fn exon_counts_short_row_is_reported() {
        let data = "e_id\tchr\n1\tchr1\t+\n";
        let err = read_exon_counts(Cursor::new(data), &p(EXON_DATA_FILE), CountColumn::Ucount).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("e_data.ctab:2"));
        assert!(msg.contains("ucount"));
    }

    #[test]
    fn summary_rows_in_file_order() {
        let data = "\
t_id\tchr\tstrand\tstart\tend\tt_name\tnum_exons
2\tchr1\t+\t1\t10\tT2\t1
1\tchr1\t+\t1\t10\tT1\t2
";
        let rows = read_summary(Cursor::new(data), &p(TRANSCRIPT_DATA_FILE)).unwrap();
        assert_eq!(
            rows,
            vec![
                TranscriptSummaryRow { local_id: "2".into(), reference_key: "T2".into() },
                TranscriptSummaryRow { local_id: "1".into(), reference_key: "T1".into() },
            ]
        );

        assert!(read_summary(Cursor::new("t_id\n1\tchr1\n"), &p(TRANSCRIPT_DATA_FILE)).is_err());
    }

    #[test]
    fn load_reports_missing_table_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = SampleTables::load(dir.path(), CountColumn::Ucount).unwrap_err();
        assert!(matches!(err, CountError::Io { .. }));
        assert!(err.to_string().contains(E2T_FILE));
    }
}
