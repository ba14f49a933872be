use std::ffi::OsStr;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::aggregate::aggregate_sample;
use crate::annotation::ReferenceBuilder;
use crate::error::CountError;
use crate::index::ReferenceIndex;
use crate::matrix::CountMatrix;
use crate::model::types::{CountColumn, IdLookup, MatrixLevel};
use crate::sample::SampleTables;

/// Run configuration, usually filled from the command line.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub id_lookup: IdLookup,
    pub count_column: CountColumn,
    pub level: MatrixLevel,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id_lookup(mut self, lookup: IdLookup) -> Self {
        self.id_lookup = lookup;
        self
    }

    pub fn count_column(mut self, column: CountColumn) -> Self {
        self.count_column = column;
        self
    }

    pub fn level(mut self, level: MatrixLevel) -> Self {
        self.level = level;
        self
    }
}

/// A sample directory found under the sample root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleDir {
    pub name: String,
    pub path: PathBuf,
}

/// List sample directories under `root`, sorted by name.
///
/// Entries whose name ends with `.<exclude_ext>` are ignored, so the
/// annotation can live next to the samples. Other non-directories are skipped
/// with a warning.
pub fn discover_samples(root: &Path, exclude_ext: Option<&str>) -> Result<Vec<SampleDir>, CountError> {
    let suffix = exclude_ext.map(|e| format!(".{e}"));
    let mut out = Vec::new();

    for entry in fs::read_dir(root).map_err(|e| CountError::io(e, root))? {
        let entry = entry.map_err(|e| CountError::io(e, root))?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if suffix.as_deref().is_some_and(|s| name.ends_with(s)) {
            log::debug!("skipping '{}': annotation extension", name);
            continue;
        }

        let path = entry.path();
        if !path.is_dir() {
            log::warn!("skipping '{}': not a sample directory", path.display());
            continue;
        }

        out.push(SampleDir { name, path });
    }

    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

/// Extension used to keep the annotation out of sample discovery.
///
/// For a gzipped annotation the extension before `.gz` is used, so
/// `anchor.gtf.gz` excludes `*.gtf` entries.
pub fn annotation_extension(annotation: &Path) -> Option<&str> {
    let ext = annotation.extension()?;
    if ext.eq_ignore_ascii_case("gz") {
        Path::new(annotation.file_stem()?).extension().and_then(OsStr::to_str)
    } else {
        ext.to_str()
    }
}

/// Aggregate every sample into a matrix at the requested level.
pub fn build_matrix(
    reference: &ReferenceIndex,
    samples: &[SampleDir],
    opts: &PipelineOptions,
) -> Result<CountMatrix, CountError> {
    let mut matrix = CountMatrix::new();

    for sample in samples {
        let tables = SampleTables::load(&sample.path, opts.count_column)?;

        let result = aggregate_sample(&tables, reference)?;
        log::info!("sample '{}': {} transcripts", sample.name, result.len());
        matrix.add_sample(sample.name.clone(), &result);
    }

    Ok(match opts.level {
        MatrixLevel::Transcript => matrix,
        MatrixLevel::Gene => matrix.collapse_by(|key| reference.gene_key_for(key).to_string()),
    })
}

/// Build the reference, aggregate all samples under `sample_root` and write
/// the matrix to `output`.
///
/// Nothing is written unless every sample aggregated successfully. The
/// matrix goes to a temporary file next to `output` which is then renamed
/// over it, so an existing output is never left half-written.
pub fn run(
    annotation: &Path,
    sample_root: &Path,
    output: &Path,
    opts: &PipelineOptions,
) -> Result<CountMatrix, CountError> {
    let reference = ReferenceBuilder::new()
        .id_lookup(opts.id_lookup.clone())
        .build_from_path(annotation)?;
    log::info!("{}", reference.to_string().trim_end());

    let samples = discover_samples(sample_root, annotation_extension(annotation))?;
    if samples.is_empty() {
        return Err(CountError::NoSamples {
            root: sample_root.to_path_buf(),
        });
    }

    let matrix = build_matrix(&reference, &samples, opts)?;

    write_atomically(output, |w| matrix.write_tsv(w, opts.level.row_label()))?;

    Ok(matrix)
}

fn write_atomically<F>(output: &Path, write: F) -> Result<(), CountError>
where
    F: FnOnce(&mut BufWriter<&mut fs::File>) -> std::io::Result<()>,
{
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CountError::io(e, dir))?;

    {
        let mut w = BufWriter::new(tmp.as_file_mut());
        write(&mut w).map_err(|e| CountError::io(e, output))?;
        w.flush().map_err(|e| CountError::io(e, output))?;
    }

    tmp.persist(output).map_err(|e| CountError::io(e.error, output))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_sorts_and_excludes_annotation_extension() {
        let root = tempfile::tempdir().unwrap();
        for d in ["s_b", "s_a", "merged.gtf"] {
            fs::create_dir(root.path().join(d)).unwrap();
        }
        fs::write(root.path().join("notes.txt"), "x").unwrap();

        let found = discover_samples(root.path(), Some("gtf")).unwrap();
        let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["s_a", "s_b"]);
        assert_eq!(found[0].path, root.path().join("s_a"));

        let found = discover_samples(root.path(), None).unwrap();
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn gzipped_annotation_excludes_inner_extension() {
        assert_eq!(annotation_extension(Path::new("/a/anchor.gtf")), Some("gtf"));
        assert_eq!(annotation_extension(Path::new("/a/anchor.gtf.gz")), Some("gtf"));
        assert_eq!(annotation_extension(Path::new("anchor.GFF.GZ")), Some("GFF"));
        assert_eq!(annotation_extension(Path::new("anchor.gz")), None);
        assert_eq!(annotation_extension(Path::new("anchor")), None);
    }

    #[test]
    fn atomic_write_replaces_output_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("counts.tsv");
        fs::write(&out, "old").unwrap();

        let err = write_atomically(&out, |w| {
            w.write_all(b"partial")?;
            Err(std::io::Error::other("boom"))
        })
        .unwrap_err();
        assert!(matches!(err, CountError::Io { .. }));
        assert_eq!(fs::read_to_string(&out).unwrap(), "old");

        write_atomically(&out, |w| w.write_all(b"new\n")).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "new\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn options_builder() {
        let o = PipelineOptions::new()
            .count_column(CountColumn::Rcount)
            .level(MatrixLevel::Gene)
            .id_lookup(IdLookup::ByKey("transcript_id".into()));
        assert_eq!(o.count_column, CountColumn::Rcount);
        assert_eq!(o.level, MatrixLevel::Gene);
        assert_eq!(o.id_lookup, IdLookup::ByKey("transcript_id".into()));
    }
}
