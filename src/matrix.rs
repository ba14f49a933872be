use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::aggregate::SampleResult;

/// Wide count matrix: one row per key, one column per sample.
///
/// Rows are kept in lexicographic key order, columns in the order samples were
/// added. Every cell is populated; a key missing from a sample reads as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountMatrix {
    samples: Vec<String>,
    rows: BTreeMap<String, Vec<u64>>,
}

impl CountMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `result` as the next column named `sample`.
    pub fn add_sample(&mut self, sample: impl Into<String>, result: &SampleResult) {
        let col = self.samples.len();
        self.samples.push(sample.into());

        for counts in self.rows.values_mut() {
            counts.push(0);
        }
        for (key, &n) in result {
            let row = self
                .rows
                .entry(key.clone())
                .or_insert_with(|| vec![0; col + 1]);
            row[col] = n;
        }
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, key: &str) -> Option<&[u64]> {
        self.rows.get(key).map(|v| v.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[u64])> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Merge rows that map to the same new key, summing per sample.
    pub fn collapse_by<F>(&self, mut key_of: F) -> CountMatrix
    where
        F: FnMut(&str) -> String,
    {
        let mut rows: BTreeMap<String, Vec<u64>> = BTreeMap::new();
        for (key, counts) in &self.rows {
            let merged = rows
                .entry(key_of(key))
                .or_insert_with(|| vec![0; self.samples.len()]);
            for (acc, n) in merged.iter_mut().zip(counts) {
                *acc += n;
            }
        }

        CountMatrix {
            samples: self.samples.clone(),
            rows,
        }
    }

    /// Write as TSV: header `<row_label>\t<sample>...`, then one line per row.
    pub fn write_tsv<W: Write>(&self, mut w: W, row_label: &str) -> io::Result<()> {
        write!(w, "{row_label}")?;
        for s in &self.samples {
            write!(w, "\t{s}")?;
        }
        writeln!(w)?;

        for (key, counts) in &self.rows {
            write!(w, "{key}")?;
            for n in counts {
                write!(w, "\t{n}")?;
            }
            writeln!(w)?;
        }

        w.flush()
    }
}
