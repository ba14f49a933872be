use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::BufRead;

use crate::annotation::io::{AnnotationReader, AnnotationRecord, ParseError};
use crate::model::transcript::{clean_key, derive_gene_key, ReferenceTranscript};
use crate::model::types::{IdLookup, TranscriptId};

/// Read-only lookup table of reference transcripts, keyed by transcript id.
///
/// - chromosome dictionary in first-seen order
/// - transcripts, each carrying its derived gene key
///
/// Nothing in here changes once `from_reader` returns; per-sample state is
/// owned by the aggregation step.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    pub chr_names: Vec<String>,
    chr_to_id: HashMap<String, usize>,

    pub transcripts: Vec<ReferenceTranscript>,
    tx_key_to_id: HashMap<String, TranscriptId>,

    // transcripts per chromosome, indexed like `chr_names`
    chr_tx_counts: Vec<usize>,
}

/// Short summary used for the startup log.
impl fmt::Display for ReferenceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n_genes = self
            .transcripts
            .iter()
            .map(|tx| tx.gene_key.as_str())
            .collect::<HashSet<_>>()
            .len();

        writeln!(
            f,
            "ReferenceIndex: {} transcripts, {} genes, {} chromosomes",
            self.transcripts.len(),
            n_genes,
            self.chr_names.len()
        )?;

        for (name, n) in self.chr_names.iter().zip(&self.chr_tx_counts) {
            writeln!(f, "  - {}: transcripts={}", name, n)?;
        }

        Ok(())
    }
}

impl ReferenceIndex {
    /// Build an index from a GTF-like reader.
    ///
    /// Workflow:
    /// 1) parse records (every non-comment line must be well formed)
    /// 2) keep `transcript` features, extract and clean the transcript key
    /// 3) intern chromosome and transcript
    ///
    /// # Example
    /// ```
    /// use std::io::Cursor;
    /// use ballgown_counts::index::ReferenceIndex;
    /// use ballgown_counts::model::IdLookup;
    ///
    /// let gtf = "\
    /// chr1\tsrc\ttranscript\t101\t250\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1.1\";\n\
    /// chr1\tsrc\texon\t101\t150\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1.1\";\n";
    ///
    /// let idx = ReferenceIndex::from_reader(Cursor::new(gtf), &IdLookup::default()).unwrap();
    /// assert_eq!(idx.len(), 1);
    /// assert_eq!(idx.get("T1.1").unwrap().gene_key, "T1");
    /// ```
    pub fn from_reader<R: BufRead>(reader: R, lookup: &IdLookup) -> Result<Self, ParseError> {
        let mut idx = ReferenceIndex::default();

        for rec in AnnotationReader::new(reader).records() {
            let rec = rec?;
            if !rec.is_transcript() {
                continue;
            }

            let key = clean_key(&rec.transcript_key(lookup)?);
            idx.intern_tx(&rec, &key);
        }

        log::debug!("indexed {} reference transcripts", idx.transcripts.len());
        Ok(idx)
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tx_key_to_id.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ReferenceTranscript> {
        self.tx_key_to_id.get(key).map(|&id| &self.transcripts[id])
    }

    /// Gene row label for a matrix key.
    ///
    /// Indexed keys use their stored gene key; unknown keys fall back to the
    /// same suffix stripping applied to reference ids.
    pub fn gene_key_for<'a>(&'a self, key: &'a str) -> &'a str {
        match self.get(key) {
            Some(tx) => &tx.gene_key,
            None => derive_gene_key(key),
        }
    }

    // -----------------------
    // Internal helpers
    // -----------------------

    fn intern_chr(&mut self, chr: &str) -> usize {
        if let Some(&id) = self.chr_to_id.get(chr) {
            return id;
        }
        let id = self.chr_names.len();
        self.chr_names.push(chr.to_string());
        self.chr_to_id.insert(chr.to_string(), id);
        self.chr_tx_counts.push(0);
        id
    }

    fn intern_tx(&mut self, rec: &AnnotationRecord, key: &str) -> TranscriptId {
        if let Some(&tid) = self.tx_key_to_id.get(key) {
            // Repeated id: later coordinates win.
            let old_chr = self.chr_to_id[&self.transcripts[tid].locus.chrom];
            self.chr_tx_counts[old_chr] -= 1;
            let chr_id = self.intern_chr(&rec.seqname);
            self.chr_tx_counts[chr_id] += 1;

            log::warn!(
                "transcript '{}' defined again on annotation line {}; keeping the later record",
                key,
                rec.line_no
            );
            self.transcripts[tid].locus = rec.locus();
            return tid;
        }

        let chr_id = self.intern_chr(&rec.seqname);
        self.chr_tx_counts[chr_id] += 1;

        let tid = self.transcripts.len();
        self.transcripts
            .push(ReferenceTranscript::new(tid, key, rec.locus()));
        self.tx_key_to_id.insert(key.to_string(), tid);

        tid
    }
}
