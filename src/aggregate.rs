use std::collections::{BTreeMap, HashMap};

use crate::error::CountError;
use crate::index::ReferenceIndex;
use crate::sample::SampleTables;

/// Exon counts collected for one reference transcript within one sample.
///
/// A fresh accumulator is created for every (sample, reference transcript)
/// pair. Exons are keyed by id, so an exon listed twice is counted once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptAccumulator {
    exons: HashMap<String, u64>,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_exon(&mut self, exon_id: &str, count: u64) {
        self.exons.insert(exon_id.to_string(), count);
    }

    /// Sum of the recorded exon counts.
    pub fn ucounts(&self) -> u64 {
        self.exons.values().sum()
    }
}

/// Reference transcript key -> aggregated count for one sample.
pub type SampleResult = BTreeMap<String, u64>;

/// Join a sample's summary rows to the reference and sum exon counts.
///
/// Keys absent from the reference are recorded as 0 without touching the exon
/// tables. For known keys, a local transcript without an `e2t` entry or an
/// exon without an `e_data` row is an error.
pub fn aggregate_sample(
    tables: &SampleTables,
    reference: &ReferenceIndex,
) -> Result<SampleResult, CountError> {
    let mut accumulators: HashMap<&str, TranscriptAccumulator> = HashMap::new();
    let mut result = SampleResult::new();

    for row in &tables.summary {
        let key = row.reference_key.as_str();

        if !reference.contains(key) {
            result.entry(key.to_string()).or_insert(0);
            continue;
        }

        let exon_ids = tables
            .exons_by_transcript
            .get(&row.local_id)
            .ok_or_else(|| CountError::MissingTranscriptMapping {
                sample: tables.name.clone(),
                local_id: row.local_id.clone(),
                reference_key: row.reference_key.clone(),
            })?;

        let acc = accumulators.entry(key).or_default();
        for exon_id in exon_ids {
            let count = tables.exon_counts.get(exon_id).copied().ok_or_else(|| {
                CountError::MissingExonData {
                    sample: tables.name.clone(),
                    local_id: row.local_id.clone(),
                    exon_id: exon_id.clone(),
                }
            })?;
            acc.add_exon(exon_id, count);
        }

        result.insert(key.to_string(), acc.ucounts());
    }

    let unmatched = result.len() - accumulators.len();
    if unmatched > 0 {
        log::debug!(
            "sample '{}': {} summary keys not in the reference, counted as 0",
            tables.name,
            unmatched
        );
    }

    Ok(result)
}
