//! Data-quality summary: how many current records still hold zero per field

use crate::records::SeasonRecord;
use crate::snapshot::{Snapshot, SnapshotSchema};
use savant_fetcher::fields::round_to;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldCoverage {
    pub field: &'static str,
    pub zero: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub total: usize,
    pub fields: Vec<FieldCoverage>,
}

impl QualityReport {
    /// Count zero values of `R::QUALITY_FIELDS` across current records
    pub fn from_records<R: SeasonRecord>(records: &[&R]) -> Self {
        let fields = R::QUALITY_FIELDS
            .iter()
            .copied()
            .map(|field| FieldCoverage {
                field,
                zero: records
                    .iter()
                    .filter(|record| record.stat(field).unwrap_or(0.0) == 0.0)
                    .count(),
            })
            .collect();

        Self { total: records.len(), fields }
    }

    /// Report over the current records of a snapshot
    pub fn for_snapshot<S>(snapshot: &Snapshot<S>) -> Self
    where
        S: SnapshotSchema,
        S::Record: SeasonRecord,
    {
        let current: Vec<&S::Record> = snapshot.entries.values().map(|entry| &entry.current).collect();
        Self::from_records(&current)
    }

    /// Share of players still at zero for a field, in percent (1 decimal)
    pub fn zero_pct(&self, coverage: &FieldCoverage) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        round_to(coverage.zero as f64 / self.total as f64 * 100.0, 1)
    }

    pub fn log(&self) {
        info!("Data quality check:");
        for coverage in &self.fields {
            info!(
                "  {}: {}/{} still zero ({}%)",
                coverage.field,
                coverage.zero,
                self.total,
                self.zero_pct(coverage)
            );
        }
    }
}
