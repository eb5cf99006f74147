//! Enrichment passes applied to already-merged pitcher seasons

use crate::config::ChaseCalibration;
use crate::merge::{SeasonRecords, YearlyRecords};
use crate::records::PitcherSeasonStats;
use crate::snapshot::{ArsenalSchema, Snapshot};
use savant_fetcher::fields::round_to;
use savant_fetcher::{FetchOutcome, PitchEntry, PlayerId};
use std::collections::BTreeSet;
use tracing::info;

/// Pitch names treated as fastballs (lowercase)
pub const FASTBALL_TYPES: [&str; 3] = ["four-seam fastball", "sinker", "fastball"];

/// Raise `slot` to `candidate` (1 decimal) when the candidate is larger.
///
/// Applying the same candidate again leaves the slot unchanged.
pub fn keep_max(slot: &mut f64, candidate: f64) {
    let candidate = round_to(candidate, 1);
    if candidate > *slot {
        *slot = candidate;
    }
}

/// Highest fastball velocity and extension in an arsenal
pub fn fastball_maxima(pitches: &[PitchEntry]) -> (f64, f64) {
    pitches
        .iter()
        .filter(|pitch| FASTBALL_TYPES.contains(&pitch.pitch_type.to_lowercase().as_str()))
        .fold((0.0, 0.0), |(velo, extension), pitch| {
            (f64::max(velo, pitch.speed), f64::max(extension, pitch.extension))
        })
}

fn patch_fastball(record: &mut PitcherSeasonStats, (velo, extension): (f64, f64)) {
    keep_max(&mut record.fastball_velo, velo);
    keep_max(&mut record.extension, extension);
}

/// Patch fastball velocity and extension from the pitch-arsenal snapshot.
///
/// The current arsenal's maxima apply to every season the pitcher has; each
/// season's own arsenal is applied on top. Returns every pitcher listed in the
/// arsenal snapshot.
pub fn enrich_fastballs(
    yearly: &mut YearlyRecords<PitcherSeasonStats>,
    arsenals: &Snapshot<ArsenalSchema>,
) -> BTreeSet<PlayerId> {
    let mut patched = 0usize;

    for (player_id, entry) in &arsenals.entries {
        let current = fastball_maxima(&entry.current);
        for records in yearly.values_mut() {
            if let Some(record) = records.get_mut(player_id) {
                patch_fastball(record, current);
                patched += 1;
            }
        }

        for (season, pitches) in &entry.history {
            if let Some(record) = yearly.get_mut(season).and_then(|records| records.get_mut(player_id)) {
                patch_fastball(record, fastball_maxima(pitches));
            }
        }
    }

    info!("Enriched {} pitcher seasons from {} arsenals", patched, arsenals.len());
    arsenals.entries.keys().copied().collect()
}

/// Fill missing chase rates from the chase percentile of the same season.
///
/// Only records with a zero chase rate and a positive percentile are touched.
/// Returns the number of records filled.
pub fn enrich_chase(
    records: &mut SeasonRecords<PitcherSeasonStats>,
    percentiles: &FetchOutcome,
    calibration: &ChaseCalibration,
) -> usize {
    let mut filled = 0;

    for (player_id, record) in records.iter_mut() {
        if record.chase_pct != 0.0 {
            continue;
        }
        let percentile = percentiles.record(*player_id).float("chase_percentile");
        if percentile > 0.0 {
            record.chase_pct = calibration.raw_chase(percentile);
            filled += 1;
        }
    }

    filled
}
