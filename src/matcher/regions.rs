// src/matcher/regions.rs
//
// Turns a classified submission into the minimal list of maximal ranges
// written to matches.json.

use log::warn;

use super::types::{MatchKind, MatchRecord, MatchingPosition, OtherSubmission};
use crate::submission::Submission;
use crate::types::Location;

/// One single-position record per classified position, sorted by start.
///
/// Locations of a suspicious position are grouped per other submission in
/// sorted order. A group holding `max_matching_positions` windows is closed
/// and a new group for the same submission is started.
pub fn build_records(submission: &Submission, hash_size: usize, max_matching_positions: usize) -> Vec<MatchRecord> {
    let cap = max_matching_positions.max(1);
    let mut records = Vec::with_capacity(
        submission.suspicious_matches().len()
            + submission.common_matches().len()
            + submission.provided_matches().len(),
    );

    for (&position, hit) in submission.suspicious_matches() {
        let others = group_locations(hit.locations.iter(), hash_size, cap, submission, position);
        records.push(MatchRecord::matched(position, others));
    }
    records.extend(submission.common_matches().iter().map(|&p| MatchRecord::common(p)));
    records.extend(submission.provided_matches().iter().map(|&p| MatchRecord::provided(p)));

    records.sort_by_key(|r| r.start);
    records
}

fn group_locations<'a>(
    locations: impl Iterator<Item = &'a Location>,
    hash_size: usize,
    cap: usize,
    submission: &Submission,
    position: usize,
) -> Vec<OtherSubmission> {
    let mut groups: Vec<OtherSubmission> = Vec::new();
    for location in locations {
        let window = MatchingPosition {
            start: location.position,
            end: location.position + hash_size.saturating_sub(1),
        };
        match groups.last_mut() {
            Some(group) if is_same(group, location) && group.matching_positions.len() < cap => {
                group.matching_positions.push(window);
                continue;
            }
            Some(group) if is_same(group, location) => {
                warn!("{}/{}: position {} reached max_matching_positions ({}) with {}/{}, flushing group",
                      submission.student(), submission.version(), position, cap,
                      location.student, location.version);
            }
            _ => {}
        }
        groups.push(OtherSubmission {
            student: location.student.to_string(),
            version: location.version,
            source_gradeable: location.source_gradeable.to_string(),
            matching_positions: vec![window],
        });
    }
    groups
}

fn is_same(group: &OtherSubmission, location: &Location) -> bool {
    group.student == *location.student
        && group.version == location.version
        && group.source_gradeable == *location.source_gradeable
}

/// Folds each record into its predecessor when they form one contiguous
/// region. Running it on its own output changes nothing.
pub fn merge_records(records: Vec<MatchRecord>) -> Vec<MatchRecord> {
    let mut merged: Vec<MatchRecord> = Vec::with_capacity(records.len());
    for record in records {
        match merged.last_mut() {
            Some(prev) if can_extend(prev, &record) => extend(prev, record.end),
            _ => merged.push(record),
        }
    }
    merged
}

fn can_extend(prev: &MatchRecord, cur: &MatchRecord) -> bool {
    if cur.end != prev.end + 1 {
        return false;
    }
    match (&prev.kind, &cur.kind) {
        (MatchKind::Match { others: before }, MatchKind::Match { others: after }) => {
            others_contiguous(before, after)
        }
        (MatchKind::Common, MatchKind::Common) => true,
        (MatchKind::Provided, MatchKind::Provided) => true,
        _ => false,
    }
}

/// Same submissions in the same order, and every window of `after` ends
/// exactly one position after its counterpart in `before`.
fn others_contiguous(before: &[OtherSubmission], after: &[OtherSubmission]) -> bool {
    before.len() == after.len()
        && before.iter().zip(after).all(|(b, a)| {
            b.same_submission(a)
                && b.matching_positions.len() == a.matching_positions.len()
                && b.matching_positions.iter()
                    .zip(&a.matching_positions)
                    .all(|(bp, ap)| ap.end == bp.end + 1)
        })
}

fn extend(prev: &mut MatchRecord, end: usize) {
    prev.end = end;
    if let MatchKind::Match { others } = &mut prev.kind {
        for window in others.iter_mut().flat_map(|o| o.matching_positions.iter_mut()) {
            window.end += 1;
        }
    }
}

/// Classified positions of `submission` as merged regions.
pub fn submission_regions(submission: &Submission, hash_size: usize, max_matching_positions: usize) -> Vec<MatchRecord> {
    merge_records(build_records(submission, hash_size, max_matching_positions))
}
