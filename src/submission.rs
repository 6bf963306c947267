// src/submission.rs

use ahash::{AHashMap, AHashSet};
use std::collections::{BTreeMap, BTreeSet};
use log::trace;

use crate::types::{Fingerprint, Location, PeerKey, StudentId};

/// A suspicious position: the fingerprint found there and every location in
/// other submissions that shares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspiciousHit {
    pub fingerprint: Fingerprint,
    pub locations: BTreeSet<Location>,
}

/// One student's version of the gradeable and everything the classifier
/// learned about it.
///
/// A position is in at most one of `suspicious`, `common` and `provided`.
/// Peer counters are reference counted per fingerprint so that demoting a
/// suspicious position also retracts what it contributed.
#[derive(Debug, Clone)]
pub struct Submission {
    student: StudentId,
    version: u32,
    hash_size: usize,
    fingerprints: Vec<Fingerprint>,
    distinct_fingerprints: usize,
    suspicious: BTreeMap<usize, SuspiciousHit>,
    common: BTreeSet<usize>,
    provided: BTreeSet<usize>,
    peer_matches: BTreeMap<PeerKey, AHashMap<Fingerprint, usize>>,
}

impl Submission {
    pub fn new(student: StudentId, version: u32, hash_size: usize, fingerprints: Vec<Fingerprint>) -> Self {
        let distinct_fingerprints = fingerprints.iter().collect::<AHashSet<_>>().len();
        Self {
            student,
            version,
            hash_size: hash_size.max(1),
            fingerprints,
            distinct_fingerprints,
            suspicious: BTreeMap::new(),
            common: BTreeSet::new(),
            provided: BTreeSet::new(),
            peer_matches: BTreeMap::new(),
        }
    }

    pub fn student(&self) -> &StudentId {
        &self.student
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// `(fingerprint, position)` pairs in ascending position order.
    pub fn hashes(&self) -> impl Iterator<Item = (Fingerprint, usize)> + '_ {
        self.fingerprints.iter().enumerate().map(|(i, &fp)| (fp, i + 1))
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    pub fn distinct_fingerprints(&self) -> usize {
        self.distinct_fingerprints
    }

    pub fn fingerprint_at(&self, position: usize) -> Option<Fingerprint> {
        position.checked_sub(1).and_then(|i| self.fingerprints.get(i)).copied()
    }

    pub fn suspicious_matches(&self) -> &BTreeMap<usize, SuspiciousHit> {
        &self.suspicious
    }

    pub fn common_matches(&self) -> &BTreeSet<usize> {
        &self.common
    }

    pub fn provided_matches(&self) -> &BTreeSet<usize> {
        &self.provided
    }

    pub fn has_suspicious_matches(&self) -> bool {
        !self.suspicious.is_empty()
    }

    /// First position whose window overlaps a window starting at `position`
    /// from the left.
    fn window_start(&self, position: usize) -> usize {
        position.saturating_sub(self.hash_size - 1).max(1)
    }

    /// Records that `location` shares the fingerprint at `position`.
    ///
    /// Ignored when `position` is already common or provided, or when a
    /// common/provided window starts within the preceding `hash_size - 1`
    /// positions. Returns whether the hit was kept.
    pub fn add_suspicious_match(&mut self, position: usize, location: Location) -> bool {
        let Some(fingerprint) = self.fingerprint_at(position) else {
            return false;
        };
        if self.common.contains(&position) || self.provided.contains(&position) {
            return false;
        }
        let lo = self.window_start(position);
        if self.common.range(lo..position).next().is_some()
            || self.provided.range(lo..position).next().is_some()
        {
            trace!("{}/{}: suspicious hit at {} covered by earlier common/provided code",
                   self.student, self.version, position);
            return false;
        }

        let hit = self.suspicious.entry(position).or_insert_with(|| SuspiciousHit {
            fingerprint,
            locations: BTreeSet::new(),
        });
        let peer = location.peer();
        // A peer's locations are contiguous in the set; look at the first one.
        let first_of_peer = Location { position: 0, ..location.clone() };
        let new_peer_here = !hit.locations.range(first_of_peer..)
            .next()
            .is_some_and(|l| l.student == peer.student
                && l.version == peer.version
                && l.source_gradeable == peer.source_gradeable);
        hit.locations.insert(location);

        if new_peer_here {
            *self.peer_matches.entry(peer).or_default().entry(fingerprint).or_insert(0) += 1;
        }
        true
    }

    pub fn add_common_match(&mut self, position: usize) {
        if self.provided.contains(&position) {
            return;
        }
        self.demote_overlapping(position);
        self.common.insert(position);
    }

    pub fn add_provided_match(&mut self, position: usize) {
        self.common.remove(&position);
        self.demote_overlapping(position);
        self.provided.insert(position);
    }

    /// Clears suspicious hits at `position` and in the `hash_size - 1`
    /// positions before it.
    fn demote_overlapping(&mut self, position: usize) {
        if position == 0 {
            return;
        }
        let lo = self.window_start(position);
        let demoted: Vec<usize> = self.suspicious.range(lo..=position).map(|(&p, _)| p).collect();
        for p in demoted {
            if let Some(hit) = self.suspicious.remove(&p) {
                trace!("{}/{}: demoting suspicious position {}", self.student, self.version, p);
                self.retract(&hit);
            }
        }
    }

    fn retract(&mut self, hit: &SuspiciousHit) {
        let peers: BTreeSet<PeerKey> = hit.locations.iter().map(Location::peer).collect();
        for peer in peers {
            let Some(counts) = self.peer_matches.get_mut(&peer) else { continue };
            if let Some(count) = counts.get_mut(&hit.fingerprint) {
                *count -= 1;
                if *count == 0 {
                    counts.remove(&hit.fingerprint);
                }
            }
            if counts.is_empty() {
                self.peer_matches.remove(&peer);
            }
        }
    }

    /// Distinct fingerprints matched per peer, from surviving suspicious positions only.
    pub fn students_matched(&self) -> impl Iterator<Item = (&PeerKey, usize)> + '_ {
        self.peer_matches.iter().map(|(peer, counts)| (peer, counts.len()))
    }

    /// Absolute number of suspicious positions.
    pub fn hashes_matched(&self) -> usize {
        self.suspicious.len()
    }

    /// Share of this submission that is suspicious, in `[0, 100]`.
    pub fn percentage(&self) -> f64 {
        percent_of(self.suspicious.len(), self.distinct_fingerprints)
    }
}

/// `100 * part / whole`, clamped to `[0, 100]`; zero when `whole` is zero.
pub fn percent_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (100.0 * part as f64 / whole as f64).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn loc(student: &str, version: u32, position: usize) -> Location {
        Location {
            student: Arc::from(student),
            version,
            source_gradeable: Arc::from("f24__cs1__hw1"),
            position,
        }
    }

    fn submission(hash_size: usize, fps: &[u64]) -> Submission {
        Submission::new(Arc::from("alice"), 1, hash_size, fps.to_vec())
    }

    #[test]
    fn counts_distinct_fingerprints() {
        let sub = submission(1, &[1, 2, 2, 3]);
        assert_eq!(sub.len(), 4);
        assert_eq!(sub.distinct_fingerprints(), 3);
        let hashes: Vec<_> = sub.hashes().collect();
        assert_eq!(hashes, vec![(1, 1), (2, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn common_demotes_earlier_suspicious_within_window() {
        let mut sub = submission(3, &[1, 2, 3, 4, 5, 6]);
        assert!(sub.add_suspicious_match(2, loc("bob", 1, 2)));
        assert!(sub.add_suspicious_match(3, loc("bob", 1, 3)));
        sub.add_common_match(5);
        // 3 and 4 are within hash_size - 1 of 5; 2 is not.
        assert_eq!(sub.suspicious_matches().keys().copied().collect::<Vec<_>>(), vec![2]);
        assert!(sub.common_matches().contains(&5));
    }

    #[test]
    fn suspicious_after_common_in_window_is_ignored() {
        let mut sub = submission(3, &[1, 2, 3, 4, 5, 6]);
        sub.add_provided_match(2);
        assert!(!sub.add_suspicious_match(4, loc("bob", 1, 4)));
        assert!(sub.add_suspicious_match(5, loc("bob", 1, 5)));
        assert!(!sub.add_suspicious_match(2, loc("bob", 1, 2)));
    }

    #[test]
    fn sets_stay_disjoint() {
        let mut sub = submission(1, &[1, 2, 3]);
        assert!(sub.add_suspicious_match(2, loc("bob", 1, 7)));
        sub.add_common_match(2);
        assert!(!sub.suspicious_matches().contains_key(&2));
        sub.add_provided_match(2);
        assert!(!sub.common_matches().contains(&2));
        assert!(sub.provided_matches().contains(&2));
        sub.add_common_match(2);
        assert!(!sub.common_matches().contains(&2));
    }

    #[test]
    fn demotion_retracts_peer_counts() {
        let mut sub = submission(2, &[10, 11, 12, 13]);
        sub.add_suspicious_match(1, loc("bob", 1, 1));
        sub.add_suspicious_match(2, loc("bob", 1, 2));
        sub.add_suspicious_match(2, loc("carol", 3, 8));
        let before: Vec<(String, usize)> = sub.students_matched()
            .map(|(p, n)| (p.student.to_string(), n)).collect();
        assert_eq!(before, vec![("bob".into(), 2), ("carol".into(), 1)]);

        sub.add_common_match(3);
        let after: Vec<(String, usize)> = sub.students_matched()
            .map(|(p, n)| (p.student.to_string(), n)).collect();
        assert_eq!(after, vec![("bob".into(), 1)]);
        assert_eq!(sub.hashes_matched(), 1);
    }

    #[test]
    fn repeated_fingerprint_counts_once_per_peer() {
        let mut sub = submission(1, &[9, 9, 9]);
        sub.add_suspicious_match(1, loc("bob", 1, 1));
        sub.add_suspicious_match(1, loc("bob", 1, 4));
        sub.add_suspicious_match(3, loc("bob", 1, 1));
        let matched: Vec<usize> = sub.students_matched().map(|(_, n)| n).collect();
        assert_eq!(matched, vec![1]);
        // Two suspicious positions over one distinct fingerprint still caps at 100.
        assert_eq!(sub.percentage(), 100.0);
    }

    #[test]
    fn percent_of_handles_empty_submissions() {
        assert_eq!(percent_of(0, 0), 0.0);
        assert_eq!(percent_of(1, 4), 25.0);
        assert_eq!(percent_of(5, 4), 100.0);
    }
}
