// src/matcher/classifier.rs

use std::sync::Arc;
use log::debug;

use crate::index::{FingerprintIndex, ProvidedCode, StudentOccurrences};
use crate::submission::Submission;
use crate::types::{Fingerprint, Location};

/// Counts of what one classification pass found, before demotion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationStats {
    pub provided: usize,
    pub common: usize,
    pub suspicious: usize,
}

/// Assigns every position of a submission to provided, common or
/// suspicious using the read-only indices.
///
/// Positions must be visited in ascending order; the submission ledger
/// relies on it to demote suspicious hits that a later common or provided
/// window overlaps.
pub struct MatchClassifier<'a> {
    current: &'a FingerprintIndex,
    provided: Option<&'a ProvidedCode>,
    others: &'a [FingerprintIndex],
    threshold: usize,
}

impl<'a> MatchClassifier<'a> {
    pub fn new(
        current: &'a FingerprintIndex,
        provided: Option<&'a ProvidedCode>,
        others: &'a [FingerprintIndex],
        threshold: usize,
    ) -> Self {
        Self { current, provided, others, threshold }
    }

    /// True when more than `threshold` students share `fingerprint`.
    pub fn is_common(&self, fingerprint: Fingerprint) -> bool {
        self.current.student_count(fingerprint) > self.threshold
    }

    pub fn is_provided(&self, fingerprint: Fingerprint) -> bool {
        self.provided.is_some_and(|p| p.contains(fingerprint))
    }

    pub fn classify(&self, submission: &mut Submission) -> ClassificationStats {
        let mut stats = ClassificationStats::default();
        let hashes: Vec<(Fingerprint, usize)> = submission.hashes().collect();

        for (fingerprint, position) in hashes {
            if self.is_provided(fingerprint) {
                submission.add_provided_match(position);
                stats.provided += 1;
                continue;
            }

            if let Some(students) = self.current.get(fingerprint) {
                let owner = submission.student().clone();
                let mut others = students.iter().filter(|s| s.student != owner).peekable();
                if others.peek().is_some() {
                    if students.len() > self.threshold {
                        submission.add_common_match(position);
                        stats.common += 1;
                    } else {
                        for entry in others {
                            stats.suspicious += record_hits(submission, position, entry, self.current);
                        }
                    }
                }
            }

            // Prior terms are never common, and the student's own earlier work counts.
            for index in self.others {
                if let Some(students) = index.get(fingerprint) {
                    for entry in students {
                        stats.suspicious += record_hits(submission, position, entry, index);
                    }
                }
            }
        }

        debug!("{}/{}: {} provided, {} common, {} suspicious hits ({} positions kept)",
               submission.student(), submission.version(),
               stats.provided, stats.common, stats.suspicious, submission.hashes_matched());
        stats
    }
}

fn record_hits(
    submission: &mut Submission,
    position: usize,
    entry: &StudentOccurrences,
    index: &FingerprintIndex,
) -> usize {
    let mut kept = 0;
    for occurrence in &entry.occurrences {
        let location = Location {
            student: entry.student.clone(),
            version: occurrence.version,
            source_gradeable: Arc::clone(index.gradeable()),
            position: occurrence.position,
        };
        if submission.add_suspicious_match(position, location) {
            kept += 1;
        }
    }
    kept
}
