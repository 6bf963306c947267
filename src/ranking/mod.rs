pub mod report;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::ScoreWeights;
use crate::submission::{percent_of, Submission};

pub use report::{write_overall_ranking, write_peer_ranking};

/// Composite suspicion score of one submission.
///
/// Blends the suspicious percentage with the absolute number of matched
/// fingerprints relative to the largest count in the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    hashes_matched: usize,
    percent: f64,
    score: Option<f64>,
}

impl Score {
    pub fn new(hashes_matched: usize, percent: f64) -> Self {
        Self { hashes_matched, percent, score: None }
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn hashes_matched(&self) -> usize {
        self.hashes_matched
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn calculate(&mut self, max_hashes_matched: usize, weights: &ScoreWeights) -> f64 {
        debug_assert!(weights.validate().is_ok(), "score weights were not validated");
        let relative = if max_hashes_matched == 0 {
            0.0
        } else {
            self.hashes_matched as f64 / max_hashes_matched as f64
        };
        let score = weights.percent * (self.percent / 100.0) + weights.matches * relative;
        self.score = Some(score);
        score
    }
}

/// What the ranking needs to remember about a submission once its ledger
/// has been dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionSummary {
    pub student: String,
    pub version: u32,
    pub percent: f64,
    pub hashes_matched: usize,
}

impl SubmissionSummary {
    pub fn of(submission: &Submission) -> Self {
        Self {
            student: submission.student().to_string(),
            version: submission.version(),
            percent: submission.percentage(),
            hashes_matched: submission.hashes_matched(),
        }
    }
}

/// One line of a ranking file.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRanking {
    pub student: String,
    pub version: u32,
    pub source_gradeable: Option<String>,
    pub percent: f64,
    pub score: Option<f64>,
}

impl StudentRanking {
    fn sort_value(&self, other: &StudentRanking) -> (f64, f64) {
        match (self.score, other.score) {
            (Some(a), Some(b)) => (a, b),
            _ => (self.percent, other.percent),
        }
    }
}

/// Descending by score (percent when unscored), then ascending student id,
/// version and source gradeable.
pub fn ranking_order(a: &StudentRanking, b: &StudentRanking) -> Ordering {
    let (x, y) = a.sort_value(b);
    y.total_cmp(&x)
        .then_with(|| a.student.cmp(&b.student))
        .then_with(|| a.version.cmp(&b.version))
        .then_with(|| a.source_gradeable.cmp(&b.source_gradeable))
}

/// One entry per student: the version with the highest percent (earliest
/// version on ties), scored against the largest match count of the run.
pub fn rank_overall(summaries: &[SubmissionSummary], weights: &ScoreWeights) -> Vec<StudentRanking> {
    let max_hashes_matched = summaries.iter().map(|s| s.hashes_matched).max().unwrap_or(0);

    let mut best: BTreeMap<&str, &SubmissionSummary> = BTreeMap::new();
    for summary in summaries {
        best.entry(summary.student.as_str())
            .and_modify(|current| {
                let better = summary.percent > current.percent
                    || (summary.percent == current.percent && summary.version < current.version);
                if better {
                    *current = summary;
                }
            })
            .or_insert(summary);
    }

    let mut rankings: Vec<StudentRanking> = best.into_values()
        .map(|summary| {
            let mut score = Score::new(summary.hashes_matched, summary.percent);
            score.calculate(max_hashes_matched, weights);
            StudentRanking {
                student: summary.student.clone(),
                version: summary.version,
                source_gradeable: None,
                percent: score.percent(),
                score: score.score(),
            }
        })
        .collect();
    rankings.sort_by(ranking_order);
    rankings
}

/// One entry per submission this one matched, in any gradeable.
pub fn rank_peers(submission: &Submission) -> Vec<StudentRanking> {
    let total = submission.distinct_fingerprints();
    let mut rankings: Vec<StudentRanking> = submission.students_matched()
        .map(|(peer, matched)| StudentRanking {
            student: peer.student.to_string(),
            version: peer.version,
            source_gradeable: Some(peer.source_gradeable.to_string()),
            percent: percent_of(matched, total),
            score: None,
        })
        .collect();
    rankings.sort_by(ranking_order);
    rankings
}
