// src/pipeline.rs
//
// One run over a gradeable: build the indices, then classify, merge and
// write every submission in turn, and finally rank the whole gradeable.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, debug, error};
use rayon::prelude::*;

use crate::config::LichenConfig;
use crate::error::{Error, Result};
use crate::index::{Corpus, SubmissionSource};
use crate::matcher::{submission_regions, MatchClassifier, MatchRecord};
use crate::ranking::report::{OVERALL_RANKING_FILE, PEER_RANKING_FILE};
use crate::ranking::{rank_overall, rank_peers, write_overall_ranking, write_peer_ranking,
                     StudentRanking, SubmissionSummary};

pub const MATCHES_FILE: &str = "matches.json";

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Process submissions on the rayon pool.
    pub parallel: bool,
    pub show_progress: bool,
}

/// Result of processing one submission. Output failures do not stop the run.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub summary: SubmissionSummary,
    pub wrote_matches: bool,
    pub output_error: Option<Error>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub submissions: usize,
    pub with_matches: usize,
    pub output_failures: Vec<Error>,
    pub overall: Vec<StudentRanking>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.output_failures.is_empty()
    }
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} Submissions: [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Runs the whole comparison for the gradeable at `root`.
///
/// Configuration and malformed-input errors are returned before any file is
/// written. Failures to write one submission's outputs are collected in the
/// summary instead.
pub fn run(root: &Path, config: &LichenConfig, options: &RunOptions) -> Result<RunSummary> {
    let start_time = Instant::now();
    let corpus = Corpus::load(root, &config.gradeable)?;
    info!("Indexed {} fingerprints ({} occurrences) in {:?}",
          corpus.current.fingerprint_count(), corpus.current.occurrence_count(), start_time.elapsed());

    let classifier = MatchClassifier::new(
        &corpus.current,
        corpus.provided.as_ref(),
        &corpus.others,
        config.gradeable.threshold,
    );

    let pb = progress_bar(corpus.sources.len(), options.show_progress);
    let process = |source: &SubmissionSource| {
        let outcome = process_submission(source, &classifier, config);
        pb.inc(1);
        outcome
    };
    let outcomes: Vec<Result<SubmissionOutcome>> = if options.parallel {
        corpus.sources.par_iter().map(process).collect()
    } else {
        corpus.sources.iter().map(process).collect()
    };
    pb.finish_and_clear();
    let outcomes = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

    let mut summary = RunSummary { submissions: outcomes.len(), ..RunSummary::default() };
    let mut summaries = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        if outcome.wrote_matches {
            summary.with_matches += 1;
        }
        if let Some(e) = outcome.output_error {
            summary.output_failures.push(e);
        }
        summaries.push(outcome.summary);
    }

    summary.overall = rank_overall(&summaries, &config.engine.score_weights);
    if let Err(e) = write_overall_ranking(&root.join(OVERALL_RANKING_FILE), &summary.overall) {
        error!("{}", e);
        summary.output_failures.push(e);
    }

    info!("Compared {} submissions ({} with suspicious matches) in {:?}",
          summary.submissions, summary.with_matches, start_time.elapsed());
    Ok(summary)
}

/// Classifies, merges and writes one submission. The ledger is dropped
/// before returning; only its summary survives.
pub fn process_submission(
    source: &SubmissionSource,
    classifier: &MatchClassifier<'_>,
    config: &LichenConfig,
) -> Result<SubmissionOutcome> {
    let mut submission = source.load(config.gradeable.hash_size)?;
    classifier.classify(&mut submission);

    let regions = if submission.has_suspicious_matches() {
        Some(submission_regions(
            &submission,
            config.gradeable.hash_size,
            config.engine.max_matching_positions,
        ))
    } else {
        None
    };
    let peers = rank_peers(&submission);
    let summary = SubmissionSummary::of(&submission);
    drop(submission);

    let wrote_matches = regions.is_some();
    let output_error = write_submission_outputs(&source.dir, regions.as_deref(), &peers).err();
    if let Some(e) = &output_error {
        error!("{}/{}: {}", source.student, source.version, e);
    } else {
        debug!("{}/{}: {:.1}% suspicious, {} peers",
               source.student, source.version, summary.percent, peers.len());
    }

    Ok(SubmissionOutcome { summary, wrote_matches, output_error })
}

/// Writes `matches.json` (or removes a stale one when there is nothing
/// suspicious) and `ranking.txt` into a submission's version directory.
pub fn write_submission_outputs(dir: &Path, regions: Option<&[MatchRecord]>, peers: &[StudentRanking]) -> Result<()> {
    let matches_path = dir.join(MATCHES_FILE);
    match regions {
        Some(regions) => write_matches(&matches_path, regions)?,
        None => match fs::remove_file(&matches_path) {
            Ok(()) => debug!("Removed stale {:?}", matches_path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::output(matches_path, e)),
        },
    }
    write_peer_ranking(&dir.join(PEER_RANKING_FILE), peers)
}

fn write_matches(path: &Path, regions: &[MatchRecord]) -> Result<()> {
    let write = || -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut out, regions)?;
        out.flush()
    };
    write().map_err(|e| Error::output(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_regions_removes_stale_matches() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join(MATCHES_FILE);
        fs::write(&stale, "[]").unwrap();

        write_submission_outputs(dir.path(), None, &[]).unwrap();
        assert!(!stale.exists());
        assert!(dir.path().join(PEER_RANKING_FILE).exists());
    }

    #[test]
    fn regions_are_written_as_json_array() {
        let dir = TempDir::new().unwrap();
        let regions = vec![MatchRecord::common(3)];
        write_submission_outputs(dir.path(), Some(&regions), &[]).unwrap();
        let text = fs::read_to_string(dir.path().join(MATCHES_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!([{"start": 3, "end": 3, "type": "common"}]));
    }
}
