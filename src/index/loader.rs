// src/index/loader.rs
//
// Reads the hasher's output tree:
//   <root>/users/<student>/<version>/hashes.txt
//   <root>/provided_code/hashes.txt
//   <root>/other_gradeables/<gradeable>/<student>/<version>/hashes.txt

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{info, debug, warn};

use super::{FingerprintIndex, Occurrence, ProvidedCode};
use crate::config::GradeableConfig;
use crate::error::{Error, Result};
use crate::submission::Submission;
use crate::types::{parse_fingerprint, parse_version, Fingerprint, StudentId};

pub const USERS_DIR: &str = "users";
pub const PROVIDED_CODE_DIR: &str = "provided_code";
pub const OTHER_GRADEABLES_DIR: &str = "other_gradeables";
pub const HASHES_FILE: &str = "hashes.txt";

/// A student/version directory holding a `hashes.txt`.
#[derive(Debug, Clone)]
pub struct SubmissionSource {
    pub student: StudentId,
    pub version: u32,
    pub dir: PathBuf,
}

impl SubmissionSource {
    pub fn hashes_path(&self) -> PathBuf {
        self.dir.join(HASHES_FILE)
    }

    /// Reads this submission's fingerprint sequence into a fresh ledger.
    pub fn load(&self, hash_size: usize) -> Result<Submission> {
        let fingerprints = read_fingerprints(&self.hashes_path())?;
        Ok(Submission::new(self.student.clone(), self.version, hash_size, fingerprints))
    }
}

/// Reads whitespace-separated fingerprint tokens. Position `i` (1-based) is
/// the `i`-th token.
pub fn read_fingerprints(path: &Path) -> Result<Vec<Fingerprint>> {
    let content = fs::read_to_string(path)?;
    content
        .split_whitespace()
        .map(|token| parse_fingerprint(token)
            .map_err(|e| Error::malformed(format!("{:?}: {}", path, e))))
        .collect()
}

fn sorted_dirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        dirs.push((name, path));
    }
    dirs.sort();
    Ok(dirs)
}

/// Lists every `<student>/<version>` under `dir`, sorted by student then version.
pub fn discover_submissions(dir: &Path) -> Result<Vec<SubmissionSource>> {
    let mut sources = Vec::new();
    for (student_name, student_dir) in sorted_dirs(dir)? {
        let student: StudentId = Arc::from(student_name.as_str());
        let mut versions = Vec::new();
        for (version_name, version_dir) in sorted_dirs(&student_dir)? {
            let version = parse_version(&version_name)
                .map_err(|e| Error::malformed(format!("{:?}: {}", student_dir, e)))?;
            if !version_dir.join(HASHES_FILE).is_file() {
                warn!("Skipping {:?}: no {}", version_dir, HASHES_FILE);
                continue;
            }
            versions.push(SubmissionSource {
                student: student.clone(),
                version,
                dir: version_dir,
            });
        }
        // Directory names sort lexically; "10" must come after "9".
        versions.sort_by_key(|s| s.version);
        sources.extend(versions);
    }
    Ok(sources)
}

/// Builds the inverted index for one gradeable from its submissions.
pub fn build_index(gradeable: &str, sources: &[SubmissionSource]) -> Result<FingerprintIndex> {
    let mut index = FingerprintIndex::new(gradeable);
    for source in sources {
        let fingerprints = read_fingerprints(&source.hashes_path())?;
        for (offset, fingerprint) in fingerprints.into_iter().enumerate() {
            index.insert(fingerprint, &source.student, Occurrence {
                version: source.version,
                position: offset + 1,
            });
        }
    }
    debug!("Indexed {} occurrences of {} fingerprints for {}",
           index.occurrence_count(), index.fingerprint_count(), gradeable);
    Ok(index)
}

/// Loads provided code if the gradeable has any. A missing file simply
/// disables provided-code matching.
pub fn load_provided_code(root: &Path) -> Result<Option<ProvidedCode>> {
    let path = root.join(PROVIDED_CODE_DIR).join(HASHES_FILE);
    if !path.is_file() {
        info!("No provided code found at {:?}", path);
        return Ok(None);
    }
    let provided: ProvidedCode = read_fingerprints(&path)?.into_iter().collect();
    info!("Loaded {} provided-code fingerprints", provided.len());
    Ok(Some(provided))
}

/// One index per directory under `other_gradeables/`, labelled by directory name.
pub fn load_other_gradeables(root: &Path) -> Result<Vec<FingerprintIndex>> {
    let dir = root.join(OTHER_GRADEABLES_DIR);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut indices = Vec::new();
    for (name, gradeable_dir) in sorted_dirs(&dir)? {
        let sources = discover_submissions(&gradeable_dir)?;
        let index = build_index(&name, &sources)?;
        info!("Loaded other gradeable {} ({} submissions)", name, sources.len());
        indices.push(index);
    }
    Ok(indices)
}

/// Everything the matching pass reads: the three indices plus the list of
/// current submissions to classify.
#[derive(Debug)]
pub struct Corpus {
    pub current: FingerprintIndex,
    pub provided: Option<ProvidedCode>,
    pub others: Vec<FingerprintIndex>,
    pub sources: Vec<SubmissionSource>,
}

impl Corpus {
    pub fn load(root: &Path, config: &GradeableConfig) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::Config(
                format!("Gradeable directory does not exist: {:?}", root)
            ));
        }
        let users_dir = root.join(USERS_DIR);
        if !users_dir.is_dir() {
            return Err(Error::Config(
                format!("Unable to find users directory: {:?}", users_dir)
            ));
        }

        let sources = discover_submissions(&users_dir)?;
        info!("Found {} submissions under {:?}", sources.len(), users_dir);
        let current = build_index(&config.source_label(), &sources)?;

        let provided = if config.provided_code_enabled {
            load_provided_code(root)?
        } else {
            info!("Provided code disabled by configuration");
            None
        };
        let others = load_other_gradeables(root)?;

        Ok(Self { current, provided, others, sources })
    }
}
