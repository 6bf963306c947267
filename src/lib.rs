//! lichen compares hashed token windows ("fingerprints") across student
//! submissions. It classifies every shared position as provided code,
//! common boilerplate or a suspicious peer match, merges the positions into
//! regions and ranks submissions by how much of them is suspicious.

// Module declarations
pub mod error;
pub mod types;
pub mod config;
pub mod index;
pub mod submission;
pub mod matcher;
pub mod ranking;
pub mod pipeline;
pub mod utils;

// Re-exports
pub use error::{Error, Result};
pub use config::LichenConfig;
pub use index::{Corpus, FingerprintIndex, ProvidedCode};
pub use matcher::{MatchClassifier, MatchKind, MatchRecord};
pub use pipeline::{run, RunOptions, RunSummary};
pub use submission::Submission;
