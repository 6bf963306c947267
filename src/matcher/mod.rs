pub mod classifier;
pub mod regions;
pub mod types;
// Re-export the main types
pub use self::classifier::{ClassificationStats, MatchClassifier};
pub use self::regions::{build_records, merge_records, submission_regions};
pub use self::types::{
    MatchKind,
    MatchRecord,
    MatchingPosition,
    OtherSubmission
};
