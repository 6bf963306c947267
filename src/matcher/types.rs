// types.rs
use serde::{Serialize, Deserialize};

/// Inclusive window `[start, end]` of positions in another submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPosition {
    pub start: usize,
    pub end: usize,
}

/// Positions of one other submission that match a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherSubmission {
    #[serde(rename = "username")]
    pub student: String,
    pub version: u32,
    pub source_gradeable: String,
    pub matching_positions: Vec<MatchingPosition>,
}

impl OtherSubmission {
    pub fn same_submission(&self, other: &OtherSubmission) -> bool {
        self.student == other.student
            && self.version == other.version
            && self.source_gradeable == other.source_gradeable
    }
}

/// What a region of a submission was classified as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MatchKind {
    Match { others: Vec<OtherSubmission> },
    Common,
    Provided,
}

/// One entry of `matches.json`: an inclusive range of positions in this
/// submission and its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub start: usize,
    pub end: usize,
    #[serde(flatten)]
    pub kind: MatchKind,
}

impl MatchRecord {
    pub fn matched(position: usize, others: Vec<OtherSubmission>) -> Self {
        Self { start: position, end: position, kind: MatchKind::Match { others } }
    }

    pub fn common(position: usize) -> Self {
        Self { start: position, end: position, kind: MatchKind::Common }
    }

    pub fn provided(position: usize) -> Self {
        Self { start: position, end: position, kind: MatchKind::Provided }
    }

    pub fn is_match(&self) -> bool {
        matches!(self.kind, MatchKind::Match { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_type_tag() {
        let record = MatchRecord::matched(2, vec![OtherSubmission {
            student: "bob".into(),
            version: 1,
            source_gradeable: "f24__cs1__hw1".into(),
            matching_positions: vec![MatchingPosition { start: 2, end: 3 }],
        }]);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({
            "start": 2,
            "end": 2,
            "type": "match",
            "others": [{
                "username": "bob",
                "version": 1,
                "source_gradeable": "f24__cs1__hw1",
                "matching_positions": [{"start": 2, "end": 3}]
            }]
        }));

        let common = serde_json::to_value(MatchRecord::common(7)).unwrap();
        assert_eq!(common, json!({"start": 7, "end": 7, "type": "common"}));
    }
}
