pub mod loader;

use ahash::{AHashMap, AHashSet};
use std::sync::Arc;

use crate::types::{Fingerprint, GradeableName, StudentId};

pub use loader::{Corpus, SubmissionSource};

/// One occurrence of a fingerprint inside a student's submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub version: u32,
    pub position: usize,
}

/// All occurrences of one fingerprint for one student, in load order.
#[derive(Debug, Clone)]
pub struct StudentOccurrences {
    pub student: StudentId,
    pub occurrences: Vec<Occurrence>,
}

/// Inverted index `fingerprint -> student -> occurrences` for one gradeable.
///
/// Students are kept sorted under each fingerprint. The index is built once
/// and only read afterwards.
#[derive(Debug, Clone)]
pub struct FingerprintIndex {
    gradeable: GradeableName,
    entries: AHashMap<Fingerprint, Vec<StudentOccurrences>>,
    occurrences: usize,
}

impl FingerprintIndex {
    pub fn new(gradeable: &str) -> Self {
        Self {
            gradeable: Arc::from(gradeable),
            entries: AHashMap::new(),
            occurrences: 0,
        }
    }

    pub fn gradeable(&self) -> &GradeableName {
        &self.gradeable
    }

    pub fn insert(&mut self, fingerprint: Fingerprint, student: &StudentId, occurrence: Occurrence) {
        let students = self.entries.entry(fingerprint).or_default();
        self.occurrences += 1;

        // Loaders walk students in sorted order, so the tail is the common case.
        if let Some(last) = students.last_mut() {
            if last.student == *student {
                last.occurrences.push(occurrence);
                return;
            }
        }
        match students.binary_search_by(|s| s.student.as_ref().cmp(student.as_ref())) {
            Ok(idx) => students[idx].occurrences.push(occurrence),
            Err(idx) => students.insert(idx, StudentOccurrences {
                student: student.clone(),
                occurrences: vec![occurrence],
            }),
        }
    }

    pub fn get(&self, fingerprint: Fingerprint) -> Option<&[StudentOccurrences]> {
        self.entries.get(&fingerprint).map(Vec::as_slice)
    }

    /// Number of distinct students whose submissions contain `fingerprint`.
    pub fn student_count(&self, fingerprint: Fingerprint) -> usize {
        self.entries.get(&fingerprint).map_or(0, Vec::len)
    }

    pub fn fingerprint_count(&self) -> usize {
        self.entries.len()
    }

    pub fn occurrence_count(&self) -> usize {
        self.occurrences
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fingerprints of instructor-provided code. Locations are irrelevant.
#[derive(Debug, Clone, Default)]
pub struct ProvidedCode {
    fingerprints: AHashSet<Fingerprint>,
}

impl ProvidedCode {
    pub fn contains(&self, fingerprint: Fingerprint) -> bool {
        self.fingerprints.contains(&fingerprint)
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

impl FromIterator<Fingerprint> for ProvidedCode {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        Self { fingerprints: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str) -> StudentId {
        Arc::from(name)
    }

    #[test]
    fn groups_occurrences_by_student_in_sorted_order() {
        let mut index = FingerprintIndex::new("hw1");
        let (alice, bob, carol) = (student("alice"), student("bob"), student("carol"));
        index.insert(7, &carol, Occurrence { version: 1, position: 4 });
        index.insert(7, &alice, Occurrence { version: 1, position: 2 });
        index.insert(7, &alice, Occurrence { version: 2, position: 9 });
        index.insert(7, &bob, Occurrence { version: 1, position: 1 });
        index.insert(8, &bob, Occurrence { version: 1, position: 2 });

        let entry = index.get(7).unwrap();
        let names: Vec<&str> = entry.iter().map(|s| s.student.as_ref()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert_eq!(entry[0].occurrences.len(), 2);
        assert_eq!(index.student_count(7), 3);
        assert_eq!(index.student_count(8), 1);
        assert_eq!(index.student_count(9), 0);
        assert_eq!(index.fingerprint_count(), 2);
        assert_eq!(index.occurrence_count(), 5);
    }

    #[test]
    fn provided_code_is_a_plain_set() {
        let provided: ProvidedCode = [1u64, 2, 2, 3].into_iter().collect();
        assert_eq!(provided.len(), 3);
        assert!(provided.contains(2));
        assert!(!provided.contains(4));
    }
}
