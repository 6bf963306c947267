use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Hashed token window produced by the upstream hasher. Only ever compared
/// for equality.
pub type Fingerprint = u64;

/// Student ids are shared between every index entry of that student.
pub type StudentId = Arc<str>;

/// Label of the gradeable a location came from.
pub type GradeableName = Arc<str>;

/// Parses one whitespace-delimited token of a `hashes.txt` file.
pub fn parse_fingerprint(token: &str) -> Result<Fingerprint> {
    u64::from_str_radix(token, 16)
        .map_err(|_| Error::malformed(format!("invalid fingerprint token {:?}", token)))
}

/// Parses a version directory name. Versions start at 1.
pub fn parse_version(name: &str) -> Result<u32> {
    match name.parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::malformed(format!("invalid version directory {:?}", name))),
    }
}

/// Where a fingerprint occurs in some other submission.
///
/// Field order matters: the derived ordering groups locations by
/// (student, version, source gradeable) before position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub student: StudentId,
    pub version: u32,
    pub source_gradeable: GradeableName,
    /// 1-based index into that submission's fingerprint sequence.
    pub position: usize,
}

impl Location {
    pub fn peer(&self) -> PeerKey {
        PeerKey {
            student: self.student.clone(),
            version: self.version,
            source_gradeable: self.source_gradeable.clone(),
        }
    }
}

/// Identity of a matched submission, possibly from another gradeable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerKey {
    pub student: StudentId,
    pub version: u32,
    pub source_gradeable: GradeableName,
}

impl fmt::Display for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.student, self.version, self.source_gradeable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_fingerprints() {
        assert_eq!(parse_fingerprint("0000001f").unwrap(), 31);
        assert_eq!(parse_fingerprint("deadbeef").unwrap(), 0xdeadbeef);
        assert!(parse_fingerprint("xyz").is_err());
        assert!(parse_fingerprint("-1").is_err());
    }

    #[test]
    fn rejects_zero_and_negative_versions() {
        assert_eq!(parse_version("3").unwrap(), 3);
        assert!(parse_version("0").is_err());
        assert!(parse_version("-2").is_err());
        assert!(parse_version("latest").is_err());
    }

    #[test]
    fn locations_group_by_student_then_version() {
        let g: GradeableName = Arc::from("f24__cs1__hw1");
        let a = Location { student: Arc::from("alice"), version: 2, source_gradeable: g.clone(), position: 9 };
        let b = Location { student: Arc::from("alice"), version: 2, source_gradeable: g.clone(), position: 1 };
        let c = Location { student: Arc::from("bob"), version: 1, source_gradeable: g, position: 1 };
        let mut v = vec![c.clone(), a.clone(), b.clone()];
        v.sort();
        assert_eq!(v, vec![b, a, c]);
    }
}
