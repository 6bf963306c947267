// src/ranking/report.rs

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::StudentRanking;
use crate::error::{Error, Result};

pub const PEER_RANKING_FILE: &str = "ranking.txt";
pub const OVERALL_RANKING_FILE: &str = "overall_ranking.txt";

/// `percent%   student   version`
pub fn format_overall_line(ranking: &StudentRanking) -> String {
    format!("{:>6.2}%   {:<15}   {:>3}", ranking.percent, ranking.student, ranking.version)
}

/// `percent%   student   version   source_gradeable`
pub fn format_peer_line(ranking: &StudentRanking) -> String {
    format!("{:>6.2}%   {:<15}   {:>3}   {}",
            ranking.percent, ranking.student, ranking.version,
            ranking.source_gradeable.as_deref().unwrap_or(""))
}

fn write_lines(path: &Path, rankings: &[StudentRanking], format: fn(&StudentRanking) -> String) -> Result<()> {
    let write = || -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for ranking in rankings {
            writeln!(out, "{}", format(ranking))?;
        }
        out.flush()
    };
    write().map_err(|e| Error::output(path, e))
}

pub fn write_peer_ranking(path: &Path, rankings: &[StudentRanking]) -> Result<()> {
    write_lines(path, rankings, format_peer_line)
}

pub fn write_overall_ranking(path: &Path, rankings: &[StudentRanking]) -> Result<()> {
    write_lines(path, rankings, format_overall_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn ranking(student: &str, percent: f64, gradeable: Option<&str>) -> StudentRanking {
        StudentRanking {
            student: student.into(),
            version: 2,
            source_gradeable: gradeable.map(String::from),
            percent,
            score: None,
        }
    }

    #[test]
    fn lines_are_fixed_width() {
        assert_eq!(format_overall_line(&ranking("alice", 12.5, None)),
                   " 12.50%   alice               2");
        assert_eq!(format_peer_line(&ranking("bob", 100.0, Some("f24__cs1__hw1"))),
                   "100.00%   bob                 2   f24__cs1__hw1");
    }

    #[test]
    fn writes_one_line_per_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(OVERALL_RANKING_FILE);
        write_overall_ranking(&path, &[ranking("a", 50.0, None), ranking("b", 0.0, None)]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with(" 50.00%   a "));
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join(PEER_RANKING_FILE);
        let err = write_peer_ranking(&path, &[]).unwrap_err();
        assert!(matches!(err, Error::Output { .. }));
        assert!(!err.is_fatal());
    }
}
