use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a single rewrite pass decided for one link destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkOutcome {
    /// Destination does not contain the marker; never inspected.
    NotSelected,
    /// Marker present but no table entry for the extracted name.
    Unresolved,
    /// Destination replaced by the given path.
    Rewritten(String),
}

impl LinkOutcome {
    pub fn new_href(&self) -> Option<&str> {
        match self {
            LinkOutcome::Rewritten(href) => Some(href),
            _ => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        !matches!(self, LinkOutcome::NotSelected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    LecturerLink,
    Relocation,
}

/// Replacement of an attribute value, addressed by byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrefEdit {
    pub start: usize,
    pub end: usize,
    pub old_text: String,
    pub new_text: String,
    pub kind: EditKind,
}

/// Counters for one document.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub anchors: usize,
    pub selected: usize,
    pub rewritten: usize,
    pub unresolved: usize,
    pub relocated: usize,
}

impl DocumentReport {
    pub fn changed(&self) -> bool {
        self.rewritten > 0 || self.relocated > 0
    }

    pub(crate) fn absorb(&mut self, other: &DocumentReport) {
        self.anchors += other.anchors;
        self.selected += other.selected;
        self.rewritten += other.rewritten;
        self.unresolved += other.unresolved;
        self.relocated += other.relocated;
    }
}

/// Result of rewriting one document: the new source and the edits that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRewrite {
    pub content: String,
    pub edits: Vec<HrefEdit>,
    pub report: DocumentReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub report: DocumentReport,
    pub edits: Vec<HrefEdit>,
    pub written: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a whole-site run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SiteReport {
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
    pub totals: DocumentReport,
    pub dry_run: bool,
}

impl SiteReport {
    pub fn files_changed(&self) -> usize {
        self.files.iter().filter(|f| f.report.changed()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_outcome_accessors() {
        assert_eq!(LinkOutcome::NotSelected.new_href(), None);
        assert!(!LinkOutcome::NotSelected.is_selected());
        assert!(LinkOutcome::Unresolved.is_selected());

        let outcome = LinkOutcome::Rewritten("lecturers/X/".to_string());
        assert_eq!(outcome.new_href(), Some("lecturers/X/"));
        assert!(outcome.is_selected());
    }

    #[test]
    fn test_report_absorb() {
        let mut totals = DocumentReport::default();
        assert!(!totals.changed());

        totals.absorb(&DocumentReport {
            anchors: 3,
            selected: 2,
            rewritten: 1,
            unresolved: 1,
            relocated: 0,
        });
        totals.absorb(&DocumentReport {
            anchors: 1,
            relocated: 1,
            ..Default::default()
        });

        assert_eq!(totals.anchors, 4);
        assert_eq!(totals.rewritten, 1);
        assert_eq!(totals.relocated, 1);
        assert!(totals.changed());
    }

    #[test]
    fn test_site_report_json() {
        let report = SiteReport {
            files: vec![FileReport {
                path: PathBuf::from("index.html"),
                report: DocumentReport {
                    anchors: 1,
                    selected: 1,
                    rewritten: 1,
                    ..Default::default()
                },
                edits: vec![HrefEdit {
                    start: 9,
                    end: 21,
                    old_text: "/lecturers/A".to_string(),
                    new_text: "lecturers/A/".to_string(),
                    kind: EditKind::LecturerLink,
                }],
                written: true,
            }],
            ..Default::default()
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"][0]["path"], "index.html");
        assert_eq!(json["files"][0]["edits"][0]["kind"], "LecturerLink");
        assert_eq!(json["failures"].as_array().unwrap().len(), 0);
        assert_eq!(report.files_changed(), 1);
        assert!(report.is_success());
    }
}
