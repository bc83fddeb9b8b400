//! Per-file outcomes and the run summary, printable as text or JSON.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: String,
    pub comment_count: usize,
    pub removed_chars: usize,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn failed(path: String, error: String) -> Self {
        Self {
            path,
            comment_count: 0,
            removed_chars: 0,
            changed: false,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub files: usize,
    pub changed: usize,
    pub failed: usize,
    pub comments: usize,
    pub removed_chars: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) processed, {} changed, {} comment(s) removed ({} chars), {} failed",
            self.files, self.changed, self.comments, self.removed_chars, self.failed
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub files: Vec<FileReport>,
    pub summary: Summary,
}

impl Report {
    pub fn push(&mut self, file: FileReport) {
        let summary = &mut self.summary;
        summary.files += 1;
        if file.error.is_some() {
            summary.failed += 1;
        } else {
            summary.comments += file.comment_count;
            summary.removed_chars += file.removed_chars;
            if file.changed {
                summary.changed += 1;
            }
        }
        self.files.push(file);
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(path: &str, comments: usize, removed: usize) -> FileReport {
        FileReport {
            path: path.to_string(),
            comment_count: comments,
            removed_chars: removed,
            changed: comments > 0,
            error: None,
        }
    }

    #[test]
    fn summary_accumulates_and_formats() {
        let mut report = Report::default();
        report.push(ok("a.js", 2, 14));
        report.push(ok("b.ts", 0, 0));
        report.push(FileReport::failed("c.js".into(), "Failed to parse c.js: boom".into()));

        assert!(report.has_failures());
        assert_eq!(
            report.summary.to_string(),
            "3 file(s) processed, 1 changed, 2 comment(s) removed (14 chars), 1 failed"
        );
    }

    #[test]
    fn json_uses_camel_case_and_omits_missing_errors() {
        let mut report = Report::default();
        report.push(ok("a.js", 1, 5));
        report.push(FileReport::failed("b.js".into(), "bad".into()));

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "files": [
                    { "path": "a.js", "commentCount": 1, "removedChars": 5, "changed": true },
                    { "path": "b.js", "commentCount": 0, "removedChars": 0, "changed": false, "error": "bad" },
                ],
                "summary": { "files": 2, "changed": 1, "failed": 1, "comments": 1, "removedChars": 5 },
            })
        );
    }
}
