use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One grading run, as posted by the assignment service.
///
/// `submission_id` namespaces the staging directory and the sandbox name, so
/// it must be unique among concurrently running tasks.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubmissionTask {
    pub webhook_url: String,
    pub container: String,
    pub part_id: String,
    pub files: Vec<SubmissionFile>,
    pub submission_id: i64,
    pub access_token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubmissionFile {
    pub url: String,
    pub name: String,
}

/// Outcome of one grading run, delivered to the webhook as-is.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub pass: bool,
    pub text: String,
}

impl SubmissionTask {
    /// Checks the file list before anything touches the filesystem.
    ///
    /// File names become entries of a shared staging directory, so duplicates
    /// would silently overwrite each other and separators or `..` would
    /// escape it. The upstream producer does not deduplicate.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::with_capacity(self.files.len());

        for file in &self.files {
            if file.name.is_empty() {
                return Err("empty submission file name".to_string());
            }
            if file.name.contains(['/', '\\']) || file.name == ".." {
                return Err(format!("unsafe submission file name: {:?}", file.name));
            }
            if !seen.insert(file.name.as_str()) {
                return Err(format!("duplicate submission file name: {:?}", file.name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task_with_names(names: &[&str]) -> SubmissionTask {
        SubmissionTask {
            webhook_url: "http://localhost/webhook".to_string(),
            container: "grader-image".to_string(),
            part_id: "part_1".to_string(),
            files: names
                .iter()
                .map(|n| SubmissionFile {
                    url: "http://localhost/file".to_string(),
                    name: n.to_string(),
                })
                .collect(),
            submission_id: 7,
            access_token: "secret".to_string(),
        }
    }

    #[test]
    fn test_task_deserialization() {
        let task: SubmissionTask = serde_json::from_str(
            r#"{
                "webhook_url": "http://web/webhooks/submissions/1",
                "container": "grader/golang:latest",
                "part_id": "hw_2",
                "files": [{"url": "http://files/main.go", "name": "main.go"}],
                "submission_id": 42,
                "access_token": "foobar123"
            }"#,
        )
        .unwrap();

        assert_eq!(task.submission_id, 42);
        assert_eq!(task.part_id, "hw_2");
        assert_eq!(task.files.len(), 1);
        assert_eq!(task.files[0].name, "main.go");
    }

    #[test]
    fn test_verdict_round_trip() {
        for verdict in [
            Verdict {
                pass: true,
                text: "ok".to_string(),
            },
            Verdict {
                pass: false,
                text: String::new(),
            },
            Verdict {
                pass: false,
                text: "Поздравляем! ✓ assert failed".to_string(),
            },
        ] {
            let json = serde_json::to_string(&verdict).unwrap();
            let back: Verdict = serde_json::from_str(&json).unwrap();
            assert_eq!(back, verdict);
        }
    }

    #[test]
    fn test_verdict_wire_format() {
        let verdict = Verdict {
            pass: false,
            text: "Timeout".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&verdict).unwrap(),
            serde_json::json!({"pass": false, "text": "Timeout"})
        );
    }

    #[test]
    fn test_validate_accepts_distinct_names() {
        assert!(task_with_names(&["main.go", "go.mod"]).validate().is_ok());
        assert!(task_with_names(&[]).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let err = task_with_names(&["main.go", "main.go"]).validate();
        assert!(err.unwrap_err().contains("duplicate"));
    }

    #[test]
    fn test_validate_rejects_unsafe_names() {
        for name in ["", "../main.go", "a/b.go", "..", r"a\b.go"] {
            assert!(
                task_with_names(&[name]).validate().is_err(),
                "name {name:?} should be rejected"
            );
        }
    }
}
