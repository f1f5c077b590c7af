use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub allow_resubmission: bool,
    pub max_file_size: i64,
    pub allowed_file_types: JsonValue,
    pub passing_grade: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Assignment {
    pub fn allowed_extensions(&self) -> Vec<String> {
        serde_json::from_value(self.allowed_file_types.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    /// Monotonic append order per assignment; "latest submission" is the
    /// row with the highest seq for a (assignment, student) pair.
    pub seq: i64,
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
    pub grade: Option<i32>,
    pub feedback: String,
    pub status: String,
    pub graded_at: Option<DateTime<Utc>>,
    pub graded_by: Option<Uuid>,
    pub is_resubmission: bool,
    pub original_submission_id: Option<Uuid>,
}

impl Submission {
    pub fn status(&self) -> SubmissionStatus {
        SubmissionStatus::parse(&self.status).unwrap_or(SubmissionStatus::Pending)
    }
}

/// Lifecycle of one submission row:
/// `pending -> graded` (passed) or `pending -> resubmission_required`
/// (failed), and `resubmission_required -> resubmitted` once a replacement
/// submission is accepted. `graded` and `resubmitted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Graded,
    ResubmissionRequired,
    Resubmitted,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Graded => "graded",
            SubmissionStatus::ResubmissionRequired => "resubmission_required",
            SubmissionStatus::Resubmitted => "resubmitted",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(SubmissionStatus::Pending),
            "graded" => Some(SubmissionStatus::Graded),
            "resubmission_required" => Some(SubmissionStatus::ResubmissionRequired),
            "resubmitted" => Some(SubmissionStatus::Resubmitted),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: SubmissionStatus) -> bool {
        matches!(
            (self, next),
            (SubmissionStatus::Pending, SubmissionStatus::Graded)
                | (SubmissionStatus::Pending, SubmissionStatus::ResubmissionRequired)
                | (SubmissionStatus::ResubmissionRequired, SubmissionStatus::Resubmitted)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Graded | SubmissionStatus::Resubmitted)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grading_transitions_only_from_pending() {
        assert!(SubmissionStatus::Pending.can_transition_to(SubmissionStatus::Graded));
        assert!(SubmissionStatus::Pending.can_transition_to(SubmissionStatus::ResubmissionRequired));
        assert!(!SubmissionStatus::Graded.can_transition_to(SubmissionStatus::Pending));
        assert!(!SubmissionStatus::Graded.can_transition_to(SubmissionStatus::ResubmissionRequired));
        assert!(!SubmissionStatus::Resubmitted.can_transition_to(SubmissionStatus::Graded));
    }

    #[test]
    fn resubmitted_only_follows_resubmission_required() {
        assert!(
            SubmissionStatus::ResubmissionRequired.can_transition_to(SubmissionStatus::Resubmitted)
        );
        assert!(!SubmissionStatus::Pending.can_transition_to(SubmissionStatus::Resubmitted));
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::Graded,
            SubmissionStatus::ResubmissionRequired,
            SubmissionStatus::Resubmitted,
        ] {
            assert_eq!(SubmissionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SubmissionStatus::parse("escaped"), None);
    }
}
