use crate::models::assignment::Submission;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

/// Metadata for a file the upload layer has already stored. The core never
/// touches file bytes; it validates the metadata and records the URL.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmittedFileMeta {
    #[validate(length(min = 1))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub file_url: String,
    pub file_size: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAssignmentPayload {
    pub student_id: Uuid,
    pub content: Option<String>,
    #[validate(nested)]
    pub file: Option<SubmittedFileMeta>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAssignmentResponse {
    pub message: String,
    pub submission_id: Uuid,
    pub file_url: Option<String>,
    pub is_resubmission: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct GradeAssignmentPayload {
    pub instructor_id: Uuid,
    /// Kept as raw JSON so out-of-range and non-integer grades surface as
    /// validation errors rather than deserialization failures.
    pub grade: JsonValue,
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResubmissionInfo {
    pub required: bool,
    pub deadline: DateTime<Utc>,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct GradeAssignmentResponse {
    pub grade: i32,
    pub status: String,
    pub graded_at: DateTime<Utc>,
    pub resubmission_required: bool,
    pub resubmission_info: Option<ResubmissionInfo>,
    pub passing_grade: i32,
}

#[derive(Debug, Serialize)]
pub struct SubmissionView {
    pub id: Uuid,
    pub student_id: Uuid,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
    pub grade: Option<i32>,
    pub feedback: String,
    pub status: String,
    pub graded_at: Option<DateTime<Utc>>,
    pub is_resubmission: bool,
    pub original_submission_id: Option<Uuid>,
}

impl From<Submission> for SubmissionView {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id,
            student_id: s.student_id,
            content: s.content,
            submitted_at: s.submitted_at,
            grade: s.grade,
            feedback: s.feedback,
            status: s.status,
            graded_at: s.graded_at,
            is_resubmission: s.is_resubmission,
            original_submission_id: s.original_submission_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    pub student_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
}
