use crate::models::certificate::Certificate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct MarkCompletePayload {
    pub instructor_id: Uuid,
    /// Optional wall-clock deadline for the bulk run. Students not yet
    /// evaluated when it passes are left out of this run's log and the
    /// course stays unmarked, so the call can be retried.
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct MarkCompleteResponse {
    pub course_id: Uuid,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_students: i32,
    pub eligible_students: i32,
    pub certificates_generated: i32,
    pub log_id: Uuid,
    pub aborted: bool,
}

#[derive(Debug, Serialize)]
pub struct CertificateResponse {
    pub certificate_id: String,
    pub course_id: Uuid,
    pub student_id: Uuid,
    pub grade: String,
    pub overall_score: Option<i32>,
    pub issued_at: DateTime<Utc>,
    pub certificate_url: String,
    pub verification_url: Option<String>,
    pub is_revoked: bool,
}

impl From<Certificate> for CertificateResponse {
    fn from(c: Certificate) -> Self {
        Self {
            certificate_id: c.certificate_id,
            course_id: c.course_id,
            student_id: c.student_id,
            grade: c.grade,
            overall_score: c.overall_score,
            issued_at: c.issued_at,
            certificate_url: c.certificate_url,
            verification_url: c.verification_url,
            is_revoked: c.is_revoked,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub course_id: Uuid,
    pub student_id: Uuid,
    pub eligible: bool,
    pub reason: String,
    pub overall_score: Option<i32>,
    pub grade: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateResponse>,
}
