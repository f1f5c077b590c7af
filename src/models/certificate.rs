use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Issued certificate. Immutable after insert apart from the revocation
/// fields; one row per (student, course), enforced by a unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Certificate {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub certificate_id: String,
    pub issued_at: DateTime<Utc>,
    pub certificate_url: String,
    pub verification_url: Option<String>,
    pub grade: String,
    pub overall_score: Option<i32>,
    pub issued_by: Option<Uuid>,
    pub is_revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by: Option<Uuid>,
    pub revocation_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Certificate {
    pub fn is_valid(&self) -> bool {
        !self.is_revoked && !self.certificate_url.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateGrade {
    Pass,
    Merit,
    Distinction,
}

impl CertificateGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateGrade::Pass => "Pass",
            CertificateGrade::Merit => "Merit",
            CertificateGrade::Distinction => "Distinction",
        }
    }

    /// Banding of a rounded overall score. A course with no assessments has
    /// no score and grades as a plain Pass.
    pub fn from_overall_score(overall_score: Option<i32>) -> Self {
        match overall_score {
            Some(score) if score >= 90 => CertificateGrade::Distinction,
            Some(score) if score >= 80 => CertificateGrade::Merit,
            _ => CertificateGrade::Pass,
        }
    }
}

impl std::fmt::Display for CertificateGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_bands() {
        assert_eq!(
            CertificateGrade::from_overall_score(Some(90)),
            CertificateGrade::Distinction
        );
        assert_eq!(
            CertificateGrade::from_overall_score(Some(89)),
            CertificateGrade::Merit
        );
        assert_eq!(
            CertificateGrade::from_overall_score(Some(80)),
            CertificateGrade::Merit
        );
        assert_eq!(
            CertificateGrade::from_overall_score(Some(79)),
            CertificateGrade::Pass
        );
        assert_eq!(CertificateGrade::from_overall_score(None), CertificateGrade::Pass);
    }
}
