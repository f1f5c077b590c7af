use crate::config::get_config;
use crate::error::{Error, Result};
use crate::models::certificate::{Certificate, CertificateGrade};
use crate::models::course::Course;
use crate::services::eligibility_service::EligibilityDecision;
use crate::services::render_service::{RenderRequest, RenderService};
use crate::utils::certificate_id::generate_certificate_id;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Idempotent certificate issuance. One certificate per (student, course),
/// ever: a second issue attempt is a conflict the caller can recognize as
/// already-satisfied, backed by a unique constraint against races.
#[derive(Clone)]
pub struct CertificateService {
    pool: PgPool,
    renderer: RenderService,
}

impl CertificateService {
    pub fn new(pool: PgPool, renderer: RenderService) -> Self {
        Self { pool, renderer }
    }

    pub async fn existing_for(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Certificate>> {
        let cert = sqlx::query_as::<_, Certificate>(
            r#"SELECT * FROM certificates WHERE student_id = $1 AND course_id = $2"#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cert)
    }

    pub async fn issue(
        &self,
        student_id: Uuid,
        course: &Course,
        decision: &EligibilityDecision,
        issued_by: Uuid,
    ) -> Result<Certificate> {
        if self.existing_for(student_id, course.id).await?.is_some() {
            return Err(already_issued());
        }

        let student_name: Option<String> =
            sqlx::query_scalar(r#"SELECT name FROM users WHERE id = $1"#)
                .bind(student_id)
                .fetch_optional(&self.pool)
                .await?;
        let student_name =
            student_name.ok_or_else(|| Error::NotFound("Student not found".to_string()))?;

        let instructor_name: Option<String> =
            sqlx::query_scalar(r#"SELECT name FROM users WHERE id = $1"#)
                .bind(course.instructor_id)
                .fetch_optional(&self.pool)
                .await?;
        let instructor_name =
            instructor_name.ok_or_else(|| Error::NotFound("Instructor not found".to_string()))?;

        let certificate_id = generate_certificate_id();
        let grade = decision.grade.unwrap_or(CertificateGrade::Pass);
        let now = Utc::now();

        let certificate_url = self
            .renderer
            .render(&RenderRequest {
                student_name,
                course_title: course.title.clone(),
                completion_date: now,
                instructor_name,
                certificate_id: certificate_id.clone(),
                grade: grade.as_str().to_string(),
                overall_score: decision.overall_score,
            })
            .await?;

        let verification_url = format!("{}/verify/{}", get_config().client_url, certificate_id);

        let inserted = sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (
                id, student_id, course_id, certificate_id, issued_at,
                certificate_url, verification_url, grade, overall_score, issued_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(course.id)
        .bind(&certificate_id)
        .bind(now)
        .bind(&certificate_url)
        .bind(&verification_url)
        .bind(grade.as_str())
        .bind(decision.overall_score)
        .bind(issued_by)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(cert) => {
                info!(%student_id, course_id = %course.id, certificate_id, "Certificate issued");
                Ok(cert)
            }
            Err(err) => {
                let err = Error::from(err);
                if err.is_unique_violation() {
                    // Lost a race with a concurrent issuance for the same pair.
                    Err(already_issued())
                } else {
                    Err(err)
                }
            }
        }
    }

    /// The student's certificate for one course, if issued.
    pub async fn certificate_for_course(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Certificate> {
        self.existing_for(student_id, course_id)
            .await?
            .ok_or_else(|| Error::NotFound("Certificate not found".to_string()))
    }

    pub async fn certificates_for_student(&self, student_id: Uuid) -> Result<Vec<Certificate>> {
        let certs = sqlx::query_as::<_, Certificate>(
            r#"SELECT * FROM certificates WHERE student_id = $1 ORDER BY issued_at DESC"#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(certs)
    }

    /// Lookup by the public certificate identifier; revoked certificates
    /// verify as invalid.
    pub async fn verify(&self, certificate_id: &str) -> Result<Option<Certificate>> {
        let cert = sqlx::query_as::<_, Certificate>(
            r#"SELECT * FROM certificates WHERE certificate_id = $1"#,
        )
        .bind(certificate_id.to_ascii_uppercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(cert)
    }
}

fn already_issued() -> Error {
    Error::Conflict("Certificate already generated".to_string())
}
