use crate::dto::certificate_dto::MarkCompleteResponse;
use crate::error::{Error, Result};
use crate::models::completion_log::{summarize_outcomes, StudentOutcome, ACTION_MARKED_COMPLETE};
use crate::models::course::Course;
use crate::services::certificate_service::CertificateService;
use crate::services::course_service::CourseService;
use crate::services::eligibility_service::EligibilityService;
use crate::services::progress_service::ProgressService;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Bulk course-completion workflow: evaluate every enrolled student,
/// issue certificates where eligible, flip the course's one-way completion
/// flag, and append one audit log for the run.
#[derive(Clone)]
pub struct CompletionService {
    pool: PgPool,
    courses: CourseService,
    progress: ProgressService,
    eligibility: EligibilityService,
    certificates: CertificateService,
}

impl CompletionService {
    pub fn new(
        pool: PgPool,
        courses: CourseService,
        progress: ProgressService,
        eligibility: EligibilityService,
        certificates: CertificateService,
    ) -> Self {
        Self {
            pool,
            courses,
            progress,
            eligibility,
            certificates,
        }
    }

    pub async fn mark_complete(
        &self,
        course_id: Uuid,
        instructor_id: Uuid,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<MarkCompleteResponse> {
        let course = self.courses.get_course(course_id).await?;

        let instructor = self.courses.get_user(instructor_id).await?;
        if !instructor.is_instructor() || course.instructor_id != instructor_id {
            return Err(Error::Forbidden(
                "Not authorized to mark this course as complete".to_string(),
            ));
        }
        if course.is_completed_by_instructor {
            return Err(Error::Conflict(
                "Course has already been marked as complete".to_string(),
            ));
        }

        let students = self.courses.enrolled_student_ids(course_id).await?;
        let total_students = students.len() as i32;

        let mut outcomes: Vec<StudentOutcome> = Vec::with_capacity(students.len());
        let mut aborted = false;

        for student_id in &students {
            if let Some(deadline) = deadline {
                if Utc::now() > deadline {
                    warn!(%course_id, evaluated = outcomes.len(), "Completion run hit its deadline; remaining students skipped");
                    aborted = true;
                    break;
                }
            }

            let outcome = self.evaluate_and_issue(&course, *student_id, instructor_id).await;
            outcomes.push(outcome);
        }

        // One student's failure never aborts the loop; the run as a whole
        // only fails on the flag or log writes below.
        let mut completed_at = None;
        if !aborted {
            let flipped = sqlx::query(
                r#"
                UPDATE courses
                SET is_completed_by_instructor = TRUE, completed_at = NOW(), completed_by = $2, updated_at = NOW()
                WHERE id = $1 AND is_completed_by_instructor = FALSE
                "#,
            )
            .bind(course_id)
            .bind(instructor_id)
            .execute(&self.pool)
            .await?;

            if flipped.rows_affected() == 0 {
                // Lost the race with a concurrent run on the same course.
                return Err(Error::Conflict(
                    "Course has already been marked as complete".to_string(),
                ));
            }
            completed_at = Some(Utc::now());
        }

        let (eligible_count, certificates_generated) = summarize_outcomes(&outcomes);

        let log_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO course_completion_logs (
                id, course_id, instructor_id, action, student_outcomes,
                total_students, eligible_count, certificates_generated
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(instructor_id)
        .bind(ACTION_MARKED_COMPLETE)
        .bind(serde_json::to_value(&outcomes)?)
        .bind(total_students)
        .bind(eligible_count)
        .bind(certificates_generated)
        .fetch_one(&self.pool)
        .await?;

        info!(
            %course_id,
            total_students,
            eligible_count,
            certificates_generated,
            %log_id,
            aborted,
            "Course completion run finished"
        );

        Ok(MarkCompleteResponse {
            course_id,
            completed_at,
            total_students,
            eligible_students: eligible_count,
            certificates_generated,
            log_id,
            aborted,
        })
    }

    async fn evaluate_and_issue(
        &self,
        course: &Course,
        student_id: Uuid,
        instructor_id: Uuid,
    ) -> StudentOutcome {
        let decision = match self
            .eligibility
            .evaluate_student(course, student_id, true)
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                error!(%student_id, course_id = %course.id, error = ?e, "Eligibility evaluation failed");
                return StudentOutcome {
                    student_id,
                    eligible: false,
                    reason: "Error evaluating student eligibility".to_string(),
                    certificate_generated: false,
                    certificate_id: None,
                };
            }
        };

        if !decision.eligible {
            return StudentOutcome {
                student_id,
                eligible: false,
                reason: decision.reason,
                certificate_generated: false,
                certificate_id: None,
            };
        }

        match self
            .certificates
            .issue(student_id, course, &decision, instructor_id)
            .await
        {
            Ok(cert) => StudentOutcome {
                student_id,
                eligible: true,
                reason: decision.reason,
                certificate_generated: true,
                certificate_id: Some(cert.certificate_id),
            },
            Err(e) if matches!(e, Error::Conflict(_)) => {
                // Already issued earlier (for example by the auto-check on
                // module completion): already satisfied, not a failure.
                StudentOutcome {
                    student_id,
                    eligible: true,
                    reason: decision.reason,
                    certificate_generated: false,
                    certificate_id: None,
                }
            }
            Err(e) => {
                error!(%student_id, course_id = %course.id, error = ?e, "Certificate generation failed");
                StudentOutcome {
                    student_id,
                    eligible: true,
                    reason: decision.reason,
                    certificate_generated: false,
                    certificate_id: None,
                }
            }
        }
    }

    /// Best-effort follow-up after a module completion: when every module
    /// of the course is complete for this student and no certificate exists
    /// yet, evaluate and issue one. Callers run this post-commit and only
    /// log failures; it never affects the module-completion response.
    pub async fn auto_certificate_check(&self, student_id: Uuid, course_id: Uuid) -> Result<()> {
        let course = self.courses.get_course(course_id).await?;
        let progress = self.progress.get_progress(student_id, course_id).await?;

        if !progress.all_modules_complete(&course.module_ids()) {
            return Ok(());
        }

        if self
            .certificates
            .existing_for(student_id, course_id)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let decision = self
            .eligibility
            .evaluate_student(&course, student_id, false)
            .await?;
        if !decision.eligible {
            info!(%student_id, %course_id, reason = %decision.reason, "Auto-certificate check: not eligible");
            return Ok(());
        }

        let cert = self
            .certificates
            .issue(student_id, &course, &decision, course.instructor_id)
            .await?;
        info!(%student_id, %course_id, certificate_id = %cert.certificate_id, "Certificate auto-issued on course completion");
        Ok(())
    }
}
