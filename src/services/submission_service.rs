use crate::dto::assignment_dto::{
    GradeAssignmentPayload, GradeAssignmentResponse, ResubmissionInfo, SubmitAssignmentPayload,
    SubmitAssignmentResponse,
};
use crate::error::{Error, Result};
use crate::models::assignment::{Assignment, Submission, SubmissionStatus};
use crate::services::notification_service::NotificationService;
use crate::services::progress_service::ProgressService;
use crate::utils::grade::parse_grade;
use crate::utils::upload::FileConstraints;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub const RESUBMISSION_WINDOW_DAYS: i64 = 7;

/// What the legality check needs to know about the most recent submission
/// in a (assignment, student) chain.
#[derive(Debug, Clone, Copy)]
pub struct PriorSubmission {
    pub status: SubmissionStatus,
    pub graded_at: Option<DateTime<Utc>>,
}

/// Whether a new submission may be appended to the chain. Allowed when the
/// chain is empty, when the latest submission awaits resubmission and the
/// 7-day window is still open, or when the assignment explicitly allows
/// resubmission. Everything else is a conflict.
pub fn check_submission_allowed(
    latest: Option<PriorSubmission>,
    allow_resubmission: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let Some(prior) = latest else {
        return Ok(());
    };

    if prior.status == SubmissionStatus::ResubmissionRequired {
        if let Some(graded_at) = prior.graded_at {
            let deadline = graded_at + Duration::days(RESUBMISSION_WINDOW_DAYS);
            if now > deadline {
                return Err(Error::Conflict(
                    "Resubmission window has expired. Resubmissions are only allowed within 7 days of grading.".to_string(),
                ));
            }
        }
        return Ok(());
    }

    if allow_resubmission {
        return Ok(());
    }

    Err(Error::Conflict(
        "Assignment has already been submitted. Only one submission is allowed unless resubmission is required.".to_string(),
    ))
}

#[derive(Clone)]
pub struct SubmissionService {
    pool: PgPool,
    progress: ProgressService,
    notifications: NotificationService,
}

impl SubmissionService {
    pub fn new(pool: PgPool, progress: ProgressService, notifications: NotificationService) -> Self {
        Self {
            pool,
            progress,
            notifications,
        }
    }

    pub async fn get_assignment(&self, assignment_id: Uuid) -> Result<Assignment> {
        let assignment =
            sqlx::query_as::<_, Assignment>(r#"SELECT * FROM assignments WHERE id = $1"#)
                .bind(assignment_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| Error::NotFound("Assignment not found".to_string()))?;
        Ok(assignment)
    }

    /// Full chain for one student, in append order.
    pub async fn submissions_for_student(
        &self,
        assignment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Vec<Submission>> {
        let rows = sqlx::query_as::<_, Submission>(
            r#"SELECT * FROM submissions WHERE assignment_id = $1 AND student_id = $2 ORDER BY seq"#,
        )
        .bind(assignment_id)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_submissions(
        &self,
        assignment_id: Uuid,
        instructor_id: Uuid,
    ) -> Result<Vec<Submission>> {
        let assignment = self.get_assignment(assignment_id).await?;
        self.authorize_instructor(&assignment, instructor_id, "view submissions for")
            .await?;

        let rows = sqlx::query_as::<_, Submission>(
            r#"SELECT * FROM submissions WHERE assignment_id = $1 ORDER BY seq"#,
        )
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn my_submission(&self, assignment_id: Uuid, student_id: Uuid) -> Result<Submission> {
        self.get_assignment(assignment_id).await?;
        let chain = self.submissions_for_student(assignment_id, student_id).await?;
        chain
            .into_iter()
            .last()
            .ok_or_else(|| Error::NotFound("Submission not found".to_string()))
    }

    pub async fn submit(
        &self,
        assignment_id: Uuid,
        payload: SubmitAssignmentPayload,
    ) -> Result<SubmitAssignmentResponse> {
        let assignment = self.get_assignment(assignment_id).await?;

        let mut file_url = None;
        let content = if let Some(file) = &payload.file {
            let constraints = FileConstraints {
                max_size: assignment.max_file_size,
                allowed_extensions: assignment.allowed_extensions(),
            };
            constraints.check(&file.file_name, file.file_size)?;
            file_url = Some(file.file_url.clone());
            file.file_url.clone()
        } else {
            match payload.content.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => {
                    return Err(Error::ValidationMsg(
                        "Submission content or file is required".to_string(),
                    ))
                }
            }
        };

        let chain = self
            .submissions_for_student(assignment_id, payload.student_id)
            .await?;
        let now = Utc::now();
        let latest = chain.last().map(|s| PriorSubmission {
            status: s.status(),
            graded_at: s.graded_at,
        });
        check_submission_allowed(latest, assignment.allow_resubmission, now)?;

        let is_resubmission = !chain.is_empty();
        let original_submission_id = chain.first().map(|s| s.id);

        let mut tx = self.pool.begin().await?;

        // The superseded row leaves resubmission_required for its terminal
        // resubmitted state.
        if let Some(prior) = chain.last() {
            if prior.status() == SubmissionStatus::ResubmissionRequired {
                sqlx::query(r#"UPDATE submissions SET status = $2 WHERE id = $1"#)
                    .bind(prior.id)
                    .bind(SubmissionStatus::Resubmitted.as_str())
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let submission = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (
                id, assignment_id, student_id, content, submitted_at, status,
                is_resubmission, original_submission_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(assignment_id)
        .bind(payload.student_id)
        .bind(&content)
        .bind(now)
        .bind(SubmissionStatus::Pending.as_str())
        .bind(is_resubmission)
        .bind(original_submission_id)
        .fetch_one(&mut *tx)
        .await?;

        // Pending grade placeholder so progress views reflect the in-flight
        // submission.
        self.progress
            .record_grade_in_tx(&mut tx, payload.student_id, assignment.course_id, assignment.id, 0)
            .await?;

        tx.commit().await?;

        Ok(SubmitAssignmentResponse {
            message: if is_resubmission {
                "Resubmitted successfully".to_string()
            } else {
                "Submitted successfully".to_string()
            },
            submission_id: submission.id,
            file_url,
            is_resubmission,
            submitted_at: now,
        })
    }

    pub async fn grade(
        &self,
        assignment_id: Uuid,
        student_id: Uuid,
        payload: GradeAssignmentPayload,
    ) -> Result<GradeAssignmentResponse> {
        let grade = parse_grade(&payload.grade)?;
        let assignment = self.get_assignment(assignment_id).await?;
        self.authorize_instructor(&assignment, payload.instructor_id, "grade assignments for")
            .await?;

        let chain = self.submissions_for_student(assignment_id, student_id).await?;
        let latest = chain
            .last()
            .ok_or_else(|| Error::NotFound("Submission not found".to_string()))?;

        let next_status = if grade >= assignment.passing_grade {
            SubmissionStatus::Graded
        } else {
            SubmissionStatus::ResubmissionRequired
        };
        if !latest.status().can_transition_to(next_status) {
            return Err(Error::Conflict(format!(
                "Submission in status '{}' cannot be graded",
                latest.status
            )));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE submissions
            SET grade = $2, feedback = $3, status = $4, graded_at = $5, graded_by = $6
            WHERE id = $1
            "#,
        )
        .bind(latest.id)
        .bind(grade)
        .bind(payload.feedback.clone().unwrap_or_default())
        .bind(next_status.as_str())
        .bind(now)
        .bind(payload.instructor_id)
        .execute(&mut *tx)
        .await?;

        self.progress
            .record_grade_in_tx(&mut tx, student_id, assignment.course_id, assignment.id, grade)
            .await?;

        tx.commit().await?;

        let resubmission_info = if next_status == SubmissionStatus::ResubmissionRequired {
            let deadline = now + Duration::days(RESUBMISSION_WINDOW_DAYS);
            let reason = format!(
                "Grade of {}% is below the passing threshold of {}%",
                grade, assignment.passing_grade
            );
            self.notifications
                .notify_resubmission_required(student_id, assignment.id, deadline, &reason)
                .await;
            Some(ResubmissionInfo {
                required: true,
                deadline,
                reason,
            })
        } else {
            None
        };

        Ok(GradeAssignmentResponse {
            grade,
            status: next_status.as_str().to_string(),
            graded_at: now,
            resubmission_required: resubmission_info.is_some(),
            resubmission_info,
            passing_grade: assignment.passing_grade,
        })
    }

    async fn authorize_instructor(
        &self,
        assignment: &Assignment,
        instructor_id: Uuid,
        action: &str,
    ) -> Result<()> {
        let owner: Option<Uuid> =
            sqlx::query_scalar(r#"SELECT instructor_id FROM courses WHERE id = $1"#)
                .bind(assignment.course_id)
                .fetch_optional(&self.pool)
                .await?;

        let owner = owner.ok_or_else(|| Error::NotFound("Course not found".to_string()))?;
        if owner != instructor_id {
            return Err(Error::Forbidden(format!(
                "Not authorized to {} this course",
                action
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prior(status: SubmissionStatus, graded_days_ago: Option<i64>) -> PriorSubmission {
        PriorSubmission {
            status,
            graded_at: graded_days_ago.map(|d| Utc::now() - Duration::days(d)),
        }
    }

    #[test]
    fn first_submission_is_always_allowed() {
        assert!(check_submission_allowed(None, false, Utc::now()).is_ok());
    }

    #[test]
    fn second_submission_conflicts_without_resubmission() {
        let err = check_submission_allowed(
            Some(prior(SubmissionStatus::Graded, Some(1))),
            false,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(err.to_string().contains("already been submitted"));
    }

    #[test]
    fn allow_resubmission_flag_overrides_the_conflict() {
        assert!(check_submission_allowed(
            Some(prior(SubmissionStatus::Graded, Some(1))),
            true,
            Utc::now(),
        )
        .is_ok());
    }

    #[test]
    fn resubmission_window_scenario() {
        // Graded below passing 8 days ago: window expired.
        let err = check_submission_allowed(
            Some(prior(SubmissionStatus::ResubmissionRequired, Some(8))),
            false,
            Utc::now(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Resubmission window has expired"));

        // 6 days ago: still open.
        assert!(check_submission_allowed(
            Some(prior(SubmissionStatus::ResubmissionRequired, Some(6))),
            false,
            Utc::now(),
        )
        .is_ok());
    }

    #[test]
    fn pending_latest_still_conflicts() {
        let err = check_submission_allowed(
            Some(prior(SubmissionStatus::Pending, None)),
            false,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }
}
