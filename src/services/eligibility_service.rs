use crate::error::Result;
use crate::models::assignment::SubmissionStatus;
use crate::models::certificate::CertificateGrade;
use crate::models::course::Course;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// A student's standing on one assignment: latest submission in the chain,
/// if any. Earlier submissions never count.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentStanding {
    pub latest_status: Option<SubmissionStatus>,
    pub latest_grade: Option<i32>,
}

/// A student's standing on one quiz: score of the single attempt, if taken.
#[derive(Debug, Clone, Copy)]
pub struct QuizStanding {
    pub score: Option<f64>,
}

/// Everything the eligibility decision depends on, gathered up front. The
/// bulk workflow sets `is_marking_complete` to skip the instructor-sign-off
/// precondition, because the run itself is the act of signing off.
#[derive(Debug, Clone)]
pub struct EligibilityInput {
    pub enrolled: bool,
    pub course_completed_by_instructor: bool,
    pub passing_threshold: i32,
    pub is_marking_complete: bool,
    pub assignments: Vec<AssignmentStanding>,
    pub quizzes: Vec<QuizStanding>,
}

#[derive(Debug, Clone)]
pub struct EligibilityDecision {
    pub eligible: bool,
    pub reason: String,
    pub overall_score: Option<i32>,
    pub grade: Option<CertificateGrade>,
}

impl EligibilityDecision {
    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            eligible: false,
            reason: reason.into(),
            overall_score: None,
            grade: None,
        }
    }
}

/// Decide certificate eligibility for one student. Pure: all context comes
/// in as parameters. The course-level passing threshold is authoritative
/// for certification, not an assignment's own passing grade.
pub fn evaluate(input: &EligibilityInput) -> EligibilityDecision {
    if !input.enrolled {
        return EligibilityDecision::rejected("Student is not enrolled in this course");
    }

    if !input.is_marking_complete && !input.course_completed_by_instructor {
        return EligibilityDecision::rejected(
            "Course has not been marked as complete by instructor",
        );
    }

    let threshold = input.passing_threshold;
    let mut completed_scores: Vec<f64> = Vec::new();

    let total_assignments = input.assignments.len();
    let completed_assignments = input
        .assignments
        .iter()
        .filter(|standing| {
            let passed = standing.latest_status == Some(SubmissionStatus::Graded)
                && standing.latest_grade.map_or(false, |g| g >= threshold);
            if passed {
                if let Some(grade) = standing.latest_grade {
                    completed_scores.push(f64::from(grade));
                }
            }
            passed
        })
        .count();

    if completed_assignments < total_assignments {
        return EligibilityDecision::rejected(format!(
            "Student has completed {} out of {} assignments with passing grades",
            completed_assignments, total_assignments
        ));
    }

    let total_quizzes = input.quizzes.len();
    let mut completed_quizzes = 0;
    for standing in &input.quizzes {
        if let Some(score) = standing.score {
            if score >= f64::from(threshold) {
                completed_quizzes += 1;
                completed_scores.push(score);
            }
        }
    }

    if completed_quizzes < total_quizzes {
        return EligibilityDecision::rejected(format!(
            "Student has completed {} out of {} quizzes with passing scores",
            completed_quizzes, total_quizzes
        ));
    }

    // Simple unweighted mean across every completed assessment; a course
    // with no assessments is vacuously eligible with no score.
    let overall_score = if completed_scores.is_empty() {
        None
    } else {
        let mean = completed_scores.iter().sum::<f64>() / completed_scores.len() as f64;
        Some(mean.round() as i32)
    };

    let grade = CertificateGrade::from_overall_score(overall_score);
    let score_display = overall_score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    EligibilityDecision {
        eligible: true,
        reason: format!(
            "All requirements completed. Overall score: {}%",
            score_display
        ),
        overall_score,
        grade: Some(grade),
    }
}

#[derive(Debug, FromRow)]
struct LatestSubmissionRow {
    assignment_id: Uuid,
    status: String,
    grade: Option<i32>,
}

#[derive(Debug, FromRow)]
struct AttemptScoreRow {
    quiz_id: Uuid,
    score: f64,
}

#[derive(Clone)]
pub struct EligibilityService {
    pool: PgPool,
}

impl EligibilityService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Assemble the student's standings from the store and run the pure
    /// evaluation.
    pub async fn evaluate_student(
        &self,
        course: &Course,
        student_id: Uuid,
        is_marking_complete: bool,
    ) -> Result<EligibilityDecision> {
        let enrolled: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM enrollments WHERE course_id = $1 AND student_id = $2"#,
        )
        .bind(course.id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        let assignment_ids: Vec<Uuid> =
            sqlx::query_scalar(r#"SELECT id FROM assignments WHERE course_id = $1 ORDER BY created_at, id"#)
                .bind(course.id)
                .fetch_all(&self.pool)
                .await?;

        let latest_rows = sqlx::query_as::<_, LatestSubmissionRow>(
            r#"
            SELECT DISTINCT ON (s.assignment_id)
                s.assignment_id, s.status, s.grade
            FROM submissions s
            JOIN assignments a ON a.id = s.assignment_id
            WHERE a.course_id = $1 AND s.student_id = $2
            ORDER BY s.assignment_id, s.seq DESC
            "#,
        )
        .bind(course.id)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        let assignments = assignment_ids
            .iter()
            .map(|id| {
                let latest = latest_rows.iter().find(|r| r.assignment_id == *id);
                AssignmentStanding {
                    latest_status: latest.and_then(|r| SubmissionStatus::parse(&r.status)),
                    latest_grade: latest.and_then(|r| r.grade),
                }
            })
            .collect();

        let quiz_ids: Vec<Uuid> =
            sqlx::query_scalar(r#"SELECT id FROM quizzes WHERE course_id = $1 ORDER BY created_at, id"#)
                .bind(course.id)
                .fetch_all(&self.pool)
                .await?;

        let attempt_rows = sqlx::query_as::<_, AttemptScoreRow>(
            r#"
            SELECT qa.quiz_id, qa.score
            FROM quiz_attempts qa
            JOIN quizzes q ON q.id = qa.quiz_id
            WHERE q.course_id = $1 AND qa.student_id = $2
            "#,
        )
        .bind(course.id)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        let quizzes = quiz_ids
            .iter()
            .map(|id| QuizStanding {
                score: attempt_rows
                    .iter()
                    .find(|r| r.quiz_id == *id)
                    .map(|r| r.score),
            })
            .collect();

        let input = EligibilityInput {
            enrolled: enrolled > 0,
            course_completed_by_instructor: course.is_completed_by_instructor,
            passing_threshold: course.passing_threshold,
            is_marking_complete,
            assignments,
            quizzes,
        };

        Ok(evaluate(&input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> EligibilityInput {
        EligibilityInput {
            enrolled: true,
            course_completed_by_instructor: false,
            passing_threshold: 40,
            is_marking_complete: true,
            assignments: vec![],
            quizzes: vec![],
        }
    }

    fn standing(status: SubmissionStatus, grade: i32) -> AssignmentStanding {
        AssignmentStanding {
            latest_status: Some(status),
            latest_grade: Some(grade),
        }
    }

    #[test]
    fn not_enrolled_is_rejected() {
        let mut i = input();
        i.enrolled = false;
        let decision = evaluate(&i);
        assert!(!decision.eligible);
        assert_eq!(decision.reason, "Student is not enrolled in this course");
    }

    #[test]
    fn individual_check_requires_instructor_sign_off() {
        let mut i = input();
        i.is_marking_complete = false;
        let decision = evaluate(&i);
        assert!(!decision.eligible);
        assert_eq!(
            decision.reason,
            "Course has not been marked as complete by instructor"
        );
    }

    #[test]
    fn failed_resubmission_blocks_eligibility_with_exact_counts() {
        // One graded at 50, one stuck at resubmission_required with 30.
        let mut i = input();
        i.assignments = vec![
            standing(SubmissionStatus::Graded, 50),
            standing(SubmissionStatus::ResubmissionRequired, 30),
        ];
        let decision = evaluate(&i);
        assert!(!decision.eligible);
        assert_eq!(
            decision.reason,
            "Student has completed 1 out of 2 assignments with passing grades"
        );
    }

    #[test]
    fn graded_below_course_threshold_does_not_count() {
        // Assignment-level passing grade may be lower than the course
        // threshold; certification only honors the course threshold.
        let mut i = input();
        i.passing_threshold = 60;
        i.assignments = vec![standing(SubmissionStatus::Graded, 55)];
        let decision = evaluate(&i);
        assert!(!decision.eligible);
        assert_eq!(
            decision.reason,
            "Student has completed 0 out of 1 assignments with passing grades"
        );
    }

    #[test]
    fn missing_quiz_attempt_blocks_eligibility() {
        let mut i = input();
        i.quizzes = vec![QuizStanding { score: None }, QuizStanding { score: Some(75.0) }];
        let decision = evaluate(&i);
        assert!(!decision.eligible);
        assert_eq!(
            decision.reason,
            "Student has completed 1 out of 2 quizzes with passing scores"
        );
    }

    #[test]
    fn empty_course_is_vacuously_eligible() {
        let decision = evaluate(&input());
        assert!(decision.eligible);
        assert_eq!(decision.overall_score, None);
        assert_eq!(decision.grade, Some(CertificateGrade::Pass));
        assert_eq!(
            decision.reason,
            "All requirements completed. Overall score: N/A%"
        );
    }

    #[test]
    fn overall_score_is_unweighted_mean_of_completed_assessments() {
        let mut i = input();
        i.assignments = vec![
            standing(SubmissionStatus::Graded, 95),
            standing(SubmissionStatus::Graded, 85),
        ];
        i.quizzes = vec![QuizStanding { score: Some(90.0) }];
        let decision = evaluate(&i);
        assert!(decision.eligible);
        assert_eq!(decision.overall_score, Some(90));
        assert_eq!(decision.grade, Some(CertificateGrade::Distinction));
    }

    #[test]
    fn zero_score_reports_as_a_percentage_not_na() {
        // With a zero threshold a graded 0 counts as completed; the score
        // exists, so it renders as 0%, never N/A.
        let mut i = input();
        i.passing_threshold = 0;
        i.assignments = vec![standing(SubmissionStatus::Graded, 0)];
        let decision = evaluate(&i);
        assert!(decision.eligible);
        assert_eq!(decision.overall_score, Some(0));
        assert_eq!(
            decision.reason,
            "All requirements completed. Overall score: 0%"
        );
    }

    #[test]
    fn merit_and_pass_bands() {
        let mut i = input();
        i.assignments = vec![standing(SubmissionStatus::Graded, 82)];
        let decision = evaluate(&i);
        assert_eq!(decision.grade, Some(CertificateGrade::Merit));

        i.assignments = vec![standing(SubmissionStatus::Graded, 41)];
        let decision = evaluate(&i);
        assert_eq!(decision.grade, Some(CertificateGrade::Pass));
        assert_eq!(
            decision.reason,
            "All requirements completed. Overall score: 41%"
        );
    }
}
