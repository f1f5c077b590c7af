use chrono::{Duration, Utc};
use learnsphere_backend::dto::certificate_dto::CertificateResponse;
use learnsphere_backend::models::assignment::SubmissionStatus;
use learnsphere_backend::models::certificate::{Certificate, CertificateGrade};
use learnsphere_backend::models::completion_log::{summarize_outcomes, StudentOutcome};
use learnsphere_backend::models::quiz::{AnswerKey, AttemptAnswer, QuestionOptions, QuizQuestion};
use learnsphere_backend::services::eligibility_service::{
    evaluate, AssignmentStanding, EligibilityInput, QuizStanding,
};
use learnsphere_backend::services::quiz_service::score_answers;
use learnsphere_backend::services::submission_service::{
    check_submission_allowed, PriorSubmission,
};
use learnsphere_backend::utils::certificate_id::generate_certificate_id;
use uuid::Uuid;

fn question(correct: AnswerKey, points: i32) -> QuizQuestion {
    QuizQuestion {
        text: "Pick one".to_string(),
        options: QuestionOptions {
            option_a: "a".to_string(),
            option_b: "b".to_string(),
            option_c: "c".to_string(),
            option_d: "d".to_string(),
        },
        correct_answer: correct,
        points,
    }
}

fn answer(index: i64, selected: AnswerKey) -> AttemptAnswer {
    AttemptAnswer {
        question_index: index,
        selected_answer: selected,
    }
}

#[test]
fn resubmission_timeline_around_the_seven_day_window() {
    let now = Utc::now();
    let graded_at = now - Duration::days(8);

    // A failed submission graded 8 days ago can no longer be replaced.
    let expired = check_submission_allowed(
        Some(PriorSubmission {
            status: SubmissionStatus::ResubmissionRequired,
            graded_at: Some(graded_at),
        }),
        false,
        now,
    );
    let err = expired.unwrap_err();
    assert!(err
        .to_string()
        .contains("Resubmission window has expired"));

    // The same chain one day inside the window is still open.
    let open = check_submission_allowed(
        Some(PriorSubmission {
            status: SubmissionStatus::ResubmissionRequired,
            graded_at: Some(now - Duration::days(6)),
        }),
        false,
        now,
    );
    assert!(open.is_ok());
}

#[test]
fn eligibility_counts_only_the_latest_submission_per_assignment() {
    // Two assignments and one quiz; the second assignment's chain ended in
    // a passing resubmission, which is what counts.
    let input = EligibilityInput {
        enrolled: true,
        course_completed_by_instructor: true,
        passing_threshold: 40,
        is_marking_complete: false,
        assignments: vec![
            AssignmentStanding {
                latest_status: Some(SubmissionStatus::Graded),
                latest_grade: Some(70),
            },
            AssignmentStanding {
                latest_status: Some(SubmissionStatus::Graded),
                latest_grade: Some(45),
            },
        ],
        quizzes: vec![QuizStanding { score: Some(80.0) }],
    };

    let decision = evaluate(&input);
    assert!(decision.eligible);
    assert_eq!(decision.overall_score, Some(65));
    assert_eq!(decision.grade, Some(CertificateGrade::Pass));
    assert_eq!(
        decision.reason,
        "All requirements completed. Overall score: 65%"
    );
}

#[test]
fn eligibility_rejects_an_unfinished_resubmission_chain() {
    let input = EligibilityInput {
        enrolled: true,
        course_completed_by_instructor: true,
        passing_threshold: 40,
        is_marking_complete: false,
        assignments: vec![AssignmentStanding {
            latest_status: Some(SubmissionStatus::ResubmissionRequired),
            latest_grade: Some(30),
        }],
        quizzes: vec![],
    };

    let decision = evaluate(&input);
    assert!(!decision.eligible);
    assert_eq!(
        decision.reason,
        "Student has completed 0 out of 1 assignments with passing grades"
    );
}

#[test]
fn quiz_percentage_is_weighted_over_answered_points() {
    // 1-point and 3-point questions; only the 1-pointer answered correctly.
    let questions = vec![question(AnswerKey::A, 1), question(AnswerKey::B, 3)];
    let answers = vec![answer(0, AnswerKey::A), answer(1, AnswerKey::D)];

    let scored = score_answers(&questions, &answers);
    assert_eq!(scored.earned_points, 1);
    assert_eq!(scored.total_points, 4);
    assert_eq!(scored.percentage, 25.0);
}

#[test]
fn completion_run_counts_track_outcomes() {
    let eligible_with_cert = |id: &str| StudentOutcome {
        student_id: Uuid::new_v4(),
        eligible: true,
        reason: "All requirements completed. Overall score: 88%".to_string(),
        certificate_generated: true,
        certificate_id: Some(id.to_string()),
    };

    let outcomes = vec![
        eligible_with_cert("CERT-1700000000000-ABCDEF123"),
        eligible_with_cert("CERT-1700000000001-ABCDEF124"),
        StudentOutcome {
            student_id: Uuid::new_v4(),
            eligible: true,
            reason: "All requirements completed. Overall score: 91%".to_string(),
            certificate_generated: false,
            certificate_id: None,
        },
        StudentOutcome {
            student_id: Uuid::new_v4(),
            eligible: false,
            reason: "Student has completed 1 out of 2 quizzes with passing scores".to_string(),
            certificate_generated: false,
            certificate_id: None,
        },
    ];

    let (eligible, generated) = summarize_outcomes(&outcomes);
    assert_eq!(eligible, 3);
    assert_eq!(generated, 2);
}

#[test]
fn course_certificate_view_keeps_the_identifying_fields() {
    let student_id = Uuid::new_v4();
    let course_id = Uuid::new_v4();
    let cert = Certificate {
        id: Uuid::new_v4(),
        student_id,
        course_id,
        certificate_id: "CERT-1700000000000-XK29FL7QP".to_string(),
        issued_at: Utc::now(),
        certificate_url: "/certificates/CERT-1700000000000-XK29FL7QP.pdf".to_string(),
        verification_url: Some(
            "http://localhost:3000/verify/CERT-1700000000000-XK29FL7QP".to_string(),
        ),
        grade: "Merit".to_string(),
        overall_score: Some(84),
        issued_by: Some(Uuid::new_v4()),
        is_revoked: false,
        revoked_at: None,
        revoked_by: None,
        revocation_reason: None,
        created_at: None,
    };
    assert!(cert.is_valid());

    let view = CertificateResponse::from(cert);
    assert_eq!(view.student_id, student_id);
    assert_eq!(view.course_id, course_id);
    assert_eq!(view.certificate_id, "CERT-1700000000000-XK29FL7QP");
    assert_eq!(view.grade, "Merit");
    assert_eq!(view.overall_score, Some(84));
    assert!(!view.is_revoked);
}

#[test]
fn certificate_ids_have_the_public_shape() {
    let id = generate_certificate_id();
    let parts: Vec<&str> = id.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "CERT");
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2].len(), 9);
    assert!(parts[2]
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}
