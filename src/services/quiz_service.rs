use crate::dto::quiz_dto::{AttemptResultResponse, QuestionResult, SubmitAttemptPayload};
use crate::error::{Error, Result};
use crate::models::quiz::{AttemptAnswer, Quiz, QuizAttempt, QuizQuestion};
use crate::services::progress_service::ProgressService;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Outcome of scoring one set of answers against a quiz's answer key.
#[derive(Debug)]
pub struct ScoredAttempt {
    pub earned_points: i32,
    pub total_points: i32,
    pub percentage: f64,
    pub questions_correct: usize,
    pub question_results: Vec<QuestionResult>,
}

/// Score answers against the key. An out-of-range question index produces a
/// zero-point error entry for that answer instead of failing the whole
/// attempt. Points accumulate over answered questions; percentage is 0 when
/// no points were available.
pub fn score_answers(questions: &[QuizQuestion], answers: &[AttemptAnswer]) -> ScoredAttempt {
    let mut earned_points = 0;
    let mut total_points = 0;
    let mut questions_correct = 0;
    let mut question_results = Vec::with_capacity(answers.len());

    for answer in answers {
        let question = usize::try_from(answer.question_index)
            .ok()
            .and_then(|idx| questions.get(idx));

        let Some(question) = question else {
            question_results.push(QuestionResult {
                question_index: answer.question_index,
                question_text: None,
                selected_answer: answer.selected_answer,
                correct_answer: None,
                is_correct: false,
                points: 0,
                possible_points: 0,
                error: Some("Question not found".to_string()),
            });
            continue;
        };

        let is_correct = question.correct_answer == answer.selected_answer;
        let possible_points = question.points.max(0);
        let points = if is_correct { possible_points } else { 0 };

        if is_correct {
            questions_correct += 1;
        }
        earned_points += points;
        total_points += possible_points;

        question_results.push(QuestionResult {
            question_index: answer.question_index,
            question_text: Some(question.text.clone()),
            selected_answer: answer.selected_answer,
            correct_answer: Some(question.correct_answer),
            is_correct,
            points,
            possible_points,
            error: None,
        });
    }

    let percentage = if total_points > 0 {
        f64::from(earned_points) / f64::from(total_points) * 100.0
    } else {
        0.0
    };

    ScoredAttempt {
        earned_points,
        total_points,
        percentage,
        questions_correct,
        question_results,
    }
}

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
    progress: ProgressService,
}

impl QuizService {
    pub fn new(pool: PgPool, progress: ProgressService) -> Self {
        Self { pool, progress }
    }

    pub async fn get_quiz(&self, quiz_id: Uuid) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(r#"SELECT * FROM quizzes WHERE id = $1"#)
            .bind(quiz_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))?;
        Ok(quiz)
    }

    pub async fn attempt_for_student(
        &self,
        quiz_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<QuizAttempt>> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"SELECT * FROM quiz_attempts WHERE quiz_id = $1 AND student_id = $2"#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }

    /// Score and persist a student's single attempt. A second attempt for
    /// the same (quiz, student) is a conflict; the unique constraint backs
    /// the pre-check against concurrent submits.
    pub async fn submit_attempt(
        &self,
        quiz_id: Uuid,
        payload: SubmitAttemptPayload,
    ) -> Result<AttemptResultResponse> {
        let quiz = self.get_quiz(quiz_id).await?;

        if payload.answers.is_empty() {
            return Err(Error::ValidationMsg("Answers are required".to_string()));
        }

        if self
            .attempt_for_student(quiz_id, payload.student_id)
            .await?
            .is_some()
        {
            return Err(already_attempted());
        }

        let questions = quiz.questions();
        let scored = score_answers(&questions, &payload.answers);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let insert = sqlx::query(
            r#"
            INSERT INTO quiz_attempts (id, quiz_id, student_id, answers, score, attempted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(quiz_id)
        .bind(payload.student_id)
        .bind(serde_json::to_value(&payload.answers)?)
        .bind(scored.percentage)
        .bind(now)
        .execute(&mut *tx)
        .await;

        if let Err(err) = insert {
            let err = Error::from(err);
            if err.is_unique_violation() {
                return Err(already_attempted());
            }
            return Err(err);
        }

        self.progress
            .record_score_in_tx(
                &mut tx,
                payload.student_id,
                quiz.course_id,
                quiz.id,
                scored.percentage,
            )
            .await?;

        tx.commit().await?;

        let rounded = (scored.percentage * 100.0).round() / 100.0;
        Ok(AttemptResultResponse {
            score: rounded,
            earned_points: scored.earned_points,
            total_points: scored.total_points,
            percentage: rounded,
            questions_correct: scored.questions_correct,
            total_questions: questions.len(),
            question_results: scored.question_results,
            submitted_at: now,
            status: "submitted".to_string(),
        })
    }
}

fn already_attempted() -> Error {
    Error::Conflict(
        "Quiz has already been submitted. Only one submission is allowed per quiz.".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::{AnswerKey, QuestionOptions};

    fn question(correct: AnswerKey, points: i32) -> QuizQuestion {
        QuizQuestion {
            text: "What is the output?".to_string(),
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
    fn weighted_scoring() {
        // Two questions worth 1 and 3 points; first correct, second wrong.
        let questions = vec![question(AnswerKey::A, 1), question(AnswerKey::C, 3)];
        let answers = vec![answer(0, AnswerKey::A), answer(1, AnswerKey::B)];

        let scored = score_answers(&questions, &answers);
        assert_eq!(scored.earned_points, 1);
        assert_eq!(scored.total_points, 4);
        assert_eq!(scored.percentage, 25.0);
        assert_eq!(scored.questions_correct, 1);
    }

    #[test]
    fn out_of_range_index_becomes_error_entry() {
        let questions = vec![question(AnswerKey::A, 2)];
        let answers = vec![answer(0, AnswerKey::A), answer(5, AnswerKey::D)];

        let scored = score_answers(&questions, &answers);
        assert_eq!(scored.question_results.len(), 2);
        let bad = &scored.question_results[1];
        assert_eq!(bad.error.as_deref(), Some("Question not found"));
        assert_eq!(bad.points, 0);
        assert_eq!(bad.possible_points, 0);
        assert_eq!(scored.earned_points, 2);
        assert_eq!(scored.total_points, 2);
    }

    #[test]
    fn no_answerable_points_scores_zero() {
        let scored = score_answers(&[], &[answer(0, AnswerKey::A)]);
        assert_eq!(scored.percentage, 0.0);
        assert_eq!(scored.total_points, 0);
    }

    #[test]
    fn perfect_attempt() {
        let questions = vec![question(AnswerKey::B, 1), question(AnswerKey::D, 1)];
        let answers = vec![answer(0, AnswerKey::B), answer(1, AnswerKey::D)];

        let scored = score_answers(&questions, &answers);
        assert_eq!(scored.percentage, 100.0);
        assert_eq!(scored.questions_correct, 2);
    }
}
