use crate::models::quiz::{AnswerKey, AttemptAnswer, QuestionOptions, Quiz};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SubmitAttemptPayload {
    pub student_id: Uuid,
    pub answers: Vec<AttemptAnswer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResult {
    pub question_index: i64,
    pub question_text: Option<String>,
    pub selected_answer: AnswerKey,
    pub correct_answer: Option<AnswerKey>,
    pub is_correct: bool,
    pub points: i32,
    pub possible_points: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttemptResultResponse {
    pub score: f64,
    pub earned_points: i32,
    pub total_points: i32,
    pub percentage: f64,
    pub questions_correct: usize,
    pub total_questions: usize,
    pub question_results: Vec<QuestionResult>,
    pub submitted_at: DateTime<Utc>,
    pub status: String,
}

/// Role-aware quiz view: students never receive the answer key.
#[derive(Debug, Serialize)]
pub struct QuizView {
    pub id: Uuid,
    pub course_id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub description: String,
    pub time_limit_minutes: Option<i32>,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub question_index: i64,
    pub text: String,
    pub options: QuestionOptions,
    pub points: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<AnswerKey>,
}

impl QuizView {
    pub fn from_quiz(quiz: &Quiz, include_answer_key: bool) -> Self {
        let questions = quiz
            .questions()
            .into_iter()
            .enumerate()
            .map(|(idx, q)| QuestionView {
                question_index: idx as i64,
                text: q.text,
                options: q.options,
                points: q.points,
                correct_answer: include_answer_key.then_some(q.correct_answer),
            })
            .collect();

        Self {
            id: quiz.id,
            course_id: quiz.course_id,
            module_id: quiz.module_id,
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            time_limit_minutes: quiz.time_limit_minutes,
            questions,
        }
    }
}
