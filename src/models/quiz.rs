use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: Uuid,
    pub course_id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub description: String,
    /// Ordered questions embedded as JSONB, see [`QuizQuestion`].
    pub questions: JsonValue,
    pub time_limit_minutes: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn questions(&self) -> Vec<QuizQuestion> {
        serde_json::from_value(self.questions.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub text: String,
    pub options: QuestionOptions,
    pub correct_answer: AnswerKey,
    #[serde(default = "default_points")]
    pub points: i32,
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOptions {
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

/// One quiz attempt. At most one row per (quiz, student), enforced by a
/// unique constraint; attempts are never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub student_id: Uuid,
    pub answers: JsonValue,
    pub score: f64,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptAnswer {
    pub question_index: i64,
    pub selected_answer: AnswerKey,
}
