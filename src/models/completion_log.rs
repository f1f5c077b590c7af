use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

pub const ACTION_MARKED_COMPLETE: &str = "marked_complete";

/// Append-only audit record of one bulk course-completion run. Never
/// updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseCompletionLog {
    pub id: Uuid,
    pub course_id: Uuid,
    pub instructor_id: Uuid,
    pub action: String,
    pub student_outcomes: JsonValue,
    pub total_students: i32,
    pub eligible_count: i32,
    pub certificates_generated: i32,
    pub created_at: DateTime<Utc>,
}

/// Per-student result of one completion-run evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentOutcome {
    pub student_id: Uuid,
    pub eligible: bool,
    pub reason: String,
    pub certificate_generated: bool,
    pub certificate_id: Option<String>,
}

/// Aggregate counts over a run's outcomes: (eligible, certificates generated).
pub fn summarize_outcomes(outcomes: &[StudentOutcome]) -> (i32, i32) {
    let eligible = outcomes.iter().filter(|o| o.eligible).count() as i32;
    let generated = outcomes.iter().filter(|o| o.certificate_generated).count() as i32;
    (eligible, generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(eligible: bool, generated: bool) -> StudentOutcome {
        StudentOutcome {
            student_id: Uuid::new_v4(),
            eligible,
            reason: String::new(),
            certificate_generated: generated,
            certificate_id: None,
        }
    }

    #[test]
    fn counts_eligible_and_generated_independently() {
        // Three eligible (one render failure), two ineligible.
        let outcomes = vec![
            outcome(true, true),
            outcome(true, true),
            outcome(true, false),
            outcome(false, false),
            outcome(false, false),
        ];

        let (eligible, generated) = summarize_outcomes(&outcomes);
        assert_eq!(outcomes.len(), 5);
        assert_eq!(eligible, 3);
        assert_eq!(generated, 2);
        assert!(generated <= eligible);
    }
}
