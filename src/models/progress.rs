use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

/// Raw `course_progress` row. The JSONB columns are decoded into a
/// [`CourseProgress`] for all in-process work.
#[derive(Debug, Clone, FromRow)]
pub struct CourseProgressRow {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub completed_modules: JsonValue,
    pub completed_lessons: JsonValue,
    pub grades: JsonValue,
    pub scores: JsonValue,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CourseProgressRow {
    pub fn decode(&self) -> CourseProgress {
        CourseProgress {
            completed_modules: serde_json::from_value(self.completed_modules.clone())
                .unwrap_or_default(),
            completed_lessons: serde_json::from_value(self.completed_lessons.clone())
                .unwrap_or_default(),
            grades: serde_json::from_value(self.grades.clone()).unwrap_or_default(),
            scores: serde_json::from_value(self.scores.clone()).unwrap_or_default(),
        }
    }
}

/// Per-student, per-course completion snapshot. Serializes to the shape
/// persisted in `course_progress`: completed module/lesson id lists plus
/// grade and score maps keyed by assignment/quiz id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseProgress {
    #[serde(default)]
    pub completed_modules: Vec<Uuid>,
    #[serde(default)]
    pub completed_lessons: Vec<Uuid>,
    #[serde(default)]
    pub grades: HashMap<Uuid, i32>,
    #[serde(default)]
    pub scores: HashMap<Uuid, f64>,
}

impl CourseProgress {
    /// Set-semantics add. Returns true when the set changed.
    pub fn mark_module_complete(&mut self, module_id: Uuid) -> bool {
        if self.completed_modules.contains(&module_id) {
            return false;
        }
        self.completed_modules.push(module_id);
        true
    }

    /// Set-semantics remove. Returns true when the set changed.
    pub fn mark_module_incomplete(&mut self, module_id: Uuid) -> bool {
        let before = self.completed_modules.len();
        self.completed_modules.retain(|m| *m != module_id);
        self.completed_modules.len() != before
    }

    pub fn mark_lesson_complete(&mut self, lesson_id: Uuid) -> bool {
        if self.completed_lessons.contains(&lesson_id) {
            return false;
        }
        self.completed_lessons.push(lesson_id);
        true
    }

    /// Last-writer-wins grade entry for an assignment.
    pub fn record_grade(&mut self, assignment_id: Uuid, grade: i32) {
        self.grades.insert(assignment_id, grade);
    }

    /// Last-writer-wins score entry for a quiz.
    pub fn record_score(&mut self, quiz_id: Uuid, score: f64) {
        self.scores.insert(quiz_id, score);
    }

    pub fn is_module_complete(&self, module_id: Uuid) -> bool {
        self.completed_modules.contains(&module_id)
    }

    /// True when every module id in `module_ids` has been marked complete.
    /// A course without modules never counts as finished.
    pub fn all_modules_complete(&self, module_ids: &[Uuid]) -> bool {
        !module_ids.is_empty() && module_ids.iter().all(|m| self.is_module_complete(*m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_completion_is_idempotent() {
        let mut progress = CourseProgress::default();
        let module = Uuid::new_v4();

        assert!(progress.mark_module_complete(module));
        assert!(!progress.mark_module_complete(module));
        assert_eq!(progress.completed_modules.len(), 1);

        assert!(progress.mark_module_incomplete(module));
        assert!(!progress.mark_module_incomplete(module));
        assert!(progress.completed_modules.is_empty());
    }

    #[test]
    fn grade_round_trips_by_assignment_id() {
        let mut progress = CourseProgress::default();
        let assignment = Uuid::new_v4();

        progress.record_grade(assignment, 73);
        assert_eq!(progress.grades.get(&assignment), Some(&73));

        progress.record_grade(assignment, 81);
        assert_eq!(progress.grades.get(&assignment), Some(&81));
        assert_eq!(progress.grades.len(), 1);
    }

    #[test]
    fn serializes_to_persisted_shape() {
        let mut progress = CourseProgress::default();
        let module = Uuid::new_v4();
        let quiz = Uuid::new_v4();
        progress.mark_module_complete(module);
        progress.record_score(quiz, 62.5);

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["completed_modules"][0], module.to_string());
        assert_eq!(json["scores"][quiz.to_string()], 62.5);

        let back: CourseProgress = serde_json::from_value(json).unwrap();
        assert_eq!(back, progress);
    }

    #[test]
    fn all_modules_complete_requires_every_module() {
        let mut progress = CourseProgress::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(!progress.all_modules_complete(&[]));
        progress.mark_module_complete(a);
        assert!(!progress.all_modules_complete(&[a, b]));
        progress.mark_module_complete(b);
        assert!(progress.all_modules_complete(&[a, b]));
    }
}
