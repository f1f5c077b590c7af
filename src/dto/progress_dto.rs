use crate::models::progress::CourseProgress;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct MarkModulePayload {
    pub student_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ModuleCompletionResponse {
    pub message: String,
    pub completed_modules: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct LessonCompletionResponse {
    pub message: String,
    pub completed_lessons: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub course_id: Uuid,
    pub student_id: Uuid,
    #[serde(flatten)]
    pub progress: CourseProgress,
}
