use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub instructor_id: Uuid,
    /// Ordered modules embedded as JSONB, see [`CourseModule`].
    pub modules: JsonValue,
    pub passing_threshold: i32,
    pub is_completed_by_instructor: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Course {
    pub fn modules(&self) -> Vec<CourseModule> {
        serde_json::from_value(self.modules.clone()).unwrap_or_default()
    }

    pub fn module_ids(&self) -> Vec<Uuid> {
        self.modules().iter().map(|m| m.id).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub title: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    pub content: Option<String>,
    pub content_url: Option<String>,
    pub duration_minutes: Option<i32>,
}

fn default_content_type() -> String {
    "text".to_string()
}
