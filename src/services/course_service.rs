use crate::error::{Error, Result};
use crate::models::course::Course;
use crate::models::user::User;
use sqlx::PgPool;
use uuid::Uuid;

/// Read access to courses, users and enrollments. Course catalog CRUD lives
/// with the surrounding application; the engine only consumes these facts.
#[derive(Clone)]
pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_course(&self, course_id: Uuid) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(r#"SELECT * FROM courses WHERE id = $1"#)
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Course not found".to_string()))?;
        Ok(course)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, role, bio, created_at, updated_at FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        Ok(user)
    }

    pub async fn is_enrolled(&self, course_id: Uuid, student_id: Uuid) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM enrollments WHERE course_id = $1 AND student_id = $2"#,
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Enrolled students in enrollment order, for the bulk completion loop.
    pub async fn enrolled_student_ids(&self, course_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"SELECT student_id FROM enrollments WHERE course_id = $1 ORDER BY enrolled_at, student_id"#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
