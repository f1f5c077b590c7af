use crate::error::{Error, Result};
use crate::models::progress::{CourseProgress, CourseProgressRow};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Per-(student, course) progress record store. Every mutation is an atomic
/// read-modify-write of the single row, taken under a row lock.
#[derive(Clone)]
pub struct ProgressService {
    pool: PgPool,
}

impl ProgressService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Zero-value record when the student has not touched the course yet;
    /// never fails on absence.
    pub async fn get_progress(&self, student_id: Uuid, course_id: Uuid) -> Result<CourseProgress> {
        let row = sqlx::query_as::<_, CourseProgressRow>(
            r#"SELECT * FROM course_progress WHERE student_id = $1 AND course_id = $2"#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.decode()).unwrap_or_default())
    }

    pub async fn mark_module_complete(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        module_id: Uuid,
    ) -> Result<CourseProgress> {
        self.mutate(student_id, course_id, |progress| {
            progress.mark_module_complete(module_id);
        })
        .await
    }

    pub async fn mark_module_incomplete(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        module_id: Uuid,
    ) -> Result<CourseProgress> {
        self.mutate(student_id, course_id, |progress| {
            progress.mark_module_incomplete(module_id);
        })
        .await
    }

    pub async fn mark_lesson_complete(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<CourseProgress> {
        self.mutate(student_id, course_id, |progress| {
            progress.mark_lesson_complete(lesson_id);
        })
        .await
    }

    pub async fn record_grade(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        assignment_id: Uuid,
        grade: i32,
    ) -> Result<CourseProgress> {
        self.mutate(student_id, course_id, |progress| {
            progress.record_grade(assignment_id, grade);
        })
        .await
    }

    pub async fn record_score(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        quiz_id: Uuid,
        score: f64,
    ) -> Result<CourseProgress> {
        self.mutate(student_id, course_id, |progress| {
            progress.record_score(quiz_id, score);
        })
        .await
    }

    /// Same as [`record_grade`], but reusing a caller-held transaction so a
    /// submission write and its progress entry commit together.
    pub async fn record_grade_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        student_id: Uuid,
        course_id: Uuid,
        assignment_id: Uuid,
        grade: i32,
    ) -> Result<()> {
        let mut progress = Self::load_for_update(tx, student_id, course_id).await?;
        progress.record_grade(assignment_id, grade);
        Self::store(tx, student_id, course_id, &progress).await
    }

    pub async fn record_score_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        student_id: Uuid,
        course_id: Uuid,
        quiz_id: Uuid,
        score: f64,
    ) -> Result<()> {
        let mut progress = Self::load_for_update(tx, student_id, course_id).await?;
        progress.record_score(quiz_id, score);
        Self::store(tx, student_id, course_id, &progress).await
    }

    async fn mutate<F>(&self, student_id: Uuid, course_id: Uuid, apply: F) -> Result<CourseProgress>
    where
        F: FnOnce(&mut CourseProgress),
    {
        let mut tx = self.pool.begin().await?;
        let mut progress = Self::load_for_update(&mut tx, student_id, course_id).await?;
        apply(&mut progress);
        Self::store(&mut tx, student_id, course_id, &progress).await?;
        tx.commit().await?;
        Ok(progress)
    }

    async fn load_for_update(
        tx: &mut Transaction<'_, Postgres>,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<CourseProgress> {
        // Upsert a zero-value row first so FOR UPDATE always has something
        // to lock; records are created lazily on first interaction.
        sqlx::query(
            r#"
            INSERT INTO course_progress (student_id, course_id, completed_modules, completed_lessons, grades, scores)
            VALUES ($1, $2, '[]'::jsonb, '[]'::jsonb, '{}'::jsonb, '{}'::jsonb)
            ON CONFLICT (student_id, course_id) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .execute(&mut **tx)
        .await?;

        let row = sqlx::query_as::<_, CourseProgressRow>(
            r#"SELECT * FROM course_progress WHERE student_id = $1 AND course_id = $2 FOR UPDATE"#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.decode())
    }

    async fn store(
        tx: &mut Transaction<'_, Postgres>,
        student_id: Uuid,
        course_id: Uuid,
        progress: &CourseProgress,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE course_progress
            SET completed_modules = $3, completed_lessons = $4, grades = $5, scores = $6, updated_at = NOW()
            WHERE student_id = $1 AND course_id = $2
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .bind(serde_json::to_value(&progress.completed_modules).map_err(Error::Json)?)
        .bind(serde_json::to_value(&progress.completed_lessons).map_err(Error::Json)?)
        .bind(serde_json::to_value(&progress.grades).map_err(Error::Json)?)
        .bind(serde_json::to_value(&progress.scores).map_err(Error::Json)?)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
