use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::assignment_dto::ActorQuery,
    dto::progress_dto::{
        LessonCompletionResponse, MarkModulePayload, ModuleCompletionResponse, ProgressResponse,
    },
    error::{Error, Result},
    AppState,
};

async fn require_enrolled(state: &AppState, course_id: Uuid, student_id: Uuid) -> Result<()> {
    if !state.course_service.is_enrolled(course_id, student_id).await? {
        return Err(Error::Forbidden(
            "Student is not enrolled in this course".to_string(),
        ));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn mark_module_complete(
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<MarkModulePayload>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.get_course(course_id).await?;
    if !course.module_ids().contains(&module_id) {
        return Err(Error::NotFound("Module not found in this course".to_string()));
    }
    require_enrolled(&state, course_id, payload.student_id).await?;

    let progress = state
        .progress_service
        .mark_module_complete(payload.student_id, course_id, module_id)
        .await?;

    // Certificate follow-up runs after the response; its failures are
    // logged, never surfaced here.
    {
        let completion = state.completion_service.clone();
        let student_id = payload.student_id;
        tokio::spawn(async move {
            if let Err(e) = completion.auto_certificate_check(student_id, course_id).await {
                tracing::error!(%student_id, %course_id, error = ?e, "Auto-certificate check failed");
            }
        });
    }

    Ok(Json(ModuleCompletionResponse {
        message: "Module marked as complete".to_string(),
        completed_modules: progress.completed_modules,
    }))
}

#[axum::debug_handler]
pub async fn mark_module_incomplete(
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<MarkModulePayload>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.get_course(course_id).await?;
    if !course.module_ids().contains(&module_id) {
        return Err(Error::NotFound("Module not found in this course".to_string()));
    }
    require_enrolled(&state, course_id, payload.student_id).await?;

    let progress = state
        .progress_service
        .mark_module_incomplete(payload.student_id, course_id, module_id)
        .await?;

    Ok(Json(ModuleCompletionResponse {
        message: "Module marked as incomplete".to_string(),
        completed_modules: progress.completed_modules,
    }))
}

#[axum::debug_handler]
pub async fn mark_lesson_complete(
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<MarkModulePayload>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.get_course(course_id).await?;
    let known_lesson = course
        .modules()
        .iter()
        .flat_map(|m| m.lessons.iter())
        .any(|l| l.id == lesson_id);
    if !known_lesson {
        return Err(Error::NotFound("Lesson not found in this course".to_string()));
    }
    require_enrolled(&state, course_id, payload.student_id).await?;

    let progress = state
        .progress_service
        .mark_lesson_complete(payload.student_id, course_id, lesson_id)
        .await?;

    Ok(Json(LessonCompletionResponse {
        message: "Lesson marked as complete".to_string(),
        completed_lessons: progress.completed_lessons,
    }))
}

#[axum::debug_handler]
pub async fn get_progress(
    State(state): State<AppState>,
    Path((course_id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    state.course_service.get_course(course_id).await?;
    let progress = state
        .progress_service
        .get_progress(student_id, course_id)
        .await?;

    Ok(Json(ProgressResponse {
        course_id,
        student_id,
        progress,
    }))
}

#[axum::debug_handler]
pub async fn get_my_progress(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Query(query): Query<ActorQuery>,
) -> Result<impl IntoResponse> {
    let student_id = query
        .student_id
        .ok_or_else(|| Error::BadRequest("student_id is required".to_string()))?;
    state.course_service.get_course(course_id).await?;
    let progress = state
        .progress_service
        .get_progress(student_id, course_id)
        .await?;

    Ok(Json(ProgressResponse {
        course_id,
        student_id,
        progress,
    }))
}
