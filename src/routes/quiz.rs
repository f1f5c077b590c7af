use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::assignment_dto::ActorQuery,
    dto::quiz_dto::{QuizView, SubmitAttemptPayload},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/quizzes/{id}",
    params(
        ("id" = Uuid, Path, description = "Quiz ID"),
        ("instructor_id" = Option<Uuid>, Query, description = "Requesting instructor, when present")
    ),
    responses(
        (status = 200, description = "Quiz with questions; answer key only for the course instructor"),
        (status = 404, description = "Quiz not found")
    )
)]
#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ActorQuery>,
) -> Result<impl IntoResponse> {
    let quiz = state.quiz_service.get_quiz(id).await?;
    let course = state.course_service.get_course(quiz.course_id).await?;
    let include_answer_key = query.instructor_id == Some(course.instructor_id);
    Ok(Json(QuizView::from_quiz(&quiz, include_answer_key)))
}

#[utoipa::path(
    post,
    path = "/api/quizzes/{id}/submit",
    params(
        ("id" = Uuid, Path, description = "Quiz ID")
    ),
    request_body = SubmitAttemptPayload,
    responses(
        (status = 201, description = "Attempt scored and recorded"),
        (status = 400, description = "Answers are required"),
        (status = 404, description = "Quiz not found"),
        (status = 409, description = "Quiz already attempted")
    )
)]
#[axum::debug_handler]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitAttemptPayload>,
) -> Result<impl IntoResponse> {
    let response = state.quiz_service.submit_attempt(id, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
