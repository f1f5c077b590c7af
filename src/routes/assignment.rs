use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::assignment_dto::{
        ActorQuery, GradeAssignmentPayload, SubmitAssignmentPayload, SubmissionView,
    },
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/assignments/{id}/submit",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    request_body = SubmitAssignmentPayload,
    responses(
        (status = 201, description = "Submission recorded"),
        (status = 400, description = "Missing content or invalid file"),
        (status = 404, description = "Assignment not found"),
        (status = 409, description = "Submission not allowed for this chain")
    )
)]
#[axum::debug_handler]
pub async fn submit_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitAssignmentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let response = state.submission_service.submit(id, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/assignments/{id}/grade/{student_id}",
    params(
        ("id" = Uuid, Path, description = "Assignment ID"),
        ("student_id" = Uuid, Path, description = "Student ID")
    ),
    request_body = GradeAssignmentPayload,
    responses(
        (status = 200, description = "Grade recorded"),
        (status = 400, description = "Invalid grade"),
        (status = 403, description = "Not the course instructor"),
        (status = 404, description = "Assignment or submission not found"),
        (status = 409, description = "Submission cannot be graded in its current status")
    )
)]
#[axum::debug_handler]
pub async fn grade_assignment(
    State(state): State<AppState>,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<GradeAssignmentPayload>,
) -> Result<impl IntoResponse> {
    let response = state.submission_service.grade(id, student_id, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/assignments/{id}/submissions",
    params(
        ("id" = Uuid, Path, description = "Assignment ID"),
        ("instructor_id" = Uuid, Query, description = "Requesting instructor")
    ),
    responses(
        (status = 200, description = "All submissions for the assignment"),
        (status = 403, description = "Not the course instructor"),
        (status = 404, description = "Assignment not found")
    )
)]
#[axum::debug_handler]
pub async fn list_submissions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ActorQuery>,
) -> Result<impl IntoResponse> {
    let instructor_id = query
        .instructor_id
        .ok_or_else(|| Error::BadRequest("instructor_id is required".to_string()))?;
    let rows = state
        .submission_service
        .list_submissions(id, instructor_id)
        .await?;
    let views: Vec<SubmissionView> = rows.into_iter().map(Into::into).collect();
    Ok(Json(views))
}

#[utoipa::path(
    get,
    path = "/api/assignments/{id}/my-submission",
    params(
        ("id" = Uuid, Path, description = "Assignment ID"),
        ("student_id" = Uuid, Query, description = "Requesting student")
    ),
    responses(
        (status = 200, description = "Latest submission in the student's chain"),
        (status = 404, description = "No submission yet")
    )
)]
#[axum::debug_handler]
pub async fn my_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ActorQuery>,
) -> Result<impl IntoResponse> {
    let student_id = query
        .student_id
        .ok_or_else(|| Error::BadRequest("student_id is required".to_string()))?;
    let submission = state.submission_service.my_submission(id, student_id).await?;
    Ok(Json(SubmissionView::from(submission)))
}
