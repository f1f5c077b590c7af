use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::certificate_dto::{
        CertificateResponse, EligibilityResponse, MarkCompletePayload, VerifyResponse,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/admin/courses/{id}/mark-complete",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    request_body = MarkCompletePayload,
    responses(
        (status = 200, description = "Completion run finished; counts in the body"),
        (status = 403, description = "Not the course instructor"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course already marked as complete")
    )
)]
#[axum::debug_handler]
pub async fn mark_course_complete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MarkCompletePayload>,
) -> Result<impl IntoResponse> {
    let response = state
        .completion_service
        .mark_complete(id, payload.instructor_id, payload.deadline)
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/certificates/eligibility/{course_id}/{student_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("student_id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Eligibility decision with the blocking reason, if any"),
        (status = 404, description = "Course not found")
    )
)]
#[axum::debug_handler]
pub async fn check_eligibility(
    State(state): State<AppState>,
    Path((course_id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.get_course(course_id).await?;
    let decision = state
        .eligibility_service
        .evaluate_student(&course, student_id, false)
        .await?;

    Ok(Json(EligibilityResponse {
        course_id,
        student_id,
        eligible: decision.eligible,
        reason: decision.reason,
        overall_score: decision.overall_score,
        grade: decision.grade.map(|g| g.as_str().to_string()),
    }))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}/certificate/{student_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("student_id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "The student's certificate for this course"),
        (status = 404, description = "No certificate issued for this pair")
    )
)]
#[axum::debug_handler]
pub async fn certificate_for_course(
    State(state): State<AppState>,
    Path((course_id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let cert = state
        .certificate_service
        .certificate_for_course(student_id, course_id)
        .await?;
    Ok(Json(CertificateResponse::from(cert)))
}

#[utoipa::path(
    get,
    path = "/api/certificates/student/{student_id}",
    params(
        ("student_id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Certificates held by the student, newest first")
    )
)]
#[axum::debug_handler]
pub async fn certificates_for_student(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let certs = state
        .certificate_service
        .certificates_for_student(student_id)
        .await?;
    let views: Vec<CertificateResponse> = certs.into_iter().map(Into::into).collect();
    Ok(Json(views))
}

#[utoipa::path(
    get,
    path = "/api/certificates/verify/{certificate_id}",
    params(
        ("certificate_id" = String, Path, description = "Public certificate identifier")
    ),
    responses(
        (status = 200, description = "Verification result; valid is false for unknown or revoked certificates")
    )
)]
#[axum::debug_handler]
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(certificate_id): Path<String>,
) -> Result<impl IntoResponse> {
    let cert = state.certificate_service.verify(&certificate_id).await?;
    let response = match cert {
        Some(cert) if cert.is_valid() => VerifyResponse {
            valid: true,
            certificate: Some(cert.into()),
        },
        Some(cert) => VerifyResponse {
            valid: false,
            certificate: Some(cert.into()),
        },
        None => VerifyResponse {
            valid: false,
            certificate: None,
        },
    };
    Ok(Json(response))
}
