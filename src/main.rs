use axum::{
    routing::{get, post, put},
    Router,
};
use learnsphere_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let assignment_api = Router::new()
        .route(
            "/api/assignments/:id/submit",
            post(routes::assignment::submit_assignment),
        )
        .route(
            "/api/assignments/:id/grade/:student_id",
            put(routes::assignment::grade_assignment),
        )
        .route(
            "/api/assignments/:id/submissions",
            get(routes::assignment::list_submissions),
        )
        .route(
            "/api/assignments/:id/my-submission",
            get(routes::assignment::my_submission),
        );

    let quiz_api = Router::new()
        .route("/api/quizzes/:id", get(routes::quiz::get_quiz))
        .route("/api/quizzes/:id/submit", post(routes::quiz::submit_attempt));

    let progress_api = Router::new()
        .route(
            "/api/courses/:id/modules/:module_id/complete",
            post(routes::progress::mark_module_complete),
        )
        .route(
            "/api/courses/:id/modules/:module_id/incomplete",
            post(routes::progress::mark_module_incomplete),
        )
        .route(
            "/api/courses/:id/lessons/:lesson_id/complete",
            post(routes::progress::mark_lesson_complete),
        )
        .route(
            "/api/courses/:id/progress",
            get(routes::progress::get_my_progress),
        )
        .route(
            "/api/courses/:id/progress/:student_id",
            get(routes::progress::get_progress),
        );

    let certificate_api = Router::new()
        .route(
            "/api/admin/courses/:id/mark-complete",
            post(routes::certificate::mark_course_complete),
        )
        .route(
            "/api/courses/:course_id/certificate/:student_id",
            get(routes::certificate::certificate_for_course),
        )
        .route(
            "/api/certificates/eligibility/:course_id/:student_id",
            get(routes::certificate::check_eligibility),
        )
        .route(
            "/api/certificates/student/:student_id",
            get(routes::certificate::certificates_for_student),
        )
        .route(
            "/api/certificates/verify/:certificate_id",
            get(routes::certificate::verify_certificate),
        );

    let app = base_routes
        .merge(assignment_api)
        .merge(quiz_api)
        .merge(progress_api)
        .merge(certificate_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
