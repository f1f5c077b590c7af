pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    certificate_service::CertificateService, completion_service::CompletionService,
    course_service::CourseService, eligibility_service::EligibilityService,
    notification_service::NotificationService, progress_service::ProgressService,
    quiz_service::QuizService, render_service::RenderService,
    submission_service::SubmissionService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub course_service: CourseService,
    pub progress_service: ProgressService,
    pub submission_service: SubmissionService,
    pub quiz_service: QuizService,
    pub eligibility_service: EligibilityService,
    pub certificate_service: CertificateService,
    pub completion_service: CompletionService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let course_service = CourseService::new(pool.clone());
        let progress_service = ProgressService::new(pool.clone());
        let notification_service = NotificationService::new(config.notifier_webhook_url.clone());
        let render_service = RenderService::new(config.renderer_url.clone());

        let submission_service = SubmissionService::new(
            pool.clone(),
            progress_service.clone(),
            notification_service,
        );
        let quiz_service = QuizService::new(pool.clone(), progress_service.clone());
        let eligibility_service = EligibilityService::new(pool.clone());
        let certificate_service = CertificateService::new(pool.clone(), render_service);
        let completion_service = CompletionService::new(
            pool.clone(),
            course_service.clone(),
            progress_service.clone(),
            eligibility_service.clone(),
            certificate_service.clone(),
        );

        Self {
            pool,
            course_service,
            progress_service,
            submission_service,
            quiz_service,
            eligibility_service,
            certificate_service,
            completion_service,
        }
    }
}
