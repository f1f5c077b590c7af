pub mod certificate_service;
pub mod completion_service;
pub mod course_service;
pub mod eligibility_service;
pub mod notification_service;
pub mod progress_service;
pub mod quiz_service;
pub mod render_service;
pub mod submission_service;
