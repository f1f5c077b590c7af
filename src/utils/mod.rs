pub mod certificate_id;
pub mod grade;
pub mod upload;
