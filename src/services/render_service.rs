use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Certificate-rendering capability. Rendering itself is an external
/// collaborator: when a renderer URL is configured the request goes over
/// HTTP; otherwise a deterministic local artifact path is recorded and the
/// document is produced out of band.
#[derive(Clone)]
pub struct RenderService {
    client: Client,
    renderer_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderRequest {
    pub student_name: String,
    pub course_title: String,
    pub completion_date: DateTime<Utc>,
    pub instructor_name: String,
    pub certificate_id: String,
    pub grade: String,
    pub overall_score: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RenderResponse {
    url: String,
}

impl RenderService {
    pub fn new(renderer_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            renderer_url,
        }
    }

    /// Without a configured renderer the artifact path is derived from the
    /// certificate id alone.
    pub async fn render(&self, request: &RenderRequest) -> Result<String> {
        let Some(url) = &self.renderer_url else {
            return Ok(format!("/certificates/{}.pdf", request.certificate_id));
        };

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Dependency(format!("Certificate renderer unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Dependency(format!(
                "Certificate renderer returned {}",
                response.status()
            )));
        }

        let body: RenderResponse = response
            .json()
            .await
            .map_err(|e| Error::Dependency(format!("Invalid renderer response: {}", e)))?;
        Ok(body.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn falls_back_to_local_artifact_path() {
        let service = RenderService::new(None);
        let request = RenderRequest {
            student_name: "Ada Lovelace".to_string(),
            course_title: "Analytical Engines".to_string(),
            completion_date: Utc::now(),
            instructor_name: "Charles Babbage".to_string(),
            certificate_id: "CERT-1700000000000-XK29FL7QP".to_string(),
            grade: "Merit".to_string(),
            overall_score: Some(84),
        };

        let url = tokio_test::block_on(service.render(&request)).unwrap();
        assert_eq!(url, "/certificates/CERT-1700000000000-XK29FL7QP.pdf");
    }
}
