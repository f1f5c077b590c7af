use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

/// Notification capability the core calls but does not implement. Without a
/// webhook URL every event is only logged; with one, delivery is
/// best-effort and failures are logged, never propagated.
#[derive(Clone)]
pub struct NotificationService {
    client: Client,
    webhook_url: Option<String>,
}

impl NotificationService {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }

    pub async fn notify_resubmission_required(
        &self,
        student_id: Uuid,
        assignment_id: Uuid,
        deadline: DateTime<Utc>,
        reason: &str,
    ) {
        info!(
            %student_id,
            %assignment_id,
            %deadline,
            reason,
            "Resubmission required"
        );

        let Some(url) = &self.webhook_url else {
            return;
        };

        let payload = json!({
            "event": "resubmission_required",
            "student_id": student_id,
            "assignment_id": assignment_id,
            "deadline": deadline,
            "reason": reason,
        });

        if let Err(e) = self.client.post(url).json(&payload).send().await {
            warn!(error = ?e, "Failed to deliver resubmission notification");
        }
    }
}
