use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{job_type_label, Job};

/// One alert addressed to a single applicant. Batches are handed to the
/// notifier in a single call.
#[derive(Debug, Clone, Serialize)]
pub struct JobAlertMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn deliver(&self, messages: Vec<JobAlertMessage>) -> Result<()>;
}

/// Hands alert batches to an external delivery service over HTTP.
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Serialize)]
struct AlertBatch {
    messages: Vec<JobAlertMessage>,
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(&self, messages: Vec<JobAlertMessage>) -> Result<()> {
        self.client
            .post(&self.endpoint)
            .json(&AlertBatch { messages })
            .send()
            .await
            .context("failed to submit alert batch")?
            .error_for_status()
            .context("alert webhook rejected the batch")?;
        Ok(())
    }
}

/// Stands in when no webhook is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn deliver(&self, messages: Vec<JobAlertMessage>) -> Result<()> {
        debug!(count = messages.len(), "alert delivery disabled, dropping batch");
        Ok(())
    }
}

pub fn compose_job_alert(
    recipient: &str,
    job: &Job,
    company_name: &str,
    detail_url: &str,
) -> JobAlertMessage {
    let subject = format!("New Job Alert: {}", job.title);
    let body = format!(
        "Hello!\n\n\
         A new job has been posted that might interest you:\n\n\
         Position: {title}\n\
         Company: {company}\n\
         Location: {location}\n\
         Type: {job_type}\n\
         Salary: ${min} - ${max}\n\n\
         View job details and apply here:\n\
         {url}\n\n\
         Don't miss this opportunity!",
        title = job.title,
        company = company_name,
        location = job.location,
        job_type = job_type_label(&job.job_type),
        min = job.salary_min,
        max = job.salary_max,
        url = detail_url,
    );

    JobAlertMessage {
        recipient: recipient.to_string(),
        subject,
        body,
    }
}

/// Best-effort boundary: delivery failures are logged and discarded so they
/// can never affect the moderation write they ride along with.
pub async fn dispatch_alerts(notifier: &dyn Notifier, messages: Vec<JobAlertMessage>) {
    if messages.is_empty() {
        return;
    }
    let count = messages.len();
    if let Err(err) = notifier.deliver(messages).await {
        warn!(error = %err, recipients = count, "failed to deliver job alert batch");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_job() -> Job {
        let now = Utc::now().naive_utc();
        Job {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            category: "Software Development".to_string(),
            location: "Berlin".to_string(),
            job_type: "full_time".to_string(),
            salary_min: 50_000,
            salary_max: 80_000,
            description: String::new(),
            requirements: String::new(),
            responsibilities: String::new(),
            application_deadline: now.date(),
            is_active: true,
            status: "approved".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn alert_carries_job_summary_and_link() {
        let job = sample_job();
        let url = format!("http://localhost:3000/jobs/{}", job.id);
        let message = compose_job_alert("a@example.com", &job, "Acme Inc", &url);

        assert_eq!(message.recipient, "a@example.com");
        assert_eq!(message.subject, "New Job Alert: Backend Engineer");
        assert!(message.body.contains("Acme Inc"));
        assert!(message.body.contains("Full Time"));
        assert!(message.body.contains("$50000 - $80000"));
        assert!(message.body.contains(&url));
    }
}
