use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{multipart::Form, Client};
use shared::protocol::{JobPayload, SUBMIT_PATH};

/// Seam to the HTTP layer. One call dispatches exactly one POST; retries and
/// timeouts are the transport's own business, not the controller's.
#[async_trait]
pub trait JobTransport: Send + Sync {
    async fn submit(&self, job: &JobPayload) -> Result<()>;
}

pub struct HttpJobTransport {
    http: Client,
    server_url: String,
}

impl HttpJobTransport {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into(),
        }
    }
}

#[async_trait]
impl JobTransport for HttpJobTransport {
    async fn submit(&self, job: &JobPayload) -> Result<()> {
        let mut form = Form::new();
        for (name, value) in job.form_fields() {
            form = form.text(name, value);
        }

        // The backend answers with JSON but nothing in the body matters to
        // the client; only the status line does.
        self.http
            .post(format!("{}{SUBMIT_PATH}", self.server_url))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

pub struct MissingJobTransport;

#[async_trait]
impl JobTransport for MissingJobTransport {
    async fn submit(&self, _job: &JobPayload) -> Result<()> {
        Err(anyhow!("job transport is unavailable"))
    }
}
