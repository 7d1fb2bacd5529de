// libs/waiting-room-client/src/client.rs
use reqwest::Client;
use tracing::debug;
use uuid::Uuid;

use crate::models::{ClientError, WaitingStatus};

/// HTTP client for the consultation waiting-status endpoint.
///
/// Holds the caller's bearer token; the coordinator resolves the caller to
/// a party of the appointment from it, so one client serves one signed-in
/// user.
pub struct StatusClient {
    client: Client,
    base_url: String,
    auth_token: String,
}

impl StatusClient {
    pub fn new(base_url: &str, auth_token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.to_string(),
        }
    }

    /// Fetches the current waiting status for an appointment.
    pub async fn fetch_status(&self, appointment_id: Uuid) -> Result<WaitingStatus, ClientError> {
        let url = format!(
            "{}/consultation/{}/waiting-status",
            self.base_url, appointment_id
        );
        debug!("Fetching waiting status for appointment {}", appointment_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.auth_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await?;
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let waiting_status = response.json::<WaitingStatus>().await?;
        Ok(waiting_status)
    }
}
