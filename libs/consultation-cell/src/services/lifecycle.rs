// libs/consultation-cell/src/services/lifecycle.rs
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

use crate::models::{ConsultationError, PartyRole, WaitingStatusResponse};
use crate::services::store::ConsultationStore;
use crate::services::twilio::TwilioVideoService;

/// Session lifecycle control.
///
/// A session moves `not started -> active -> ended`, with the stored
/// timestamps as the single source of truth. Ending before a start is
/// allowed (an abort); every other transition out of order is a conflict.
pub struct SessionLifecycleService {
    store: ConsultationStore,
    config: Arc<AppConfig>,
}

impl SessionLifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: ConsultationStore::new(config),
            config: Arc::new(config.clone()),
        }
    }

    /// Starts the session. Host-only: the artist decides when the
    /// consultation begins, typically after seeing the client waiting.
    /// Whether the client is actually present is the caller's concern
    /// and is not re-checked here.
    pub async fn start_session(
        &self,
        appointment_id: Uuid,
        user: &User,
        auth_token: &str,
    ) -> Result<WaitingStatusResponse, ConsultationError> {
        let (_, role) = self
            .store
            .resolve_party(appointment_id, user, auth_token)
            .await?;

        if role != PartyRole::Artist {
            return Err(ConsultationError::NotSessionHost);
        }

        let mut consultation = self
            .store
            .find_by_appointment(appointment_id, auth_token)
            .await?;

        if consultation.is_terminal() {
            return Err(ConsultationError::AlreadyEnded);
        }
        if consultation.session_started_at.is_some() {
            return Err(ConsultationError::AlreadyStarted);
        }

        let now = Utc::now();
        self.store
            .update_consultation(
                appointment_id,
                json!({
                    "session_started_at": now,
                    "updated_at": now,
                }),
                auth_token,
            )
            .await?;

        info!("Session started for appointment {}", appointment_id);

        consultation.session_started_at = Some(now);
        Ok(WaitingStatusResponse::from(&consultation))
    }

    /// Ends the session. Either party may end; the end timestamps are
    /// written before the provider room is touched so the session reads
    /// as over even if Twilio is unreachable.
    pub async fn end_session(
        &self,
        appointment_id: Uuid,
        user: &User,
        auth_token: &str,
    ) -> Result<WaitingStatusResponse, ConsultationError> {
        self.store
            .resolve_party(appointment_id, user, auth_token)
            .await?;

        let mut consultation = self
            .store
            .find_by_appointment(appointment_id, auth_token)
            .await?;

        if consultation.is_terminal() {
            return Err(ConsultationError::AlreadyEnded);
        }

        let now = Utc::now();
        self.store
            .update_consultation(
                appointment_id,
                json!({
                    "session_ended_at": now,
                    "ended_at": now,
                    "updated_at": now,
                }),
                auth_token,
            )
            .await?;

        info!("Session ended for appointment {}", appointment_id);

        // Best effort: ask Twilio to complete the room so lingering
        // participants are disconnected. The session is already ended
        // on record, so failures here are logged and swallowed.
        if let Some(room_sid) = consultation.twilio_room_sid.clone() {
            match TwilioVideoService::new(&self.config) {
                Ok(twilio) => {
                    if let Err(e) = twilio.complete_room(&room_sid).await {
                        warn!(
                            "Failed to complete Twilio room {} for appointment {}: {}",
                            room_sid, appointment_id, e
                        );
                    }
                }
                Err(ConsultationError::NotConfigured) => {
                    debug!("Twilio not configured, skipping room completion");
                }
                Err(e) => {
                    warn!("Twilio client unavailable for room completion: {}", e);
                }
            }
        }

        consultation.session_ended_at = Some(now);
        consultation.ended_at = Some(now);
        Ok(WaitingStatusResponse::from(&consultation))
    }
}
