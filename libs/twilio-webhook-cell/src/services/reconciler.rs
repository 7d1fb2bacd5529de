// libs/twilio-webhook-cell/src/services/reconciler.rs
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use consultation_cell::{
    Consultation, ConsultationError, ConsultationStore, PartyRole, WaitingRoomStatus,
};
use shared_config::AppConfig;

use crate::models::{ReconcileOutcome, RoomLookup, StatusCallback, WebhookError};

/// Folds Twilio status callbacks into the consultation record.
///
/// Twilio delivers callbacks at-least-once and in no particular order, so
/// every fold is an idempotent field overwrite: replaying an event lands the
/// record in the same state. Callbacks carry no caller session; all record
/// access goes through the service role key.
pub struct StatusCallbackService {
    store: ConsultationStore,
    service_role_key: String,
}

impl StatusCallbackService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: ConsultationStore::new(config),
            service_role_key: config.supabase_service_role_key.clone(),
        }
    }

    /// Resolves a callback to an outcome. Malformed payloads are the only
    /// errors surfaced to the provider as 4xx; a room with no matching
    /// consultation is acknowledged so Twilio stops retrying it.
    pub async fn reconcile(
        &self,
        callback: &StatusCallback,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let event = callback
            .event
            .as_deref()
            .ok_or(WebhookError::MissingField {
                field: "StatusCallbackEvent",
            })?;
        let room_name = callback
            .room_name
            .as_deref()
            .ok_or(WebhookError::MissingField { field: "RoomName" })?;

        let appointment_id = match RoomLookup::parse(room_name)? {
            RoomLookup::TestRoom => {
                info!("Acknowledging {} callback for test room {}", event, room_name);
                return Ok(ReconcileOutcome::TestAcknowledged);
            }
            RoomLookup::Consultation(id) => id,
        };

        let consultation = match self
            .store
            .find_by_appointment(appointment_id, &self.service_role_key)
            .await
        {
            Ok(consultation) => consultation,
            Err(ConsultationError::ConsultationNotFound) => {
                warn!(
                    "No consultation matches room {}, acknowledging {} to stop retries",
                    room_name, event
                );
                return Ok(ReconcileOutcome::UnknownConsultation);
            }
            Err(e) => return Err(e.into()),
        };

        match event {
            "room-created" => self.on_room_created(appointment_id, callback).await,
            "room-ended" => self.on_room_ended(appointment_id).await,
            "participant-connected" => {
                self.on_participant_connected(&consultation, callback).await
            }
            "participant-disconnected" => {
                info!(
                    "Participant {} disconnected from room {}",
                    callback.participant_identity.as_deref().unwrap_or("<unknown>"),
                    room_name
                );
                Ok(ReconcileOutcome::Ignored)
            }
            "room-updated" => {
                debug!(
                    "Room {} updated, status {}",
                    room_name,
                    callback.room_status.as_deref().unwrap_or("<unknown>")
                );
                Ok(ReconcileOutcome::Ignored)
            }
            "recording-started" => self.on_recording_started(appointment_id, callback).await,
            "recording-completed" | "recording-failed" => {
                info!(
                    "Recording {} for room {}: {}",
                    callback.recording_sid.as_deref().unwrap_or("<unknown>"),
                    room_name,
                    event
                );
                Ok(ReconcileOutcome::Ignored)
            }
            other => {
                warn!("Ignoring unrecognized callback event '{}' for room {}", other, room_name);
                Ok(ReconcileOutcome::Ignored)
            }
        }
    }

    /// `room-created` pins the provider-side room status and sid onto the
    /// record so later reads and the end-session flow know the room.
    async fn on_room_created(
        &self,
        appointment_id: Uuid,
        callback: &StatusCallback,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let mut body = json!({
            "twilio_room_status": "created",
            "updated_at": Utc::now(),
        });
        if let Some(sid) = callback.room_sid.as_deref() {
            body["twilio_room_sid"] = json!(sid);
        }

        self.store
            .update_consultation(appointment_id, body, &self.service_role_key)
            .await?;

        info!("Room created for appointment {}", appointment_id);
        Ok(ReconcileOutcome::Applied)
    }

    /// `room-ended` closes the session on record and advances the
    /// appointment when it is still marked in progress. Duplicate
    /// deliveries re-stamp the end timestamps with the later arrival.
    async fn on_room_ended(&self, appointment_id: Uuid) -> Result<ReconcileOutcome, WebhookError> {
        let now = Utc::now();
        self.store
            .update_consultation(
                appointment_id,
                json!({
                    "twilio_room_status": "completed",
                    "session_ended_at": now,
                    "ended_at": now,
                    "updated_at": now,
                }),
                &self.service_role_key,
            )
            .await?;

        self.store
            .complete_appointment_if_in_progress(appointment_id, &self.service_role_key)
            .await?;

        info!("Room ended for appointment {}", appointment_id);
        Ok(ReconcileOutcome::Applied)
    }

    /// `participant-connected` backstops the waiting-room signal: a client
    /// joining while the consultation is live and the record still says
    /// `empty` is marked waiting. Artist connections are observed but never
    /// mutate the record, keeping the client's presence authoritative.
    /// Connections reported after the session ended are left untouched.
    async fn on_participant_connected(
        &self,
        consultation: &Consultation,
        callback: &StatusCallback,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let identity = callback.participant_identity.as_deref().unwrap_or_default();

        match PartyRole::from_identity(identity) {
            Some(PartyRole::Client) => {
                if consultation.is_terminal() {
                    debug!(
                        "Client {} connected after appointment {} ended, leaving record untouched",
                        identity, consultation.appointment_id
                    );
                    return Ok(ReconcileOutcome::Ignored);
                }
                if consultation.waiting_room_status == WaitingRoomStatus::Empty {
                    self.store
                        .set_waiting_status(
                            consultation.appointment_id,
                            WaitingRoomStatus::ClientWaiting,
                            &self.service_role_key,
                        )
                        .await?;
                    info!(
                        "Client {} connected, marking appointment {} client-waiting",
                        identity, consultation.appointment_id
                    );
                    Ok(ReconcileOutcome::Applied)
                } else {
                    debug!(
                        "Client {} connected, waiting status already '{}'",
                        identity,
                        consultation.waiting_room_status.as_str()
                    );
                    Ok(ReconcileOutcome::Ignored)
                }
            }
            Some(PartyRole::Artist) => {
                info!(
                    "Artist {} connected to appointment {}",
                    identity, consultation.appointment_id
                );
                Ok(ReconcileOutcome::Ignored)
            }
            None => {
                warn!(
                    "Participant with unrecognized identity '{}' connected to appointment {}",
                    identity, consultation.appointment_id
                );
                Ok(ReconcileOutcome::Ignored)
            }
        }
    }

    /// `recording-started` captures the recording sid for later retrieval.
    async fn on_recording_started(
        &self,
        appointment_id: Uuid,
        callback: &StatusCallback,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let sid = match callback.recording_sid.as_deref() {
            Some(sid) => sid,
            None => {
                warn!(
                    "recording-started for appointment {} carried no RecordingSid",
                    appointment_id
                );
                return Ok(ReconcileOutcome::Ignored);
            }
        };

        self.store
            .update_consultation(
                appointment_id,
                json!({
                    "recording_sid": sid,
                    "updated_at": Utc::now(),
                }),
                &self.service_role_key,
            )
            .await?;

        info!(
            "Recording {} started for appointment {}",
            sid, appointment_id
        );
        Ok(ReconcileOutcome::Applied)
    }
}
