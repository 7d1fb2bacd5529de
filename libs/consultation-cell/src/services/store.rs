// libs/consultation-cell/src/services/store.rs
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;

use crate::models::{Appointment, Consultation, ConsultationError, PartyRole, WaitingRoomStatus};

/// Consultation record access.
///
/// The store is an opaque single-record get/patch surface over the
/// `consultations` table, keyed by appointment id. Reads and patches are
/// individually atomic; read-then-patch sequences are deliberately
/// unlocked, which the human-cadence protocol tolerates.
pub struct ConsultationStore {
    supabase: Arc<SupabaseClient>,
}

impl ConsultationStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Fetches the consultation for an appointment.
    pub async fn find_by_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Consultation, ConsultationError> {
        let path = format!("/rest/v1/consultations?appointment_id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ConsultationError::DatabaseError {
                message: e.to_string(),
            })?;

        let consultation_data = result
            .into_iter()
            .next()
            .ok_or(ConsultationError::ConsultationNotFound)?;

        serde_json::from_value(consultation_data).map_err(|e| ConsultationError::DatabaseError {
            message: format!("Failed to parse consultation: {}", e),
        })
    }

    /// Applies a partial update to the consultation for an appointment.
    /// Only the provided fields change; everything else is left untouched.
    pub async fn update_consultation(
        &self,
        appointment_id: Uuid,
        body: Value,
        auth_token: &str,
    ) -> Result<(), ConsultationError> {
        let path = format!("/rest/v1/consultations?appointment_id=eq.{}", appointment_id);
        debug!("Patching consultation for appointment {}", appointment_id);

        let _: Vec<Value> = self
            .supabase
            .request(Method::PATCH, &path, Some(auth_token), Some(body))
            .await
            .map_err(|e| ConsultationError::DatabaseError {
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Writes a new waiting-room status for an appointment's consultation.
    pub async fn set_waiting_status(
        &self,
        appointment_id: Uuid,
        status: WaitingRoomStatus,
        auth_token: &str,
    ) -> Result<(), ConsultationError> {
        self.update_consultation(
            appointment_id,
            json!({
                "waiting_room_status": status,
                "updated_at": Utc::now(),
            }),
            auth_token,
        )
        .await
    }

    /// Fetches the appointment a consultation belongs to.
    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, ConsultationError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ConsultationError::DatabaseError {
                message: e.to_string(),
            })?;

        let appointment_data = result
            .into_iter()
            .next()
            .ok_or(ConsultationError::AppointmentNotFound)?;

        serde_json::from_value(appointment_data).map_err(|e| ConsultationError::DatabaseError {
            message: format!("Failed to parse appointment: {}", e),
        })
    }

    /// Loads the appointment and resolves which party the caller is.
    /// Callers matching neither appointment email are rejected.
    pub async fn resolve_party(
        &self,
        appointment_id: Uuid,
        user: &User,
        auth_token: &str,
    ) -> Result<(Appointment, PartyRole), ConsultationError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;

        let email = user.email.as_deref().unwrap_or_default();
        let role = appointment
            .party_for_email(email)
            .ok_or(ConsultationError::NotParticipant)?;

        Ok((appointment, role))
    }

    /// Advances an appointment from `in_progress` to `completed`.
    /// Returns whether the transition was applied.
    pub async fn complete_appointment_if_in_progress(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<bool, ConsultationError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;

        if appointment.status != "in_progress" {
            debug!(
                "Appointment {} is '{}', leaving status untouched",
                appointment_id, appointment.status
            );
            return Ok(false);
        }

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let body = json!({
            "status": "completed",
            "updated_at": Utc::now(),
        });

        let _: Vec<Value> = self
            .supabase
            .request(Method::PATCH, &path, Some(auth_token), Some(body))
            .await
            .map_err(|e| ConsultationError::DatabaseError {
                message: e.to_string(),
            })?;

        info!("Appointment {} advanced to completed", appointment_id);
        Ok(true)
    }
}
