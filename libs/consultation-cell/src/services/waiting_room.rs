// libs/consultation-cell/src/services/waiting_room.rs
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

use crate::models::{
    ConsultationError, PartyRole, UpdateWaitingStatusRequest, UpdateWaitingStatusResponse,
    WaitingRoomAction, WaitingRoomStatus, WaitingStatusResponse,
};
use crate::services::store::ConsultationStore;

/// Computes the next waiting-room status for a join or leave action.
///
/// The client's presence always wins: a client joining overwrites an
/// artist already marked waiting, and an artist joining while the client
/// waits is a no-op so the client's signal is never lost. Leaving only
/// clears a party's own mark.
pub fn next_waiting_status(
    current: WaitingRoomStatus,
    action: WaitingRoomAction,
    role: PartyRole,
) -> WaitingRoomStatus {
    match (action, role) {
        (WaitingRoomAction::JoinWaiting, PartyRole::Client) => WaitingRoomStatus::ClientWaiting,
        (WaitingRoomAction::JoinWaiting, PartyRole::Artist) => {
            if current == WaitingRoomStatus::ClientWaiting {
                current
            } else {
                WaitingRoomStatus::ArtistWaiting
            }
        }
        (WaitingRoomAction::LeaveWaiting, PartyRole::Client) => {
            if current == WaitingRoomStatus::ClientWaiting {
                WaitingRoomStatus::Empty
            } else {
                current
            }
        }
        (WaitingRoomAction::LeaveWaiting, PartyRole::Artist) => {
            if current == WaitingRoomStatus::ArtistWaiting {
                WaitingRoomStatus::Empty
            } else {
                current
            }
        }
    }
}

/// Waiting-room coordination service.
///
/// Wraps the pure transition function with record access and the access
/// checks shared by every consultation operation.
pub struct WaitingRoomService {
    store: ConsultationStore,
}

impl WaitingRoomService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: ConsultationStore::new(config),
        }
    }

    /// Reads the waiting-room view of a consultation for one of its parties.
    pub async fn get_status(
        &self,
        appointment_id: Uuid,
        user: &User,
        auth_token: &str,
    ) -> Result<WaitingStatusResponse, ConsultationError> {
        self.store
            .resolve_party(appointment_id, user, auth_token)
            .await?;

        let consultation = self
            .store
            .find_by_appointment(appointment_id, auth_token)
            .await?;

        Ok(WaitingStatusResponse::from(&consultation))
    }

    /// Applies a waiting-room mutation for one of the consultation's parties.
    ///
    /// The body carries either an `action` (join/leave, folded through the
    /// transition function) or a direct `status` override, never both.
    pub async fn apply_update(
        &self,
        appointment_id: Uuid,
        request: UpdateWaitingStatusRequest,
        user: &User,
        auth_token: &str,
    ) -> Result<UpdateWaitingStatusResponse, ConsultationError> {
        let (_, role) = self
            .store
            .resolve_party(appointment_id, user, auth_token)
            .await?;

        let consultation = self
            .store
            .find_by_appointment(appointment_id, auth_token)
            .await?;

        if consultation.is_terminal() {
            return Err(ConsultationError::AlreadyEnded);
        }

        let next = match (request.action, request.status) {
            (Some(action), None) => {
                next_waiting_status(consultation.waiting_room_status, action, role)
            }
            (None, Some(status)) => status,
            _ => {
                return Err(ConsultationError::ValidationError {
                    message: "Provide exactly one of 'action' or 'status'".to_string(),
                })
            }
        };

        if next != consultation.waiting_room_status {
            self.store
                .set_waiting_status(appointment_id, next, auth_token)
                .await?;

            info!(
                "Waiting room for appointment {} moved {} -> {} ({})",
                appointment_id,
                consultation.waiting_room_status.as_str(),
                next.as_str(),
                role.as_str()
            );
        }

        Ok(UpdateWaitingStatusResponse {
            waiting_room_status: next,
            is_client_waiting: next == WaitingRoomStatus::ClientWaiting,
        })
    }
}
