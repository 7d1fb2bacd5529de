// libs/twilio-webhook-cell/src/models.rs
use consultation_cell::ConsultationError;
use serde::Deserialize;
use uuid::Uuid;

// ============================================================================
// WEBHOOK PAYLOADS
// ============================================================================

/// Room status callback as Twilio posts it, form-encoded with PascalCase
/// keys. Every field is optional because Twilio varies the parameter set
/// by event type; the reconciler rejects payloads missing what it needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusCallback {
    #[serde(rename = "StatusCallbackEvent", default)]
    pub event: Option<String>,
    #[serde(rename = "RoomName", default)]
    pub room_name: Option<String>,
    #[serde(rename = "RoomSid", default)]
    pub room_sid: Option<String>,
    #[serde(rename = "RoomStatus", default)]
    pub room_status: Option<String>,
    #[serde(rename = "ParticipantIdentity", default)]
    pub participant_identity: Option<String>,
    #[serde(rename = "RecordingSid", default)]
    pub recording_sid: Option<String>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: Option<String>,
}

// ============================================================================
// ROOM NAME PARSING
// ============================================================================

/// What a callback's room name resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomLookup {
    /// Diagnostic room created outside the consultation flow.
    TestRoom,
    /// Consultation room carrying the appointment id.
    Consultation(Uuid),
}

impl RoomLookup {
    /// Parses a Twilio room name. Rooms named `test` or `test-*` are
    /// acknowledged without touching any record; consultation rooms must
    /// be `consultation-{appointment_id}`.
    pub fn parse(name: &str) -> Result<Self, WebhookError> {
        if name == "test" || name.starts_with("test-") {
            return Ok(RoomLookup::TestRoom);
        }

        let suffix = name
            .strip_prefix("consultation-")
            .ok_or_else(|| WebhookError::MalformedRoomName {
                name: name.to_string(),
            })?;

        let appointment_id =
            Uuid::parse_str(suffix).map_err(|_| WebhookError::MalformedRoomName {
                name: name.to_string(),
            })?;

        Ok(RoomLookup::Consultation(appointment_id))
    }
}

// ============================================================================
// RECONCILIATION OUTCOMES
// ============================================================================

/// How a callback was resolved. Returned by the reconciler so handlers
/// and tests can tell an applied fold from a no-op acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Diagnostic room, acknowledged without record access.
    TestAcknowledged,
    /// No consultation record matched the room; acknowledged so Twilio
    /// stops retrying.
    UnknownConsultation,
    /// The event mutated the consultation record.
    Applied,
    /// Observational event, logged without mutation.
    Ignored,
}

impl ReconcileOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::TestAcknowledged => "test-acknowledged",
            ReconcileOutcome::UnknownConsultation => "unknown-consultation",
            ReconcileOutcome::Applied => "applied",
            ReconcileOutcome::Ignored => "ignored",
        }
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Malformed room name: {name}")]
    MalformedRoomName { name: String },

    #[error("Callback missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Database error: {message}")]
    DatabaseError { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<ConsultationError> for WebhookError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::DatabaseError { message } => WebhookError::DatabaseError { message },
            other => WebhookError::Internal {
                message: other.to_string(),
            },
        }
    }
}
