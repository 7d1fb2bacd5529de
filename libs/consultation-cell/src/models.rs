// libs/consultation-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// CONSULTATION DOMAIN MODELS
// ==============================================================================

/// Waiting-room occupancy for a consultation.
///
/// At most one party's presence is representable at a time. When both
/// parties signal presence the client's mark survives, because the artist
/// polls for `client-waiting` to know when to start the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WaitingRoomStatus {
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "client-waiting")]
    ClientWaiting,
    #[serde(rename = "artist-waiting")]
    ArtistWaiting,
}

impl WaitingRoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitingRoomStatus::Empty => "empty",
            WaitingRoomStatus::ClientWaiting => "client-waiting",
            WaitingRoomStatus::ArtistWaiting => "artist-waiting",
        }
    }
}

/// Which side of the appointment a caller or room participant is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    Client,
    Artist,
}

impl PartyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyRole::Client => "client",
            PartyRole::Artist => "artist",
        }
    }

    /// Room participant identity for this party, e.g. `client-ana@example.com`.
    /// The webhook reconciler relies on this prefix to attribute connections.
    pub fn identity_for(&self, email: &str) -> String {
        format!("{}-{}", self.as_str(), email)
    }

    /// Recovers the party from a room participant identity.
    pub fn from_identity(identity: &str) -> Option<PartyRole> {
        if identity.starts_with("client-") {
            Some(PartyRole::Client)
        } else if identity.starts_with("artist-") {
            Some(PartyRole::Artist)
        } else {
            None
        }
    }
}

/// Consultation record as stored, one per appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub waiting_room_status: WaitingRoomStatus,
    pub session_started_at: Option<DateTime<Utc>>,
    pub session_ended_at: Option<DateTime<Utc>>,

    // Provider-reported fields, observational only
    pub twilio_room_status: Option<String>,
    pub twilio_room_sid: Option<String>,
    pub recording_sid: Option<String>,

    // Legacy duplicate of session_ended_at, still written for older readers
    pub ended_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Consultation {
    /// A consultation is terminal once its end timestamp is written.
    pub fn is_terminal(&self) -> bool {
        self.session_ended_at.is_some()
    }

    /// Live-session flag, derived from the timestamps on every read.
    pub fn session_active(&self) -> bool {
        self.session_started_at.is_some() && self.session_ended_at.is_none()
    }

    pub fn is_client_waiting(&self) -> bool {
        self.waiting_room_status == WaitingRoomStatus::ClientWaiting
    }

    pub fn is_artist_waiting(&self) -> bool {
        self.waiting_room_status == WaitingRoomStatus::ArtistWaiting
    }

    /// Twilio room name for this consultation.
    pub fn room_name(&self) -> String {
        format!("consultation-{}", self.appointment_id)
    }
}

/// Appointment record owned by the booking system. Read here to resolve
/// which party a caller is, and advanced once when the room ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_email: String,
    pub artist_email: String,
    pub status: String,
    pub appointment_date: DateTime<Utc>,
}

impl Appointment {
    /// Resolves which side of the appointment an email belongs to.
    pub fn party_for_email(&self, email: &str) -> Option<PartyRole> {
        if email == self.client_email {
            Some(PartyRole::Client)
        } else if email == self.artist_email {
            Some(PartyRole::Artist)
        } else {
            None
        }
    }
}

// ==============================================================================
// TWILIO ACCESS TOKEN MODELS
// ==============================================================================

/// Video grant restricting a token to a single room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoGrant {
    pub room: String,
}

/// Grants block of a Twilio access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrants {
    pub identity: String,
    pub video: VideoGrant,
}

/// Claims of a Twilio Video access token (HS256, `cty: twilio-fpa;v=1`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub jti: String,
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub grants: TokenGrants,
}

// ==============================================================================
// API REQUEST/RESPONSE MODELS
// ==============================================================================

/// Waiting-room mutation verbs accepted over the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WaitingRoomAction {
    #[serde(rename = "join-waiting")]
    JoinWaiting,
    #[serde(rename = "leave-waiting")]
    LeaveWaiting,
}

/// Body of `PUT /consultation/{appointment_id}/waiting-status`.
/// Exactly one of `action` or `status` must be present.
#[derive(Debug, Deserialize)]
pub struct UpdateWaitingStatusRequest {
    pub action: Option<WaitingRoomAction>,
    pub status: Option<WaitingRoomStatus>,
}

#[derive(Debug, Serialize)]
pub struct WaitingStatusResponse {
    #[serde(rename = "waitingRoomStatus")]
    pub waiting_room_status: WaitingRoomStatus,
    #[serde(rename = "sessionStartedAt")]
    pub session_started_at: Option<DateTime<Utc>>,
    #[serde(rename = "twilioRoomStatus")]
    pub twilio_room_status: Option<String>,
    #[serde(rename = "isClientWaiting")]
    pub is_client_waiting: bool,
    #[serde(rename = "isArtistWaiting")]
    pub is_artist_waiting: bool,
    #[serde(rename = "sessionActive")]
    pub session_active: bool,
}

impl From<&Consultation> for WaitingStatusResponse {
    fn from(consultation: &Consultation) -> Self {
        Self {
            waiting_room_status: consultation.waiting_room_status,
            session_started_at: consultation.session_started_at,
            twilio_room_status: consultation.twilio_room_status.clone(),
            is_client_waiting: consultation.is_client_waiting(),
            is_artist_waiting: consultation.is_artist_waiting(),
            session_active: consultation.session_active(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateWaitingStatusResponse {
    #[serde(rename = "waitingRoomStatus")]
    pub waiting_room_status: WaitingRoomStatus,
    #[serde(rename = "isClientWaiting")]
    pub is_client_waiting: bool,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub token: String,
    pub identity: String,
    #[serde(rename = "roomName")]
    pub room_name: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

// ==============================================================================
// ERROR HANDLING
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConsultationError {
    #[error("Consultation not found")]
    ConsultationNotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("User is not a party to this consultation")]
    NotParticipant,

    #[error("Only the artist can start the session")]
    NotSessionHost,

    #[error("Session already started")]
    AlreadyStarted,

    #[error("Consultation already ended")]
    AlreadyEnded,

    #[error("Twilio video is not configured")]
    NotConfigured,

    #[error("Twilio API error: {message}")]
    TwilioApiError { message: String },

    #[error("Database error: {message}")]
    DatabaseError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for ConsultationError {
    fn from(err: anyhow::Error) -> Self {
        ConsultationError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ConsultationError {
    fn from(err: reqwest::Error) -> Self {
        ConsultationError::TwilioApiError {
            message: err.to_string(),
        }
    }
}
