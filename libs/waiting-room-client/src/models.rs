// libs/waiting-room-client/src/models.rs
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Waiting status as the coordinator reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct WaitingStatus {
    #[serde(rename = "waitingRoomStatus")]
    pub waiting_room_status: String,
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

/// State a poller waits for. The two views of the waiting room watch for
/// different things: the client waits for the session to go live, the
/// artist waits for the client to show up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitingTrigger {
    /// Fire when the artist has started the session.
    SessionActive,
    /// Fire when the client is marked waiting.
    ClientWaiting,
}

impl WaitingTrigger {
    pub fn matches(&self, status: &WaitingStatus) -> bool {
        match self {
            WaitingTrigger::SessionActive => status.session_active,
            WaitingTrigger::ClientWaiting => status.is_client_waiting,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },
}
