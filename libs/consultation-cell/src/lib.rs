// libs/consultation-cell/src/lib.rs
//! # Consultation Cell
//!
//! This cell coordinates the video consultation between a client and a makeup
//! artist: the shared waiting room, the session lifecycle, and the Twilio
//! access tokens participants use to join the room.
//!
//! ## Features
//!
//! - **Waiting Room**: Single-occupancy presence signal between the two
//!   parties, with the client's presence always winning
//! - **Session Lifecycle**: Artist-started, either-party-ended sessions with
//!   timestamps as the single source of truth
//! - **Twilio Access Tokens**: Short-lived room-scoped Video grants with
//!   role-namespaced identities
//! - **Access Control**: Only the appointment's client or artist may read or
//!   mutate consultation state
//!
//! ## Architecture
//!
//! The consultation cell follows the established cell architecture pattern:
//!
//! ```text
//! +-----------------------------------------------------+
//! |                Consultation Cell                    |
//! +-----------------------------------------------------+
//! |  handlers.rs    |  HTTP endpoint handlers           |
//! |  router.rs      |  Route definitions                |
//! |  models.rs      |  Data structures & DTOs           |
//! |  services/      |  Business logic layer             |
//! |    store.rs     |  Consultation record access       |
//! |    waiting_room.rs | Waiting-room transitions       |
//! |    lifecycle.rs |  Session start/end control        |
//! |    twilio.rs    |  Twilio Video REST + tokens       |
//! +-----------------------------------------------------+
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /consultation/{appointment_id}/waiting-status` - Read waiting state
//! - `PUT /consultation/{appointment_id}/waiting-status` - Join/leave waiting
//! - `POST /consultation/{appointment_id}/session/start` - Start the session
//! - `DELETE /consultation/{appointment_id}/session` - End the session
//! - `GET /consultation/{appointment_id}/token` - Mint a room access token
//! - `GET /consultation/health` - Health check
//!
//! ## Configuration
//!
//! Required environment variables:
//! - `TWILIO_ACCOUNT_SID` - Twilio account identifier
//! - `TWILIO_API_KEY_SID` / `TWILIO_API_KEY_SECRET` - API key for token signing
//! - `TWILIO_AUTH_TOKEN` - REST authentication for room control
//! - `TWILIO_VIDEO_BASE_URL` - API base URL (optional, defaults to production)

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

// Re-export commonly used types
pub use models::{
    Appointment, Consultation, ConsultationError, PartyRole, UpdateWaitingStatusRequest,
    UpdateWaitingStatusResponse, WaitingRoomAction, WaitingRoomStatus, WaitingStatusResponse,
};

pub use services::{
    ConsultationStore, SessionLifecycleService, TwilioVideoService, WaitingRoomService,
};

pub use router::consultation_routes;
