// libs/twilio-webhook-cell/src/lib.rs
//! # Twilio Webhook Cell
//!
//! Receives Twilio Video status callbacks and reconciles them into the
//! consultation record. Twilio delivers callbacks with no ordering or
//! delivery guarantees, so every event is folded idempotently: each one
//! overwrites the fields it owns and duplicates converge on the same
//! stored state.
//!
//! ## Features
//!
//! - Room lifecycle tracking (room-created, room-ended)
//! - Participant presence reconciliation for the waiting room
//! - Recording metadata capture (recording-started)
//! - Fail-open acknowledgement for rooms with no matching record
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Twilio Webhook Cell         │
//! ├─────────────────────────────────────┤
//! │  Handlers (HTTP endpoints)          │
//! │  ├── status_callback                │
//! │  └── status_callback_probe          │
//! ├─────────────────────────────────────┤
//! │  Services (business logic)          │
//! │  └── StatusCallbackService          │
//! ├─────────────────────────────────────┤
//! │  Models (webhook payloads)          │
//! │  ├── StatusCallback                 │
//! │  ├── ReconcileOutcome               │
//! │  └── WebhookError                   │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## API Endpoints
//!
//! - `POST /status-callback` - Receive a Twilio room status callback
//! - `GET /status-callback` - Endpoint probe for webhook configuration
//!
//! ## Configuration
//!
//! Callbacks carry no user session, so record access uses the Supabase
//! service role key:
//!
//! - `SUPABASE_URL` - Supabase project URL
//! - `SUPABASE_SERVICE_ROLE_KEY` - Service role key for record writes

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

// Re-export main types for easier access
pub use models::{ReconcileOutcome, RoomLookup, StatusCallback, WebhookError};
pub use router::webhook_routes;
pub use services::StatusCallbackService;
