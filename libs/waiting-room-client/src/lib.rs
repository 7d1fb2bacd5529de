// libs/waiting-room-client/src/lib.rs
//! # Waiting Room Client
//!
//! Consumer side of the consultation waiting room. Native waiting views
//! embed this crate to poll the coordinator on a fixed cadence and react
//! once when the state they are waiting for arrives.
//!
//! ## Features
//!
//! - **Status Polling**: Fixed 3-second cadence against the waiting-status
//!   endpoint, no backoff, no adaptive timing
//! - **Once-Only Transition**: The first poll observing the trigger fires
//!   the callback exactly once, guarded against double delivery
//! - **Resilient Polling**: Transient request failures are logged and the
//!   cadence continues
//! - **Cleanup**: Dropping or stopping the poller aborts the timer task
//!
//! ## Usage
//!
//! ```no_run
//! use uuid::Uuid;
//! use waiting_room_client::{StatusClient, WaitingRoomPoller, WaitingTrigger};
//!
//! # async fn example() {
//! let client = StatusClient::new("https://api.velora.app", "user-jwt");
//! let appointment_id = Uuid::new_v4();
//!
//! // Client view: wait for the artist to start the session
//! let poller = WaitingRoomPoller::spawn(
//!     client,
//!     appointment_id,
//!     WaitingTrigger::SessionActive,
//!     |status| {
//!         println!("session live, room {:?}", status.twilio_room_status);
//!     },
//! );
//!
//! // ... later, leaving the waiting view
//! poller.stop();
//! # }
//! ```

pub mod client;
pub mod models;
pub mod poller;

// Re-export main types for easier access
pub use client::StatusClient;
pub use models::{ClientError, WaitingStatus, WaitingTrigger};
pub use poller::{WaitingRoomPoller, POLL_INTERVAL};
