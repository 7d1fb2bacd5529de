// libs/twilio-webhook-cell/src/services/mod.rs
pub mod reconciler;

pub use reconciler::StatusCallbackService;
