// libs/consultation-cell/src/services/mod.rs

pub mod lifecycle;
pub mod store;
pub mod twilio;
pub mod waiting_room;

pub use lifecycle::SessionLifecycleService;
pub use store::ConsultationStore;
pub use twilio::TwilioVideoService;
pub use waiting_room::WaitingRoomService;
