//! Session ownership: who is logged in, with which token

mod state;
mod store;

pub use state::{SessionSnapshot, SessionStatus};
pub use store::{ListenerId, SessionStore};
