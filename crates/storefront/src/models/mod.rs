//! Session-backed visitor models.

pub mod session;

pub use session::{CustomerSession, SessionError, keys};
