//! Session lifecycle for the robochat client.
//!
//! - [`Session`]: Session id plus the user and token it belongs to.
//! - [`SessionManager`]: Lazily acquires, invalidates and renews it.

/// Session acquisition and renewal.
pub mod manager;
/// The session value.
pub mod session;

pub use manager::SessionManager;
pub use session::Session;
