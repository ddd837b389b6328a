//! Client-side state shared across views.
//!
//! DESIGN
//! ======
//! `auth` defines the session identity; `session_store` persists it. Views
//! read the session but only login/logout write it.

pub mod auth;
pub mod session_store;

pub use auth::{AuthState, Role};
pub use session_store::{FileSessionStore, MemorySessionStore, SessionError, SessionStore};
