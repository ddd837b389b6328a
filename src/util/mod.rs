//! Utility helpers shared across views and the CLI.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules keep navigation and input rules out of view state so they
//! stay pure and testable.

pub mod route_guard;
pub mod validate;
