//! # casehub
//!
//! Client library for the CaseHub workbenches: admins review uploaded case
//! documents, teachers curate class knowledge bases, and students chat with
//! and search those knowledge bases.
//!
//! The crate owns the contract between the role views and the REST backend:
//! the persisted auth session, the HTTP wrapper and its error semantics, the
//! typed endpoint client, view state with its action handlers, and the route
//! guard. The `casehub` binary exposes the same pieces on the command line.

pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;
