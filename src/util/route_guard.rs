//! Navigation guard driven by the stored session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Evaluated on every navigation. Two observable states: authenticated with a
//! role, or unauthenticated. There is no terminal state.

#[cfg(test)]
#[path = "route_guard_test.rs"]
mod route_guard_test;

use crate::state::auth::{AuthState, Role};

pub const LOGIN_PATH: &str = "/login";

/// Redirect target for navigating to `path`, or `None` to allow it.
///
/// Rules:
/// - `/login` while authenticated goes to the session's home.
/// - `/` goes to the session's home, or `/login` when unauthenticated.
/// - A role workbench (`/admin`, `/teacher`, `/student` and subpaths) requires
///   a session, and one whose role matches.
/// - Anything else is allowed.
#[must_use]
pub fn guard(path: &str, session: Option<&AuthState>) -> Option<String> {
    let path = normalize(path);

    if path == LOGIN_PATH {
        return session.map(|s| s.role.home_path());
    }
    if path == "/" {
        return Some(session.map_or_else(|| LOGIN_PATH.to_owned(), |s| s.role.home_path()));
    }

    let required = required_role(&path)?;
    match session {
        None => Some(LOGIN_PATH.to_owned()),
        Some(s) if s.role != required => Some(s.role.home_path()),
        Some(_) => None,
    }
}

/// Final path after following [`guard`] redirects.
#[must_use]
pub fn resolve(path: &str, session: Option<&AuthState>) -> String {
    let mut current = normalize(path);
    // Each rule lands on a path that the next evaluation allows, so two hops suffice.
    for _ in 0..2 {
        match guard(&current, session) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// Role that owns `path`, if it is a role workbench route.
#[must_use]
pub fn required_role(path: &str) -> Option<Role> {
    let path = normalize(path);
    let first = path.trim_start_matches('/').split('/').next()?;
    Role::ALL.into_iter().find(|role| role.as_str() == first)
}

fn normalize(path: &str) -> String {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}
