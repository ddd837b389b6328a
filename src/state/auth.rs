//! Auth-session identity for the signed-in user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the route guard and every role view to scope API calls. The record
//! is whatever the login endpoint returned; nothing here validates it.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use serde::{Deserialize, Serialize};

/// Workbench role. Serialized lowercase, matching the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub const ALL: [Self; 3] = [Self::Admin, Self::Teacher, Self::Student];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }

    /// Landing route for this role, e.g. `/teacher`.
    #[must_use]
    pub fn home_path(self) -> String {
        format!("/{}", self.as_str())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Signed-in identity as returned by `POST /auth/{role}/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub role: Role,
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_no: Option<String>,
}

impl AuthState {
    /// Role-specific account number (`admin_no`, `teacher_no` or `student_no`).
    #[must_use]
    pub fn account_no(&self) -> Option<&str> {
        match self.role {
            Role::Admin => self.admin_no.as_deref(),
            Role::Teacher => self.teacher_no.as_deref(),
            Role::Student => self.student_no.as_deref(),
        }
    }

    /// Name for greetings, falling back to the account number.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.account_no())
            .map_or_else(|| format!("{} #{}", self.role, self.id), ToOwned::to_owned)
    }
}
