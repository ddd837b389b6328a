//! View state for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each view is a plain struct of local fields plus independent async action
//! handlers. A handler validates its inputs, issues at most one request
//! through [`ApiClient`](crate::net::ApiClient), and overwrites local state
//! with the result. Failures never escape a handler; they land in the view's
//! [`Feedback`] as display text.


pub mod admin;
pub mod conversations;
pub mod documents;
pub mod login;
pub mod search;
pub mod student;
pub mod teacher;

/// Busy flag plus the transient inline message shown after an action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Feedback {
    pub busy: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl Feedback {
    /// Enter an action: mark busy and clear the previous message.
    pub fn start(&mut self) {
        self.busy = true;
        self.error = None;
        self.notice = None;
    }

    pub fn fail(&mut self, message: impl ToString) {
        self.busy = false;
        self.error = Some(message.to_string());
    }

    pub fn finish(&mut self) {
        self.busy = false;
    }

    pub fn succeed(&mut self, notice: impl Into<String>) {
        self.busy = false;
        self.notice = Some(notice.into());
    }

    /// Record a validation failure without marking the view busy.
    pub fn reject(&mut self, message: &str) {
        self.busy = false;
        self.notice = None;
        self.error = Some(message.to_owned());
    }
}
