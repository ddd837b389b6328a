//! Login screen: role sign-in, student self-registration, logout.
//!
//! SYSTEM CONTEXT
//! ==============
//! The only writer of the session store. A successful sign-in persists the
//! returned identity and hands back the role's home route for navigation.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use std::sync::Arc;

use super::Feedback;
use crate::net::ApiClient;
use crate::net::types::StudentRegisterRequest;
use crate::state::auth::Role;
use crate::state::session_store::{SessionError, SessionStore};
use crate::util::route_guard::LOGIN_PATH;
use crate::util::validate::{optional, required};

/// Student self-registration form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub student_no: String,
    pub password: String,
    pub class_code: String,
    pub name: String,
}

pub struct LoginView {
    pub role: Role,
    pub account: String,
    pub password: String,
    pub register: RegisterForm,
    pub feedback: Feedback,
    api: ApiClient,
    store: Arc<dyn SessionStore>,
}

/// Validate sign-in fields, returning trimmed account and raw password.
///
/// # Errors
///
/// Returns a display message when either field is blank.
pub fn validate_login_input(account: &str, password: &str) -> Result<(String, String), &'static str> {
    let account = required(account, "Enter your account and password.")?;
    if password.trim().is_empty() {
        return Err("Enter your account and password.");
    }
    Ok((account, password.to_owned()))
}

/// Validate the registration form into a request body.
///
/// # Errors
///
/// Returns a display message for the first missing required field.
pub fn validate_register_input(form: &RegisterForm) -> Result<StudentRegisterRequest, &'static str> {
    let student_no = required(&form.student_no, "Enter a student number.")?;
    if form.password.trim().is_empty() {
        return Err("Enter a password.");
    }
    let class_code = required(&form.class_code, "Enter a class code.")?;
    Ok(StudentRegisterRequest {
        student_no,
        password: form.password.clone(),
        class_code,
        name: optional(&form.name),
    })
}

impl LoginView {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self {
            role: Role::Student,
            account: String::new(),
            password: String::new(),
            register: RegisterForm::default(),
            feedback: Feedback::default(),
            api,
            store,
        }
    }

    /// Sign in with the current fields.
    ///
    /// Returns the navigation target (`/{role}`) on success; `None` leaves the
    /// view on the login screen with `feedback.error` set.
    pub async fn submit(&mut self) -> Option<String> {
        if self.feedback.busy {
            return None;
        }
        let (account, password) = match validate_login_input(&self.account, &self.password) {
            Ok(v) => v,
            Err(message) => {
                self.feedback.reject(message);
                return None;
            }
        };

        self.feedback.start();
        let session = match self.api.login(self.role, &account, &password).await {
            Ok(session) => session,
            Err(e) => {
                self.feedback.fail(e);
                return None;
            }
        };
        if let Err(e) = self.store.set(&session) {
            self.feedback.fail(e);
            return None;
        }

        tracing::info!(role = %session.role, id = session.id, "signed in");
        self.password.clear();
        self.feedback.finish();
        Some(session.role.home_path())
    }

    /// Register a student account, then pre-fill the sign-in form with it.
    pub async fn submit_register(&mut self) {
        if self.feedback.busy {
            return;
        }
        let request = match validate_register_input(&self.register) {
            Ok(request) => request,
            Err(message) => {
                self.feedback.reject(message);
                return;
            }
        };

        self.feedback.start();
        match self.api.register_student(&request).await {
            Ok(student) => {
                tracing::info!(id = student.id, class_code = %student.class_code, "student registered");
                self.role = Role::Student;
                self.account = student.student_no;
                self.password.clear();
                self.register = RegisterForm::default();
                self.feedback.succeed(format!("Registered in {}. Sign in to continue.", student.class_name));
            }
            Err(e) => self.feedback.fail(e),
        }
    }
}

/// Clear the stored session and return the login route.
///
/// # Errors
///
/// Returns a [`SessionError`] if the store cannot be cleared.
pub fn logout(store: &dyn SessionStore) -> Result<String, SessionError> {
    store.clear()?;
    tracing::info!("signed out");
    Ok(LOGIN_PATH.to_owned())
}
