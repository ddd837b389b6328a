//! Admin workbench: document review and the account/class registry.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every admin endpoint is scoped by `admin_id`, taken from the session. A
//! review decision refreshes the pending queue so the decided document drops
//! out of it.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use serde::de::DeserializeOwned;

use super::Feedback;
use super::documents::DocumentsPanel;
use crate::net::types::{
    AuditDetail, AuditQuery, AuditRow, ClassForm, ClassRow, Decision, PendingAudit, StudentRow, TeacherRow, UserForm,
};
use crate::net::{ApiClient, ApiError, Registry};
use crate::state::auth::{AuthState, Role};
use crate::util::validate::{optional, required};

/// Validate an account form for `role` (teacher or student).
///
/// Passwords are required on create and optional on update.
///
/// # Errors
///
/// Returns a display message for the first missing required field.
pub fn validate_user_form(form: &UserForm, role: Role, creating: bool) -> Result<(), &'static str> {
    let no_message = match role {
        Role::Student => "Enter a student number.",
        _ => "Enter a teacher number.",
    };
    required(&form.account_no, no_message)?;
    required(&form.name, "Enter a name.")?;
    if creating && optional(form.password.as_deref().unwrap_or_default()).is_none() {
        return Err("Enter an initial password.");
    }
    if role == Role::Student && optional(form.class_code.as_deref().unwrap_or_default()).is_none() {
        return Err("Enter a class code.");
    }
    Ok(())
}

/// Validate a class form. Creating a class also provisions a knowledge base,
/// which needs an embedding model.
///
/// # Errors
///
/// Returns a display message for the first missing required field.
pub fn validate_class_form(form: &ClassForm, creating: bool) -> Result<(), &'static str> {
    required(&form.class_code, "Enter a class code.")?;
    required(&form.class_name, "Enter a class name.")?;
    required(&form.teacher_no, "Enter the teacher number.")?;
    if creating && optional(form.embedding_model.as_deref().unwrap_or_default()).is_none() {
        return Err("Enter an embedding model.");
    }
    Ok(())
}

/// Trimmed request body for a class form; blank optionals are dropped.
///
/// # Errors
///
/// Returns [`ApiError::Encode`] if the form cannot be serialized.
pub fn class_body(form: &ClassForm) -> Result<serde_json::Value, ApiError> {
    let trimmed = ClassForm {
        class_code: form.class_code.trim().to_owned(),
        class_name: form.class_name.trim().to_owned(),
        teacher_no: form.teacher_no.trim().to_owned(),
        embedding_model: form.embedding_model.as_deref().and_then(optional),
        description: form.description.as_deref().and_then(optional),
        chunk_method: form.chunk_method.trim().to_owned(),
    };
    serde_json::to_value(trimmed).map_err(|e| ApiError::Encode(e.to_string()))
}

pub struct AdminView {
    pub pending: Vec<PendingAudit>,
    pub pending_class_code: String,
    pub audits: Vec<AuditRow>,
    pub audits_total: u64,
    pub audit_query: AuditQuery,
    pub audit_detail: Option<AuditDetail>,
    pub decision_reason: String,
    pub teachers: Vec<TeacherRow>,
    pub students: Vec<StudentRow>,
    pub classes: Vec<ClassRow>,
    pub user_form: UserForm,
    pub class_form: ClassForm,
    pub documents: DocumentsPanel,
    pub feedback: Feedback,
    api: ApiClient,
    session: AuthState,
}

impl AdminView {
    pub fn new(api: ApiClient, session: AuthState) -> Self {
        Self {
            pending: Vec::new(),
            pending_class_code: String::new(),
            audits: Vec::new(),
            audits_total: 0,
            audit_query: AuditQuery::default(),
            audit_detail: None,
            decision_reason: String::new(),
            teachers: Vec::new(),
            students: Vec::new(),
            classes: Vec::new(),
            user_form: UserForm::default(),
            class_form: ClassForm::default(),
            documents: DocumentsPanel::new(api.clone(), session.clone()),
            feedback: Feedback::default(),
            api,
            session,
        }
    }

    // =========================================================================
    // REVIEW
    // =========================================================================

    pub async fn load_pending(&mut self) {
        let class_code = optional(&self.pending_class_code);
        self.feedback.start();
        match self.api.list_pending_audits(class_code.as_deref()).await {
            Ok(rows) => {
                self.pending = rows;
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    pub async fn load_audits(&mut self) {
        self.feedback.start();
        match self.api.list_audits(&self.session, &self.audit_query).await {
            Ok(page) => {
                self.audits_total = page.total;
                self.audits = page.items;
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    pub async fn open_audit(&mut self, audit_id: i64) {
        self.feedback.start();
        match self.api.get_audit(&self.session, audit_id).await {
            Ok(detail) => {
                self.audit_detail = Some(detail);
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    /// Approve or reject `document_id`, then refresh the pending queue.
    /// Rejections need a reason.
    pub async fn decide(&mut self, document_id: i64, decision: Decision) {
        let reason = optional(&self.decision_reason);
        if decision == Decision::Rejected && reason.is_none() {
            self.feedback.reject("Enter a reason for rejection.");
            return;
        }

        self.feedback.start();
        let result = self
            .api
            .decide_audit(&self.session, document_id, decision, reason.as_deref())
            .await;
        match result {
            Ok(outcome) => {
                tracing::info!(document_id, decision = decision.as_str(), "audit decided");
                self.decision_reason.clear();
                self.load_pending().await;
                if self.feedback.error.is_none() {
                    self.feedback
                        .succeed(format!("Document {} {}.", outcome.id, outcome.decision.as_str()));
                }
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    // =========================================================================
    // REGISTRY
    // =========================================================================

    pub async fn load_teachers(&mut self) {
        if let Some(rows) = self.fetch_registry(Registry::Teachers).await {
            self.teachers = rows;
        }
    }

    pub async fn load_students(&mut self) {
        if let Some(rows) = self.fetch_registry(Registry::Students).await {
            self.students = rows;
        }
    }

    pub async fn load_classes(&mut self) {
        if let Some(rows) = self.fetch_registry(Registry::Classes).await {
            self.classes = rows;
        }
    }

    /// Create (`id == None`) or update a teacher or student from `user_form`,
    /// then refresh that list.
    pub async fn save_user(&mut self, role: Role, id: Option<i64>) {
        let registry = match role {
            Role::Teacher => Registry::Teachers,
            Role::Student => Registry::Students,
            Role::Admin => {
                self.feedback.reject("Admin accounts are not managed here.");
                return;
            }
        };
        if let Err(message) = validate_user_form(&self.user_form, role, id.is_none()) {
            self.feedback.reject(message);
            return;
        }
        let body = self.user_form.to_body(role);
        if self.save_entry(registry, id, &body).await {
            self.user_form = UserForm::default();
            self.reload(registry).await;
            self.finish_save(id, "Account");
        }
    }

    /// Create (`id == None`) or update a class from `class_form`, then refresh.
    pub async fn save_class(&mut self, id: Option<i64>) {
        if let Err(message) = validate_class_form(&self.class_form, id.is_none()) {
            self.feedback.reject(message);
            return;
        }
        let body = match class_body(&self.class_form) {
            Ok(body) => body,
            Err(e) => {
                self.feedback.fail(e);
                return;
            }
        };
        if self.save_entry(Registry::Classes, id, &body).await {
            self.class_form = ClassForm::default();
            self.reload(Registry::Classes).await;
            self.finish_save(id, "Class");
        }
    }

    pub async fn delete_entry(&mut self, registry: Registry, id: i64) {
        self.feedback.start();
        match self.api.delete_registry_entry(&self.session, registry, id).await {
            Ok(_) => {
                self.reload(registry).await;
                if self.feedback.error.is_none() {
                    self.feedback.succeed("Deleted.");
                }
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    async fn fetch_registry<T: DeserializeOwned>(&mut self, registry: Registry) -> Option<Vec<T>> {
        self.feedback.start();
        match self.api.list_registry(&self.session, registry).await {
            Ok(rows) => {
                self.feedback.finish();
                Some(rows)
            }
            Err(e) => {
                self.feedback.fail(e);
                None
            }
        }
    }

    async fn save_entry(&mut self, registry: Registry, id: Option<i64>, body: &serde_json::Value) -> bool {
        self.feedback.start();
        let result: Result<serde_json::Value, ApiError> = match id {
            Some(id) => {
                self.api
                    .update_registry_entry(&self.session, registry, id, body)
                    .await
            }
            None => {
                self.api
                    .create_registry_entry(&self.session, registry, body)
                    .await
            }
        };
        match result {
            Ok(_) => true,
            Err(e) => {
                self.feedback.fail(e);
                false
            }
        }
    }

    async fn reload(&mut self, registry: Registry) {
        match registry {
            Registry::Teachers => self.load_teachers().await,
            Registry::Students => self.load_students().await,
            Registry::Classes => self.load_classes().await,
        }
    }

    fn finish_save(&mut self, id: Option<i64>, what: &str) {
        if self.feedback.error.is_some() {
            return;
        }
        let verb = if id.is_some() { "updated" } else { "created" };
        self.feedback.succeed(format!("{what} {verb}."));
    }
}
