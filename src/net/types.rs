//! Wire DTOs for the CaseHub REST API.
//!
//! DESIGN
//! ======
//! These records mirror backend response shapes field for field. Anything the
//! backend may send as `null` or omit is an `Option` with `#[serde(default)]`
//! so list rendering never fails on a partially populated row.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::auth::Role;

/// Paginated list envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE, total: 0, items: Vec::new() }
    }
}

impl<T> Page<T> {
    /// Number of pages implied by `total` and `page_size` (at least 1).
    #[must_use]
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.page_size)).max(1)
    }
}

/// Backend default page size; the server rejects anything above 100.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

// =============================================================================
// AUTH
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub account: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRegisterRequest {
    pub student_no: String,
    pub password: String,
    pub class_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredStudent {
    pub role: Role,
    pub id: i64,
    pub student_no: String,
    #[serde(default)]
    pub name: Option<String>,
    pub class_id: i64,
    pub class_code: String,
    pub class_name: String,
}

// =============================================================================
// CONVERSATIONS
// =============================================================================

/// Sender of a stored message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    User,
    Assistant,
    System,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LastMessage {
    pub role: SenderRole,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Conversation list row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: i64,
    pub name: String,
    #[serde(default)]
    pub kb_id: Option<i64>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub top_n: Option<u32>,
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub show_citations: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_message: Option<LastMessage>,
}

/// Message as stored by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    pub id: i64,
    pub role: SenderRole,
    pub content: String,
    #[serde(default)]
    pub reference: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Conversation with settings and full message history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationDetail {
    pub conversation_id: i64,
    pub name: String,
    #[serde(default)]
    pub kb_id: Option<i64>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub top_n: Option<u32>,
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub show_citations: Option<bool>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub messages: Vec<ServerMessage>,
}

/// Body for `POST /conversations` (role and user id are added by the client).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewConversation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kb_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_citations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatedConversation {
    pub conversation_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kb_id: Option<i64>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub conversation_id: i64,
    pub user_message_id: i64,
    pub assistant_message_id: i64,
    pub assistant_answer: String,
    #[serde(default)]
    pub reference: Option<Value>,
}

/// Partial settings update; `None` fields are left unchanged server-side.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_citations: Option<bool>,
}

impl ConversationSettings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdatedSettings {
    pub conversation_id: i64,
    pub name: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub top_n: Option<u32>,
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub show_citations: Option<bool>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedConversation {
    pub conversation_id: i64,
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedConversation {
    pub conversation_id: i64,
    pub cleared: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedConversation {
    pub conversation_id: i64,
    pub deleted: bool,
}

/// Filters for `GET /conversations`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationQuery {
    pub class_id: Option<i64>,
    pub keyword: Option<String>,
    pub include_last_message: bool,
    pub page: u32,
    pub page_size: u32,
}

impl Default for ConversationQuery {
    fn default() -> Self {
        Self { class_id: None, keyword: None, include_last_message: true, page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

// =============================================================================
// AUDITS
// =============================================================================

/// Admin review outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approved" | "approve" => Ok(Self::Approved),
            "rejected" | "reject" => Ok(Self::Rejected),
            other => Err(format!("unknown decision: {other}")),
        }
    }
}

/// Document lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
    Embedded,
}

impl DocumentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Embedded => "embedded",
        }
    }
}

/// Row in the pending-review queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAudit {
    pub id: i64,
    pub kb_id: i64,
    pub original_name: String,
    #[serde(default)]
    pub uploader_student_id: Option<i64>,
    #[serde(default)]
    pub uploader_teacher_id: Option<i64>,
    #[serde(default)]
    pub uploader_admin_id: Option<i64>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

/// Row in the audit history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRow {
    pub audit_id: i64,
    pub document_id: i64,
    pub document_name: String,
    #[serde(default)]
    pub document_status: Option<DocumentStatus>,
    pub decision: Decision,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub decided_at: Option<String>,
    #[serde(default)]
    pub reviewer_admin_id: Option<i64>,
    #[serde(default)]
    pub reviewer_admin_name: Option<String>,
    #[serde(default)]
    pub kb_id: Option<i64>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

/// Filters for `GET /audits`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditQuery {
    pub class_code: Option<String>,
    pub decision: Option<Decision>,
    pub filename: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self { class_code: None, decision: None, filename: None, page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

/// Uploader identity attached to audit and document details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uploader {
    pub role: Role,
    pub id: i64,
    #[serde(default)]
    pub no: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDocument {
    pub document_id: i64,
    pub document_name: String,
    pub status: DocumentStatus,
    #[serde(default)]
    pub kb_id: Option<i64>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default)]
    pub content_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDetail {
    pub audit_id: i64,
    pub decision: Decision,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub decided_at: Option<String>,
    #[serde(default)]
    pub reviewer_admin_id: Option<i64>,
    #[serde(default)]
    pub reviewer_admin_name: Option<String>,
    pub document: AuditDocument,
    #[serde(default)]
    pub uploader: Option<Uploader>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDecisionResult {
    pub id: i64,
    pub status: DocumentStatus,
    pub decision: Decision,
}

// =============================================================================
// ADMIN REGISTRY
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherRow {
    pub id: i64,
    pub teacher_no: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRow {
    pub id: i64,
    pub student_no: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub status: Option<i32>,
}

/// Class row, shared by the admin registry and a teacher's class list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRow {
    pub class_id: i64,
    pub class_code: String,
    pub class_name: String,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub teacher_no: Option<String>,
    #[serde(default)]
    pub teacher_name: Option<String>,
    #[serde(default)]
    pub kb_id: Option<i64>,
    #[serde(default)]
    pub ragflow_dataset_id: Option<String>,
}

/// Create/update form for teacher and student accounts.
///
/// The account number is sent as `teacher_no` or `student_no` depending on
/// the target role; see [`UserForm::to_body`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserForm {
    pub account_no: String,
    pub name: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub class_code: Option<String>,
}

impl UserForm {
    /// JSON body for the given registry role.
    #[must_use]
    pub fn to_body(&self, role: Role) -> Value {
        let mut body = serde_json::Map::new();
        let no_key = match role {
            Role::Teacher => "teacher_no",
            Role::Student => "student_no",
            Role::Admin => "admin_no",
        };
        body.insert(no_key.to_owned(), Value::from(self.account_no.trim()));
        body.insert("name".to_owned(), Value::from(self.name.trim()));
        insert_trimmed(&mut body, "email", self.email.as_deref());
        insert_trimmed(&mut body, "password", self.password.as_deref());
        if role == Role::Student {
            insert_trimmed(&mut body, "class_code", self.class_code.as_deref());
        }
        Value::Object(body)
    }
}

fn insert_trimmed(body: &mut serde_json::Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        body.insert(key.to_owned(), Value::from(value));
    }
}

/// Create/update form for classes. Creating a class also provisions its
/// knowledge base, hence the embedding settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassForm {
    pub class_code: String,
    pub class_name: String,
    pub teacher_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub chunk_method: String,
}

impl Default for ClassForm {
    fn default() -> Self {
        Self {
            class_code: String::new(),
            class_name: String::new(),
            teacher_no: String::new(),
            embedding_model: None,
            description: None,
            chunk_method: DEFAULT_CHUNK_METHOD.to_owned(),
        }
    }
}

pub const DEFAULT_CHUNK_METHOD: &str = "table";

/// Generic `{ "deleted": true }` acknowledgement with whatever id key the
/// endpoint echoes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    #[serde(default)]
    pub deleted: bool,
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Document list row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRow {
    pub document_id: i64,
    pub document_name: String,
    pub status: DocumentStatus,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default)]
    pub ragflow_document_id: Option<String>,
    #[serde(default)]
    pub kb_id: Option<i64>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub uploader_student_id: Option<i64>,
    #[serde(default)]
    pub uploader_teacher_id: Option<i64>,
    #[serde(default)]
    pub uploader_admin_id: Option<i64>,
}

/// Filters for `GET /documents`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentQuery {
    pub class_id: Option<i64>,
    pub statuses: Vec<DocumentStatus>,
    pub filename: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for DocumentQuery {
    fn default() -> Self {
        Self { class_id: None, statuses: Vec::new(), filename: None, page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

impl DocumentQuery {
    /// Comma-joined status filter, `None` when the server default applies.
    #[must_use]
    pub fn status_param(&self) -> Option<String> {
        if self.statuses.is_empty() {
            return None;
        }
        Some(
            self.statuses
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAuditEntry {
    pub id: i64,
    pub decision: Decision,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub decided_at: Option<String>,
    #[serde(default)]
    pub reviewer_admin_id: Option<i64>,
    #[serde(default)]
    pub reviewer_admin_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingTaskEntry {
    pub id: i64,
    pub status: String,
    #[serde(default)]
    pub chunk_method: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Document detail with review and embedding history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub document_id: i64,
    pub document_name: String,
    pub status: DocumentStatus,
    #[serde(default)]
    pub kb_id: Option<i64>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub uploader: Option<Uploader>,
    #[serde(default)]
    pub audits: Vec<DocumentAuditEntry>,
    #[serde(default)]
    pub embedding_tasks: Vec<EmbeddingTaskEntry>,
    #[serde(default)]
    pub content_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub id: i64,
    pub kb_id: i64,
    pub status: DocumentStatus,
    pub filename: String,
    #[serde(default)]
    pub content_duplicate: bool,
    #[serde(default)]
    pub duplicate_document_id: Option<i64>,
    #[serde(default)]
    pub duplicate_document_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedDocument {
    pub document_id: i64,
    pub document_name: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedDocument {
    pub document_id: i64,
    pub deleted: bool,
}

/// Raw document bytes for preview or download.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentContent {
    pub content_type: Option<String>,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Body for `POST /documents/search` (role and user id are added by the client).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentSearch {
    pub filename: String,
    pub class_id: Option<i64>,
    pub include_pending: bool,
    pub include_rejected: bool,
}

// =============================================================================
// EMBEDDING / SEARCH
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingRun {
    pub task_id: i64,
    pub document_id: i64,
    #[serde(default)]
    pub ragflow_document_id: Option<String>,
    pub status: String,
}

/// Retrieval query (role and user id are added by the client).
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub class_id: Option<i64>,
    pub top_k: u32,
    pub similarity_threshold: Option<f64>,
    pub highlight: bool,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self { query: String::new(), class_id: None, top_k: DEFAULT_TOP_K, similarity_threshold: None, highlight: true }
    }
}

pub const DEFAULT_TOP_K: u32 = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchChunk {
    pub rank: u32,
    pub content: String,
    #[serde(default)]
    pub highlight: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub chunk_id: Option<String>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub ragflow_document_id: Option<String>,
    #[serde(default)]
    pub document_name: Option<String>,
    #[serde(default)]
    pub document_id: Option<i64>,
    #[serde(default)]
    pub kb_id: Option<i64>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub kb_id: i64,
    pub result_count: u32,
    #[serde(default)]
    pub chunks: Vec<SearchChunk>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLogRow {
    pub log_id: i64,
    pub query: String,
    #[serde(default)]
    pub result_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_role: Option<Role>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub kb_id: Option<i64>,
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub class_code: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

/// Filters shared by `GET /search/logs` and `GET /search/stats`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchLogQuery {
    pub class_id: Option<i64>,
    pub query: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCount {
    pub query: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    #[serde(default)]
    pub date: Option<String>,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub total_searches: u64,
    pub unique_teacher_count: u64,
    pub unique_student_count: u64,
    #[serde(default)]
    pub top_queries: Vec<QueryCount>,
    #[serde(default)]
    pub daily: Vec<DailyCount>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CasePreview {
    pub kb_id: i64,
    #[serde(default)]
    pub class_id: Option<i64>,
    pub document_id: i64,
    pub document_name: String,
    pub ragflow_document_id: String,
    pub chunk_id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub highlight: Option<String>,
    #[serde(default)]
    pub location: Option<Value>,
}
