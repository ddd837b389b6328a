//! Typed client for the CaseHub REST API.
//!
//! Every method builds one [`ApiRequest`], hands it to the configured
//! [`Transport`], and decodes the JSON reply. Status handling is centralized
//! in [`ApiClient::call_bytes`]: any non-2xx response becomes
//! [`ApiError::RequestFailed`] carrying the server's message.
//!
//! AUTHORIZATION SCOPING
//! =====================
//! The backend trusts `role` + `user_id` (or `admin_id` / `teacher_id`) fields
//! instead of a token, so most methods take the signed-in [`AuthState`] and
//! add those fields to the query string or JSON body.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use super::error::{ApiError, error_message};
use super::http::{ApiRequest, ApiResponse, HttpTransport, Transport, UploadForm, disposition_file_name};
use super::types::*;
use crate::config::ClientConfig;
use crate::state::auth::{AuthState, Role};

fn login_endpoint(role: Role) -> String {
    format!("/auth/{role}/login")
}

fn conversation_endpoint(conversation_id: i64) -> String {
    format!("/conversations/{conversation_id}")
}

fn document_endpoint(document_id: i64) -> String {
    format!("/documents/{document_id}")
}

/// Admin-managed registries under `/admin/*`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registry {
    Teachers,
    Students,
    Classes,
}

impl Registry {
    fn endpoint(self) -> &'static str {
        match self {
            Self::Teachers => "/admin/teachers",
            Self::Students => "/admin/students",
            Self::Classes => "/admin/classes",
        }
    }

    fn item_endpoint(self, id: i64) -> String {
        format!("{}/{id}", self.endpoint())
    }
}

/// Attach `role` and `user_id` to a JSON object body.
fn scoped_body<T: Serialize + ?Sized>(session: &AuthState, payload: &T) -> Result<Value, ApiError> {
    let mut body = match serde_json::to_value(payload).map_err(|e| ApiError::Encode(e.to_string()))? {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => return Err(ApiError::Encode(format!("expected JSON object body, got {other}"))),
    };
    body.insert("role".to_owned(), Value::from(session.role.as_str()));
    body.insert("user_id".to_owned(), Value::from(session.id));
    Ok(Value::Object(body))
}

fn scoped_get(path: impl Into<String>, session: &AuthState) -> ApiRequest {
    ApiRequest::get(path)
        .query("role", session.role)
        .query("user_id", session.id)
}

/// Cheap-to-clone handle over a shared transport.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Client over [`HttpTransport`] for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config.api_base)?;
        Ok(Self::new(Arc::new(transport)))
    }

    // =========================================================================
    // CORE
    // =========================================================================

    /// Send `request` and return the raw response when it is a 2xx.
    ///
    /// # Errors
    ///
    /// Propagates transport failures; maps non-2xx statuses to
    /// [`ApiError::RequestFailed`] with the server-supplied message.
    pub async fn call_bytes(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let method = request.method.clone();
        let path = request.path.clone();
        tracing::debug!(%method, %path, "api request");

        let response = self.transport.send(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let message = error_message(response.status, &response.body);
        tracing::warn!(%method, %path, status = response.status, %message, "api request failed");
        Err(ApiError::RequestFailed { status: response.status, message })
    }

    /// Send `request` and decode a 2xx JSON body into `T`.
    ///
    /// An empty success body decodes as JSON `null`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::call_bytes`]; additionally returns [`ApiError::Decode`]
    /// when the body does not match `T`.
    pub async fn call_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.call_bytes(request).await?;
        let body: &[u8] = if response.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &response.body
        };
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn health(&self) -> Result<Value, ApiError> {
        self.call_json(ApiRequest::get("/health")).await
    }

    /// `POST /auth/{role}/login`.
    ///
    /// # Errors
    ///
    /// Returns the server's message (e.g. wrong credentials, disabled account).
    pub async fn login(&self, role: Role, account: &str, password: &str) -> Result<AuthState, ApiError> {
        let body = LoginRequest { account: account.to_owned(), password: password.to_owned() };
        self.call_json(ApiRequest::post(login_endpoint(role)).json(&body)?)
            .await
    }

    /// `POST /auth/student/register`.
    ///
    /// # Errors
    ///
    /// Returns the server's message (unknown class code, duplicate student number).
    pub async fn register_student(&self, request: &StudentRegisterRequest) -> Result<RegisteredStudent, ApiError> {
        self.call_json(ApiRequest::post("/auth/student/register").json(request)?)
            .await
    }

    // =========================================================================
    // CONVERSATIONS
    // =========================================================================

    /// `GET /conversations`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn list_conversations(
        &self,
        session: &AuthState,
        query: &ConversationQuery,
    ) -> Result<Page<ConversationSummary>, ApiError> {
        let request = scoped_get("/conversations", session)
            .query_opt("class_id", query.class_id)
            .query_opt("keyword", query.keyword.as_deref())
            .query("include_last_message", query.include_last_message)
            .query("page", query.page)
            .query("page_size", query.page_size);
        self.call_json(request).await
    }

    /// `POST /conversations`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn create_conversation(
        &self,
        session: &AuthState,
        new: &NewConversation,
    ) -> Result<CreatedConversation, ApiError> {
        let body = scoped_body(session, new)?;
        self.call_json(ApiRequest::post("/conversations").json(&body)?)
            .await
    }

    /// `GET /conversations/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn get_conversation(&self, session: &AuthState, conversation_id: i64) -> Result<ConversationDetail, ApiError> {
        self.call_json(scoped_get(conversation_endpoint(conversation_id), session))
            .await
    }

    /// `PUT /conversations/{id}/rename`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn rename_conversation(
        &self,
        session: &AuthState,
        conversation_id: i64,
        new_name: &str,
    ) -> Result<RenamedConversation, ApiError> {
        let body = scoped_body(session, &json!({ "new_name": new_name }))?;
        let path = format!("{}/rename", conversation_endpoint(conversation_id));
        self.call_json(ApiRequest::put(path).json(&body)?).await
    }

    /// `POST /conversations/{id}/clear`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn clear_conversation(&self, session: &AuthState, conversation_id: i64) -> Result<ClearedConversation, ApiError> {
        let body = scoped_body(session, &Value::Null)?;
        let path = format!("{}/clear", conversation_endpoint(conversation_id));
        self.call_json(ApiRequest::post(path).json(&body)?).await
    }

    /// `DELETE /conversations/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn delete_conversation(&self, session: &AuthState, conversation_id: i64) -> Result<DeletedConversation, ApiError> {
        let body = scoped_body(session, &Value::Null)?;
        self.call_json(ApiRequest::delete(conversation_endpoint(conversation_id)).json(&body)?)
            .await
    }

    /// `POST /conversations/{id}/messages`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn send_message(
        &self,
        session: &AuthState,
        conversation_id: i64,
        content: &str,
    ) -> Result<SendMessageResponse, ApiError> {
        let body = scoped_body(session, &json!({ "content": content }))?;
        let path = format!("{}/messages", conversation_endpoint(conversation_id));
        self.call_json(ApiRequest::post(path).json(&body)?).await
    }

    /// `PUT /conversations/{id}/settings`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn update_conversation_settings(
        &self,
        session: &AuthState,
        conversation_id: i64,
        settings: &ConversationSettings,
    ) -> Result<UpdatedSettings, ApiError> {
        let body = scoped_body(session, settings)?;
        let path = format!("{}/settings", conversation_endpoint(conversation_id));
        self.call_json(ApiRequest::put(path).json(&body)?).await
    }

    // =========================================================================
    // AUDITS
    // =========================================================================

    /// `GET /audits/pending`, optionally narrowed to one class.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn list_pending_audits(&self, class_code: Option<&str>) -> Result<Vec<PendingAudit>, ApiError> {
        self.call_json(ApiRequest::get("/audits/pending").query_opt("class_code", class_code))
            .await
    }

    /// `GET /audits` (admin only).
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn list_audits(&self, session: &AuthState, query: &AuditQuery) -> Result<Page<AuditRow>, ApiError> {
        let request = ApiRequest::get("/audits")
            .query("admin_id", session.id)
            .query_opt("class_code", query.class_code.as_deref())
            .query_opt("decision", query.decision.map(Decision::as_str))
            .query_opt("filename", query.filename.as_deref())
            .query("page", query.page)
            .query("page_size", query.page_size);
        self.call_json(request).await
    }

    /// `GET /audits/{id}` (admin only).
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn get_audit(&self, session: &AuthState, audit_id: i64) -> Result<AuditDetail, ApiError> {
        let request = ApiRequest::get(format!("/audits/{audit_id}")).query("admin_id", session.id);
        self.call_json(request).await
    }

    /// `POST /audits/{document_id}/decision`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn decide_audit(
        &self,
        session: &AuthState,
        document_id: i64,
        decision: Decision,
        reason: Option<&str>,
    ) -> Result<AuditDecisionResult, ApiError> {
        let mut body = json!({ "reviewer_admin_id": session.id, "decision": decision });
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            body["reason"] = Value::from(reason);
        }
        let path = format!("/audits/{document_id}/decision");
        self.call_json(ApiRequest::post(path).json(&body)?).await
    }

    // =========================================================================
    // ADMIN REGISTRY
    // =========================================================================

    /// `GET /admin/{registry}`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn list_registry<T: DeserializeOwned>(&self, session: &AuthState, registry: Registry) -> Result<Vec<T>, ApiError> {
        self.call_json(ApiRequest::get(registry.endpoint()).query("admin_id", session.id))
            .await
    }

    /// `POST /admin/{registry}`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn create_registry_entry<T: DeserializeOwned>(
        &self,
        session: &AuthState,
        registry: Registry,
        body: &Value,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::post(registry.endpoint())
            .query("admin_id", session.id)
            .json(body)?;
        self.call_json(request).await
    }

    /// `PUT /admin/{registry}/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn update_registry_entry<T: DeserializeOwned>(
        &self,
        session: &AuthState,
        registry: Registry,
        id: i64,
        body: &Value,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::put(registry.item_endpoint(id))
            .query("admin_id", session.id)
            .json(body)?;
        self.call_json(request).await
    }

    /// `DELETE /admin/{registry}/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn delete_registry_entry(&self, session: &AuthState, registry: Registry, id: i64) -> Result<DeleteAck, ApiError> {
        let request = ApiRequest::delete(registry.item_endpoint(id)).query("admin_id", session.id);
        self.call_json(request).await
    }

    /// `GET /teachers/{id}/classes`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn list_teacher_classes(&self, teacher_id: i64) -> Result<Vec<ClassRow>, ApiError> {
        self.call_json(ApiRequest::get(format!("/teachers/{teacher_id}/classes")))
            .await
    }

    // =========================================================================
    // DOCUMENTS
    // =========================================================================

    /// `GET /documents`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn list_documents(&self, session: &AuthState, query: &DocumentQuery) -> Result<Page<DocumentRow>, ApiError> {
        let request = scoped_get("/documents", session)
            .query_opt("class_id", query.class_id)
            .query_opt("status", query.status_param())
            .query_opt("filename", query.filename.as_deref())
            .query("page", query.page)
            .query("page_size", query.page_size);
        self.call_json(request).await
    }

    /// `GET /documents/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn get_document(&self, session: &AuthState, document_id: i64) -> Result<DocumentDetail, ApiError> {
        self.call_json(scoped_get(document_endpoint(document_id), session))
            .await
    }

    /// `GET /documents/{id}/content`; `download` selects attachment over inline.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn document_content(&self, session: &AuthState, document_id: i64, download: bool) -> Result<DocumentContent, ApiError> {
        let path = format!("{}/content", document_endpoint(document_id));
        let response = self
            .call_bytes(scoped_get(path, session).query("download", download))
            .await?;
        Ok(DocumentContent {
            file_name: response
                .content_disposition
                .as_deref()
                .and_then(disposition_file_name),
            content_type: response.content_type,
            bytes: response.body,
        })
    }

    /// `POST /documents/upload` as multipart form data.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure (e.g. duplicate file name).
    pub async fn upload_document(
        &self,
        session: &AuthState,
        class_id: Option<i64>,
        file_name: &str,
        mime_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, ApiError> {
        let mut fields = vec![
            ("role".to_owned(), session.role.as_str().to_owned()),
            ("uploader_id".to_owned(), session.id.to_string()),
        ];
        if let Some(class_id) = class_id {
            fields.push(("class_id".to_owned(), class_id.to_string()));
        }
        let form = UploadForm {
            fields,
            file_name: file_name.to_owned(),
            mime_type: mime_type.map(ToOwned::to_owned),
            bytes,
        };
        self.call_json(ApiRequest::post("/documents/upload").multipart(form))
            .await
    }

    /// `POST /documents/search` (file-name search, no content retrieval).
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn search_documents(&self, session: &AuthState, search: &DocumentSearch) -> Result<Vec<DocumentRow>, ApiError> {
        let mut payload = json!({
            "filename": search.filename.trim(),
            "include_pending": search.include_pending,
            "include_rejected": search.include_rejected,
        });
        if let Some(class_id) = search.class_id {
            payload["class_id"] = Value::from(class_id);
        }
        let body = scoped_body(session, &payload)?;
        self.call_json(ApiRequest::post("/documents/search").json(&body)?)
            .await
    }

    /// `PUT /documents/{id}/rename`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn rename_document(&self, session: &AuthState, document_id: i64, new_name: &str) -> Result<RenamedDocument, ApiError> {
        let body = scoped_body(session, &json!({ "new_name": new_name }))?;
        let path = format!("{}/rename", document_endpoint(document_id));
        self.call_json(ApiRequest::put(path).json(&body)?).await
    }

    /// `DELETE /documents/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn delete_document(&self, session: &AuthState, document_id: i64) -> Result<DeletedDocument, ApiError> {
        let body = scoped_body(session, &Value::Null)?;
        self.call_json(ApiRequest::delete(document_endpoint(document_id)).json(&body)?)
            .await
    }

    // =========================================================================
    // EMBEDDING / SEARCH
    // =========================================================================

    /// `POST /embeddings/{document_id}/run` (teacher only).
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn run_embedding(
        &self,
        session: &AuthState,
        document_id: i64,
        chunk_method: Option<&str>,
    ) -> Result<EmbeddingRun, ApiError> {
        let mut body = json!({ "teacher_id": session.id });
        if let Some(method) = chunk_method.map(str::trim).filter(|m| !m.is_empty()) {
            body["chunk_method"] = Value::from(method);
        }
        let path = format!("/embeddings/{document_id}/run");
        self.call_json(ApiRequest::post(path).json(&body)?).await
    }

    /// `POST /search` (knowledge-base retrieval).
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn search(&self, session: &AuthState, query: &SearchQuery) -> Result<SearchResult, ApiError> {
        let mut payload = json!({
            "query": query.query.trim(),
            "top_k": query.top_k,
            "highlight": query.highlight,
        });
        if let Some(class_id) = query.class_id {
            payload["class_id"] = Value::from(class_id);
        }
        if let Some(threshold) = query.similarity_threshold {
            payload["similarity_threshold"] = Value::from(threshold);
        }
        let body = scoped_body(session, &payload)?;
        self.call_json(ApiRequest::post("/search").json(&body)?).await
    }

    /// `GET /search/logs`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn search_logs(&self, session: &AuthState, query: &SearchLogQuery) -> Result<Page<SearchLogRow>, ApiError> {
        let request = scoped_get("/search/logs", session)
            .query_opt("class_id", query.class_id)
            .query_opt("query", query.query.as_deref())
            .query_opt("date_from", query.date_from.as_deref())
            .query_opt("date_to", query.date_to.as_deref())
            .query_opt("page", query.page)
            .query_opt("page_size", query.page_size);
        self.call_json(request).await
    }

    /// `GET /search/stats`.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn search_stats(&self, session: &AuthState, query: &SearchLogQuery) -> Result<SearchStats, ApiError> {
        let request = scoped_get("/search/stats", session)
            .query_opt("class_id", query.class_id)
            .query_opt("date_from", query.date_from.as_deref())
            .query_opt("date_to", query.date_to.as_deref());
        self.call_json(request).await
    }

    /// `GET /cases/preview` for one retrieved chunk.
    ///
    /// # Errors
    ///
    /// Returns the server's message on failure.
    pub async fn case_preview(
        &self,
        session: &AuthState,
        ragflow_document_id: &str,
        chunk_id: &str,
        class_id: Option<i64>,
    ) -> Result<CasePreview, ApiError> {
        let request = scoped_get("/cases/preview", session)
            .query("ragflow_document_id", ragflow_document_id)
            .query("chunk_id", chunk_id)
            .query_opt("class_id", class_id);
        self.call_json(request).await
    }
}
