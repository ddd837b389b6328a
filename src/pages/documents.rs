//! Document panel shared by all three workbenches.
//!
//! The backend scopes visibility by role: students see their class's
//! approved documents plus their own uploads, teachers their classes, admins
//! everything.

#[cfg(test)]
#[path = "documents_test.rs"]
mod documents_test;

use super::Feedback;
use crate::net::ApiClient;
use crate::net::types::{
    DocumentContent, DocumentDetail, DocumentQuery, DocumentRow, DocumentSearch, DocumentStatus, MAX_PAGE_SIZE,
    Page, UploadResult,
};
use crate::state::auth::AuthState;
use crate::util::validate::{clamp_page_size, required};

/// A file chosen for upload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct DocumentsPanel {
    pub rows: Vec<DocumentRow>,
    pub total: u64,
    pub query: DocumentQuery,
    pub search: DocumentSearch,
    pub search_results: Vec<DocumentRow>,
    pub detail: Option<DocumentDetail>,
    pub preview: Option<DocumentContent>,
    pub rename_draft: String,
    pub upload_class_id: Option<i64>,
    pub last_upload: Option<UploadResult>,
    pub feedback: Feedback,
    api: ApiClient,
    session: AuthState,
}

impl DocumentsPanel {
    pub fn new(api: ApiClient, session: AuthState) -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
            query: DocumentQuery::default(),
            search: DocumentSearch::default(),
            search_results: Vec::new(),
            detail: None,
            preview: None,
            rename_draft: String::new(),
            upload_class_id: None,
            last_upload: None,
            feedback: Feedback::default(),
            api,
            session,
        }
    }

    #[must_use]
    pub fn page_count(&self) -> u64 {
        Page::<DocumentRow> { page: self.query.page, page_size: self.query.page_size, total: self.total, items: Vec::new() }
            .page_count()
    }

    pub async fn load_documents(&mut self) {
        self.query.page = self.query.page.max(1);
        self.query.page_size = clamp_page_size(self.query.page_size, MAX_PAGE_SIZE);

        self.feedback.start();
        match self.api.list_documents(&self.session, &self.query).await {
            Ok(page) => {
                self.total = page.total;
                self.rows = page.items;
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    /// Jump to `page` (1-based) and reload.
    pub async fn go_to_page(&mut self, page: u32) {
        self.query.page = page.max(1);
        self.load_documents().await;
    }

    pub async fn search_by_filename(&mut self) {
        if let Err(message) = required(&self.search.filename, "Enter a file name to search.") {
            self.feedback.reject(message);
            return;
        }
        self.feedback.start();
        match self.api.search_documents(&self.session, &self.search).await {
            Ok(rows) => {
                let count = rows.len();
                self.search_results = rows;
                self.feedback.succeed(format!("{count} document(s) found."));
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    pub async fn open_detail(&mut self, document_id: i64) {
        self.feedback.start();
        match self.api.get_document(&self.session, document_id).await {
            Ok(detail) => {
                self.rename_draft.clone_from(&detail.document_name);
                self.detail = Some(detail);
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    /// Fetch inline content into `preview`.
    pub async fn load_preview(&mut self, document_id: i64) {
        self.feedback.start();
        match self.api.document_content(&self.session, document_id, false).await {
            Ok(content) => {
                self.preview = Some(content);
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    /// Fetch content as an attachment and hand it to the caller to save.
    pub async fn download(&mut self, document_id: i64) -> Option<DocumentContent> {
        self.feedback.start();
        match self.api.document_content(&self.session, document_id, true).await {
            Ok(content) => {
                self.feedback.finish();
                Some(content)
            }
            Err(e) => {
                self.feedback.fail(e);
                None
            }
        }
    }

    /// Upload into `upload_class_id` (or the uploader's own class), then refresh.
    pub async fn upload(&mut self, file: UploadFile) {
        if file.file_name.trim().is_empty() || file.bytes.is_empty() {
            self.feedback.reject("Choose a file to upload.");
            return;
        }

        self.feedback.start();
        let result = self
            .api
            .upload_document(
                &self.session,
                self.upload_class_id,
                file.file_name.trim(),
                file.mime_type.as_deref(),
                file.bytes,
            )
            .await;
        match result {
            Ok(uploaded) => {
                let notice = upload_notice(&uploaded);
                self.last_upload = Some(uploaded);
                self.load_documents().await;
                if self.feedback.error.is_none() {
                    self.feedback.succeed(notice);
                }
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    /// Rename the open document to `rename_draft`.
    pub async fn rename(&mut self) {
        let Some(document_id) = self.detail.as_ref().map(|d| d.document_id) else {
            self.feedback.reject("Open a document first.");
            return;
        };
        let name = match required(&self.rename_draft, "Enter a document name.") {
            Ok(name) => name,
            Err(message) => {
                self.feedback.reject(message);
                return;
            }
        };

        self.feedback.start();
        match self.api.rename_document(&self.session, document_id, &name).await {
            Ok(renamed) => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.document_name.clone_from(&renamed.document_name);
                }
                for row in self.rows.iter_mut().filter(|r| r.document_id == document_id) {
                    row.document_name.clone_from(&renamed.document_name);
                }
                self.feedback.succeed("Document renamed.");
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    pub async fn delete(&mut self, document_id: i64) {
        self.feedback.start();
        match self.api.delete_document(&self.session, document_id).await {
            Ok(_) => {
                if self.detail.as_ref().is_some_and(|d| d.document_id == document_id) {
                    self.detail = None;
                    self.preview = None;
                }
                self.load_documents().await;
                if self.feedback.error.is_none() {
                    self.feedback.succeed("Document deleted.");
                }
            }
            Err(e) => self.feedback.fail(e),
        }
    }
}

fn upload_notice(uploaded: &UploadResult) -> String {
    let mut notice = match uploaded.status {
        DocumentStatus::Pending => format!("Uploaded {}; waiting for review.", uploaded.filename),
        _ => format!("Uploaded {}.", uploaded.filename),
    };
    if uploaded.content_duplicate {
        let other = uploaded
            .duplicate_document_name
            .as_deref()
            .unwrap_or("another document");
        notice.push_str(&format!(" Same content as {other}."));
    }
    notice
}
