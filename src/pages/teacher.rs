//! Teacher workbench: class knowledge bases, embedding runs, retrieval and
//! search analytics.
//!
//! SYSTEM CONTEXT
//! ==============
//! A teacher may own several classes. Selecting one narrows the documents
//! panel, the search panel and newly created conversations to that class.

#[cfg(test)]
#[path = "teacher_test.rs"]
mod teacher_test;

use super::Feedback;
use super::conversations::ConversationWorkbench;
use super::documents::DocumentsPanel;
use super::search::SearchPanel;
use crate::net::ApiClient;
use crate::net::types::{ClassRow, DEFAULT_CHUNK_METHOD, DocumentStatus, EmbeddingRun, SearchLogQuery, SearchLogRow, SearchStats};
use crate::state::auth::AuthState;
use crate::util::validate::optional;

pub struct TeacherView {
    pub classes: Vec<ClassRow>,
    pub selected_class: Option<i64>,
    pub chunk_method: String,
    pub last_embedding: Option<EmbeddingRun>,
    pub log_query: SearchLogQuery,
    pub logs: Vec<SearchLogRow>,
    pub logs_total: u64,
    pub stats: Option<SearchStats>,
    pub search: SearchPanel,
    pub conversations: ConversationWorkbench,
    pub documents: DocumentsPanel,
    pub feedback: Feedback,
    api: ApiClient,
    session: AuthState,
}

impl TeacherView {
    pub fn new(api: ApiClient, session: AuthState) -> Self {
        Self {
            classes: Vec::new(),
            selected_class: None,
            chunk_method: DEFAULT_CHUNK_METHOD.to_owned(),
            last_embedding: None,
            log_query: SearchLogQuery::default(),
            logs: Vec::new(),
            logs_total: 0,
            stats: None,
            search: SearchPanel::new(api.clone(), session.clone()),
            conversations: ConversationWorkbench::new(api.clone(), session.clone()),
            documents: DocumentsPanel::new(api.clone(), session.clone()),
            feedback: Feedback::default(),
            api,
            session,
        }
    }

    /// Load the teacher's classes and keep (or default) the selection.
    pub async fn load_classes(&mut self) {
        self.feedback.start();
        match self.api.list_teacher_classes(self.session.id).await {
            Ok(classes) => {
                let keep = self
                    .selected_class
                    .filter(|id| classes.iter().any(|c| c.class_id == *id));
                let selected = keep.or_else(|| classes.first().map(|c| c.class_id));
                self.classes = classes;
                self.apply_class(selected);
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    /// Switch the active class and reload its documents.
    pub async fn select_class(&mut self, class_id: i64) {
        if !self.classes.iter().any(|c| c.class_id == class_id) {
            self.feedback.reject("Unknown class.");
            return;
        }
        self.apply_class(Some(class_id));
        self.documents.query.page = 1;
        self.documents.load_documents().await;
    }

    fn apply_class(&mut self, class_id: Option<i64>) {
        self.selected_class = class_id;
        self.documents.query.class_id = class_id;
        self.documents.upload_class_id = class_id;
        self.search.query.class_id = class_id;
        self.conversations.create.class_id = class_id;
        self.log_query.class_id = class_id;
    }

    /// Push an approved document into the class knowledge base.
    pub async fn run_embedding(&mut self, document_id: i64) {
        let status = self
            .documents
            .rows
            .iter()
            .find(|r| r.document_id == document_id)
            .map(|r| r.status);
        if matches!(status, Some(DocumentStatus::Pending | DocumentStatus::Rejected)) {
            self.feedback.reject("Only approved documents can be embedded.");
            return;
        }

        let chunk_method = optional(&self.chunk_method);
        self.feedback.start();
        match self
            .api
            .run_embedding(&self.session, document_id, chunk_method.as_deref())
            .await
        {
            Ok(run) => {
                tracing::info!(document_id, task_id = run.task_id, status = %run.status, "embedding started");
                let notice = format!("Embedding task {} {}.", run.task_id, run.status);
                self.last_embedding = Some(run);
                self.documents.load_documents().await;
                self.feedback.succeed(notice);
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    pub async fn load_search_logs(&mut self) {
        self.feedback.start();
        match self.api.search_logs(&self.session, &self.log_query).await {
            Ok(page) => {
                self.logs_total = page.total;
                self.logs = page.items;
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    pub async fn load_search_stats(&mut self) {
        self.feedback.start();
        match self.api.search_stats(&self.session, &self.log_query).await {
            Ok(stats) => {
                self.stats = Some(stats);
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }
}
