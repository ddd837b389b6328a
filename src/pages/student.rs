//! Student workbench. The backend pins students to their own class, so no
//! class selection happens here.

#[cfg(test)]
#[path = "student_test.rs"]
mod student_test;

use super::conversations::ConversationWorkbench;
use super::documents::{DocumentsPanel, UploadFile};
use super::search::SearchPanel;
use crate::net::ApiClient;
use crate::state::auth::AuthState;

pub struct StudentView {
    pub search: SearchPanel,
    pub conversations: ConversationWorkbench,
    pub documents: DocumentsPanel,
}

impl StudentView {
    pub fn new(api: ApiClient, session: AuthState) -> Self {
        Self {
            search: SearchPanel::new(api.clone(), session.clone()),
            conversations: ConversationWorkbench::new(api.clone(), session.clone()),
            documents: DocumentsPanel::new(api, session),
        }
    }

    /// Initial loads for the landing screen.
    pub async fn load(&mut self) {
        self.conversations.load_conversations().await;
        self.documents.load_documents().await;
    }

    /// Upload a case file; it lands as pending until an admin reviews it.
    pub async fn upload(&mut self, file: UploadFile) {
        self.documents.upload_class_id = None;
        self.documents.upload(file).await;
    }
}
