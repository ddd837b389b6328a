//! Knowledge-base retrieval panel used by the teacher and student views.

#[cfg(test)]
#[path = "search_test.rs"]
mod search_test;

use super::Feedback;
use crate::net::ApiClient;
use crate::net::types::{CasePreview, SearchChunk, SearchQuery, SearchResult};
use crate::state::auth::AuthState;
use crate::util::validate::required;

pub const MAX_TOP_K: u32 = 50;

/// Check a retrieval query before it is sent.
///
/// # Errors
///
/// Returns a display message for a blank query, an out-of-range `top_k`, or
/// a similarity threshold outside `0..=1`.
pub fn validate_search_query(query: &SearchQuery) -> Result<(), &'static str> {
    required(&query.query, "Enter a search query.")?;
    if query.top_k == 0 || query.top_k > MAX_TOP_K {
        return Err("Result count must be between 1 and 50.");
    }
    if query
        .similarity_threshold
        .is_some_and(|t| !(0.0..=1.0).contains(&t))
    {
        return Err("Similarity threshold must be between 0 and 1.");
    }
    Ok(())
}

pub struct SearchPanel {
    pub query: SearchQuery,
    pub result: Option<SearchResult>,
    pub preview: Option<CasePreview>,
    pub feedback: Feedback,
    api: ApiClient,
    session: AuthState,
}

impl SearchPanel {
    pub fn new(api: ApiClient, session: AuthState) -> Self {
        Self {
            query: SearchQuery::default(),
            result: None,
            preview: None,
            feedback: Feedback::default(),
            api,
            session,
        }
    }

    pub async fn run(&mut self) {
        if let Err(message) = validate_search_query(&self.query) {
            self.feedback.reject(message);
            return;
        }
        self.feedback.start();
        match self.api.search(&self.session, &self.query).await {
            Ok(result) => {
                let notice = format!("{} result(s).", result.result_count);
                self.result = Some(result);
                self.preview = None;
                self.feedback.succeed(notice);
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    /// Load the full chunk behind a search hit.
    pub async fn open_preview(&mut self, chunk: &SearchChunk) {
        let (Some(document_id), Some(chunk_id)) = (chunk.ragflow_document_id.as_deref(), chunk.chunk_id.as_deref()) else {
            self.feedback.reject("This result has no preview.");
            return;
        };
        self.feedback.start();
        let class_id = chunk.class_id.or(self.query.class_id);
        match self
            .api
            .case_preview(&self.session, document_id, chunk_id, class_id)
            .await
        {
            Ok(preview) => {
                self.preview = Some(preview);
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }
}
