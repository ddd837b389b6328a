//! Conversation workbench shared by the teacher and student views.
//!
//! DESIGN
//! ======
//! Sending is optimistic. `begin_send` appends a pending placeholder keyed by
//! a client-generated UUID and returns a [`PendingSend`] ticket;
//! `complete_send` reconciles exactly that placeholder when the request
//! settles. Overlapping sends therefore resolve independently, in whatever
//! order their responses arrive. A request that never settles leaves its
//! placeholder pending.

#[cfg(test)]
#[path = "conversations_test.rs"]
mod conversations_test;

use std::future::Future;

use serde_json::Value;
use uuid::Uuid;

use super::Feedback;
use crate::net::types::{
    ConversationDetail, ConversationQuery, ConversationSettings, ConversationSummary, LastMessage, NewConversation,
    SendMessageResponse, SenderRole, ServerMessage,
};
use crate::net::{ApiClient, ApiError};
use crate::state::auth::AuthState;
use crate::util::validate::{optional, required};

/// One entry in the open conversation's message list.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageItem {
    /// Server id; `None` until the server has accepted the message.
    pub id: Option<i64>,
    /// Client correlation id for optimistic entries.
    pub temp_id: Option<Uuid>,
    pub role: SenderRole,
    pub content: String,
    pub reference: Option<Value>,
    pub created_at: Option<String>,
    pub pending: bool,
    pub failed: bool,
}

impl MessageItem {
    fn placeholder(temp_id: Uuid, content: String) -> Self {
        Self {
            id: None,
            temp_id: Some(temp_id),
            role: SenderRole::User,
            content,
            reference: None,
            created_at: None,
            pending: true,
            failed: false,
        }
    }
}

impl From<ServerMessage> for MessageItem {
    fn from(message: ServerMessage) -> Self {
        Self {
            id: Some(message.id),
            temp_id: None,
            role: message.role,
            content: message.content,
            reference: message.reference,
            created_at: message.created_at,
            pending: false,
            failed: false,
        }
    }
}

/// Ticket for an in-flight optimistic send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSend {
    pub conversation_id: i64,
    pub temp_id: Uuid,
    pub content: String,
}

pub struct ConversationWorkbench {
    pub conversations: Vec<ConversationSummary>,
    pub total: u64,
    pub query: ConversationQuery,
    pub create: NewConversation,
    /// Open conversation; its `messages` stay empty, see [`Self::messages`].
    pub active: Option<ConversationDetail>,
    pub messages: Vec<MessageItem>,
    pub draft: String,
    pub rename_draft: String,
    pub settings: ConversationSettings,
    pub feedback: Feedback,
    api: ApiClient,
    session: AuthState,
}

impl ConversationWorkbench {
    pub fn new(api: ApiClient, session: AuthState) -> Self {
        Self {
            conversations: Vec::new(),
            total: 0,
            query: ConversationQuery::default(),
            create: NewConversation::default(),
            active: None,
            messages: Vec::new(),
            draft: String::new(),
            rename_draft: String::new(),
            settings: ConversationSettings::default(),
            feedback: Feedback::default(),
            api,
            session,
        }
    }

    #[must_use]
    pub fn active_id(&self) -> Option<i64> {
        self.active.as_ref().map(|c| c.conversation_id)
    }

    // =========================================================================
    // LIST / DETAIL
    // =========================================================================

    pub async fn load_conversations(&mut self) {
        self.feedback.start();
        match self.api.list_conversations(&self.session, &self.query).await {
            Ok(page) => {
                self.total = page.total;
                self.conversations = page.items;
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    /// Create from the `create` form, refresh the list, and open the result.
    pub async fn create_conversation(&mut self) {
        let mut new = self.create.clone();
        new.name = new.name.as_deref().and_then(optional);

        self.feedback.start();
        let created = match self.api.create_conversation(&self.session, &new).await {
            Ok(created) => created,
            Err(e) => {
                self.feedback.fail(e);
                return;
            }
        };
        self.create = NewConversation::default();
        self.load_conversations().await;
        // Opening clears feedback; a failed list refresh must survive it.
        let refresh_error = self.feedback.error.take();
        self.open_conversation(created.conversation_id).await;
        if let Some(error) = refresh_error {
            self.feedback.fail(error);
        } else if self.feedback.error.is_none() {
            self.feedback.succeed("Conversation created.");
        }
    }

    pub async fn open_conversation(&mut self, conversation_id: i64) {
        self.feedback.start();
        match self.api.get_conversation(&self.session, conversation_id).await {
            Ok(mut detail) => {
                self.messages = std::mem::take(&mut detail.messages)
                    .into_iter()
                    .map(MessageItem::from)
                    .collect();
                self.rename_draft.clone_from(&detail.name);
                self.settings = ConversationSettings::default();
                self.active = Some(detail);
                self.feedback.finish();
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    pub async fn rename_active(&mut self) {
        let Some(conversation_id) = self.active_id() else {
            self.feedback.reject("Open a conversation first.");
            return;
        };
        let name = match required(&self.rename_draft, "Enter a conversation name.") {
            Ok(name) => name,
            Err(message) => {
                self.feedback.reject(message);
                return;
            }
        };

        self.feedback.start();
        match self.api.rename_conversation(&self.session, conversation_id, &name).await {
            Ok(renamed) => {
                if let Some(active) = self.active.as_mut() {
                    active.name.clone_from(&renamed.name);
                }
                if let Some(row) = self.summary_mut(conversation_id) {
                    row.name.clone_from(&renamed.name);
                }
                self.feedback.succeed("Conversation renamed.");
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    pub async fn clear_active(&mut self) {
        let Some(conversation_id) = self.active_id() else {
            self.feedback.reject("Open a conversation first.");
            return;
        };
        self.feedback.start();
        match self.api.clear_conversation(&self.session, conversation_id).await {
            Ok(_) => {
                self.messages.clear();
                if let Some(row) = self.summary_mut(conversation_id) {
                    row.last_message = None;
                }
                self.feedback.succeed("Conversation cleared.");
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    pub async fn delete_conversation(&mut self, conversation_id: i64) {
        self.feedback.start();
        match self.api.delete_conversation(&self.session, conversation_id).await {
            Ok(_) => {
                self.conversations.retain(|c| c.conversation_id != conversation_id);
                self.total = self.total.saturating_sub(1);
                if self.active_id() == Some(conversation_id) {
                    self.active = None;
                    self.messages.clear();
                    self.rename_draft.clear();
                }
                self.feedback.succeed("Conversation deleted.");
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    /// Push the `settings` draft to the open conversation.
    pub async fn save_settings(&mut self) {
        let Some(conversation_id) = self.active_id() else {
            self.feedback.reject("Open a conversation first.");
            return;
        };
        if self.settings.is_empty() {
            self.feedback.reject("Nothing to update.");
            return;
        }

        self.feedback.start();
        match self
            .api
            .update_conversation_settings(&self.session, conversation_id, &self.settings)
            .await
        {
            Ok(updated) => {
                if let Some(active) = self.active.as_mut() {
                    active.model_name = updated.model_name;
                    active.top_n = updated.top_n;
                    active.similarity_threshold = updated.similarity_threshold;
                    active.show_citations = updated.show_citations;
                    active.system_prompt = updated.system_prompt;
                }
                self.settings = ConversationSettings::default();
                self.feedback.succeed("Settings saved.");
            }
            Err(e) => self.feedback.fail(e),
        }
    }

    // =========================================================================
    // OPTIMISTIC SEND
    // =========================================================================

    /// Append a pending placeholder for the current draft and clear the draft.
    ///
    /// Returns `None` (with `feedback.error` set) when no conversation is open
    /// or the draft is blank.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        let Some(conversation_id) = self.active_id() else {
            self.feedback.reject("Open a conversation first.");
            return None;
        };
        let content = match required(&self.draft, "Enter a message.") {
            Ok(content) => content,
            Err(message) => {
                self.feedback.reject(message);
                return None;
            }
        };

        let temp_id = Uuid::new_v4();
        self.messages
            .push(MessageItem::placeholder(temp_id, content.clone()));
        self.draft.clear();
        self.feedback.error = None;
        Some(PendingSend { conversation_id, temp_id, content })
    }

    /// Request future for `pending`, detached from `self` so several can be
    /// in flight at once.
    pub fn dispatch(&self, pending: &PendingSend) -> impl Future<Output = Result<SendMessageResponse, ApiError>> + Send + use<> {
        let api = self.api.clone();
        let session = self.session.clone();
        let PendingSend { conversation_id, content, .. } = pending.clone();
        async move { api.send_message(&session, conversation_id, &content).await }
    }

    /// Reconcile the placeholder for `pending` with the request outcome.
    ///
    /// Results for a conversation that is no longer open, or whose
    /// placeholder is gone (cleared, reopened), are dropped.
    pub fn complete_send(&mut self, pending: &PendingSend, result: Result<SendMessageResponse, ApiError>) {
        if self.active_id() != Some(pending.conversation_id) {
            tracing::debug!(conversation_id = pending.conversation_id, "dropping send result for inactive conversation");
            return;
        }
        let Some(index) = self
            .messages
            .iter()
            .position(|m| m.temp_id == Some(pending.temp_id))
        else {
            tracing::debug!(temp_id = %pending.temp_id, "dropping send result without placeholder");
            return;
        };

        match result {
            Ok(reply) => {
                let placeholder = &mut self.messages[index];
                placeholder.id = Some(reply.user_message_id);
                placeholder.pending = false;

                self.messages.insert(
                    index + 1,
                    MessageItem {
                        id: Some(reply.assistant_message_id),
                        temp_id: None,
                        role: SenderRole::Assistant,
                        content: reply.assistant_answer.clone(),
                        reference: reply.reference,
                        created_at: None,
                        pending: false,
                        failed: false,
                    },
                );
                if let Some(row) = self.summary_mut(pending.conversation_id) {
                    row.last_message = Some(LastMessage {
                        role: SenderRole::Assistant,
                        content: reply.assistant_answer,
                        created_at: None,
                    });
                }
            }
            Err(e) => {
                tracing::warn!(temp_id = %pending.temp_id, error = %e, "message send failed");
                let placeholder = &mut self.messages[index];
                placeholder.pending = false;
                placeholder.failed = true;
                self.feedback.error = Some(e.to_string());
            }
        }
    }

    /// Optimistic send of the current draft, awaited to completion.
    pub async fn send_message(&mut self) {
        let Some(pending) = self.begin_send() else {
            return;
        };
        let result = self.dispatch(&pending).await;
        self.complete_send(&pending, result);
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.pending).count()
    }

    fn summary_mut(&mut self, conversation_id: i64) -> Option<&mut ConversationSummary> {
        self.conversations
            .iter_mut()
            .find(|c| c.conversation_id == conversation_id)
    }
}
