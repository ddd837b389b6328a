use super::*;
use std::sync::Arc;

use crate::net::mock::MockTransport;
use crate::state::auth::Role;
use serde_json::json;

fn student() -> AuthState {
    AuthState {
        role: Role::Student,
        id: 1,
        name: Some("A".to_owned()),
        admin_no: None,
        teacher_no: None,
        student_no: Some("2502S001".to_owned()),
    }
}

fn detail_json(id: i64, messages: Value) -> Value {
    json!({ "conversation_id": id, "name": "Tax case", "messages": messages })
}

fn reply_json(user_id: i64, assistant_id: i64, answer: &str) -> Value {
    json!({
        "conversation_id": 7,
        "user_message_id": user_id,
        "assistant_message_id": assistant_id,
        "assistant_answer": answer,
        "reference": null
    })
}

async fn opened(mock: &Arc<MockTransport>) -> ConversationWorkbench {
    mock.reply(200, detail_json(7, json!([])));
    let mut bench = ConversationWorkbench::new(mock.client(), student());
    bench.open_conversation(7).await;
    assert_eq!(bench.active_id(), Some(7));
    bench
}

// =============================================================
// List / detail
// =============================================================

#[tokio::test]
async fn load_conversations_replaces_list() {
    let mock = MockTransport::new().reply(
        200,
        json!({
            "page": 1, "page_size": 20, "total": 2,
            "items": [
                { "conversation_id": 7, "name": "Tax case" },
                { "conversation_id": 8, "name": "Contracts" }
            ]
        }),
    );
    let mut bench = ConversationWorkbench::new(mock.client(), student());
    bench.load_conversations().await;

    assert_eq!(bench.total, 2);
    assert_eq!(bench.conversations.len(), 2);
    assert!(!bench.feedback.busy);
}

#[tokio::test]
async fn create_reports_failed_list_refresh() {
    let mock = MockTransport::new()
        .reply(200, json!({ "conversation_id": 9, "name": "New case" }))
        .reply(500, json!({ "detail": "list unavailable" }))
        .reply(200, detail_json(9, json!([])));
    let mut bench = ConversationWorkbench::new(mock.client(), student());
    bench.create_conversation().await;

    assert_eq!(bench.active_id(), Some(9));
    assert_eq!(bench.feedback.error.as_deref(), Some("list unavailable"));
    assert_eq!(bench.feedback.notice, None);
    assert!(!bench.feedback.busy);
}

#[tokio::test]
async fn create_refreshes_and_opens() {
    let mock = MockTransport::new()
        .reply(200, json!({ "conversation_id": 9, "name": "New case" }))
        .reply(200, json!({ "page": 1, "page_size": 20, "total": 1, "items": [{ "conversation_id": 9, "name": "New case" }] }))
        .reply(200, detail_json(9, json!([])));
    let mut bench = ConversationWorkbench::new(mock.client(), student());
    bench.create_conversation().await;

    assert_eq!(bench.active_id(), Some(9));
    assert_eq!(bench.conversations.len(), 1);
    assert_eq!(bench.feedback.notice.as_deref(), Some("Conversation created."));
}

#[tokio::test]
async fn open_conversation_maps_server_messages() {
    let mock = MockTransport::new().reply(
        200,
        detail_json(
            7,
            json!([
                { "id": 1, "role": "user", "content": "Q" },
                { "id": 2, "role": "assistant", "content": "A", "reference": { "chunks": [] } }
            ]),
        ),
    );
    let mut bench = ConversationWorkbench::new(mock.client(), student());
    bench.open_conversation(7).await;

    assert_eq!(bench.messages.len(), 2);
    assert_eq!(bench.messages[1].role, SenderRole::Assistant);
    assert!(bench.messages.iter().all(|m| !m.pending && m.temp_id.is_none()));
    assert_eq!(bench.rename_draft, "Tax case");
    assert!(bench.active.as_ref().unwrap().messages.is_empty());
}

#[tokio::test]
async fn open_failure_keeps_previous_state() {
    let mock = MockTransport::new();
    let mut bench = opened(&mock).await;
    mock.reply(404, json!({ "detail": "会话不存在" }));
    bench.open_conversation(99).await;

    assert_eq!(bench.active_id(), Some(7));
    assert_eq!(bench.feedback.error.as_deref(), Some("会话不存在"));
}

// =============================================================
// Mutations
// =============================================================

#[tokio::test]
async fn rename_requires_name() {
    let mock = MockTransport::new();
    let mut bench = opened(&mock).await;
    bench.rename_draft = "  ".to_owned();
    bench.rename_active().await;

    assert_eq!(bench.feedback.error.as_deref(), Some("Enter a conversation name."));
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn rename_updates_active_and_list() {
    let mock = MockTransport::new();
    let mut bench = opened(&mock).await;
    bench.conversations = vec![serde_json::from_value(json!({ "conversation_id": 7, "name": "Tax case" })).unwrap()];
    mock.reply(200, json!({ "conversation_id": 7, "name": "VAT dispute" }));
    bench.rename_draft = " VAT dispute ".to_owned();
    bench.rename_active().await;

    assert_eq!(bench.active.as_ref().unwrap().name, "VAT dispute");
    assert_eq!(bench.conversations[0].name, "VAT dispute");
    assert_eq!(bench.feedback.notice.as_deref(), Some("Conversation renamed."));
    assert_eq!(
        mock.last_request().json_body(),
        Some(&json!({ "new_name": "VAT dispute", "role": "student", "user_id": 1 }))
    );
}

#[tokio::test]
async fn delete_active_conversation_closes_it() {
    let mock = MockTransport::new();
    let mut bench = opened(&mock).await;
    mock.reply(200, json!({ "conversation_id": 7, "deleted": true }));
    bench.delete_conversation(7).await;

    assert_eq!(bench.active, None);
    assert!(bench.messages.is_empty());
}

#[tokio::test]
async fn empty_settings_are_rejected_locally() {
    let mock = MockTransport::new();
    let mut bench = opened(&mock).await;
    bench.save_settings().await;
    assert_eq!(bench.feedback.error.as_deref(), Some("Nothing to update."));
    assert_eq!(mock.requests().len(), 1);
}

// =============================================================
// Optimistic send
// =============================================================

#[tokio::test]
async fn send_reconciles_placeholder_and_appends_answer() {
    let mock = MockTransport::new();
    let mut bench = opened(&mock).await;
    mock.reply(200, reply_json(30, 31, "Article 5 applies."));
    bench.draft = "Which article?".to_owned();
    bench.send_message().await;

    assert_eq!(bench.messages.len(), 2);
    assert_eq!(bench.messages[0].id, Some(30));
    assert!(!bench.messages[0].pending);
    assert_eq!(bench.messages[1].id, Some(31));
    assert_eq!(bench.messages[1].content, "Article 5 applies.");
    assert!(bench.draft.is_empty());
    assert_eq!(bench.pending_count(), 0);
}

#[tokio::test]
async fn blank_draft_is_not_sent() {
    let mock = MockTransport::new();
    let mut bench = opened(&mock).await;
    bench.draft = "   ".to_owned();
    assert_eq!(bench.begin_send(), None);
    assert!(bench.messages.is_empty());
    assert_eq!(bench.feedback.error.as_deref(), Some("Enter a message."));
}

#[tokio::test]
async fn failed_send_marks_placeholder_failed() {
    let mock = MockTransport::new();
    let mut bench = opened(&mock).await;
    mock.reply(502, json!({ "detail": "RAGFlow 调用失败" }));
    bench.draft = "Q".to_owned();
    bench.send_message().await;

    assert_eq!(bench.messages.len(), 1);
    assert!(bench.messages[0].failed);
    assert!(!bench.messages[0].pending);
    assert_eq!(bench.feedback.error.as_deref(), Some("RAGFlow 调用失败"));
}

#[tokio::test]
async fn overlapping_sends_resolve_by_their_own_ids() {
    let mock = MockTransport::new();
    let mut bench = opened(&mock).await;

    bench.draft = "first".to_owned();
    let first = bench.begin_send().unwrap();
    bench.draft = "second".to_owned();
    let second = bench.begin_send().unwrap();
    assert_ne!(first.temp_id, second.temp_id);
    assert_eq!(bench.pending_count(), 2);

    // Second request settles first.
    mock.reply(200, reply_json(12, 13, "answer to second"));
    let second_result = bench.dispatch(&second).await;
    bench.complete_send(&second, second_result);

    assert_eq!(bench.pending_count(), 1);
    assert!(bench.messages[0].pending);
    assert_eq!(bench.messages[0].content, "first");
    assert_eq!(bench.messages[1].id, Some(12));
    assert_eq!(bench.messages[2].content, "answer to second");

    mock.reply(200, reply_json(10, 11, "answer to first"));
    let first_result = bench.dispatch(&first).await;
    bench.complete_send(&first, first_result);

    let ids: Vec<_> = bench.messages.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![Some(10), Some(11), Some(12), Some(13)]);
    assert_eq!(bench.pending_count(), 0);
    assert_eq!(bench.messages[1].content, "answer to first");
}

#[tokio::test]
async fn overlapping_failure_does_not_touch_sibling() {
    let mock = MockTransport::new();
    let mut bench = opened(&mock).await;
    bench.draft = "first".to_owned();
    let first = bench.begin_send().unwrap();
    bench.draft = "second".to_owned();
    let second = bench.begin_send().unwrap();

    bench.complete_send(&first, Err(ApiError::Transport("connection reset".to_owned())));

    assert!(bench.messages[0].failed);
    assert!(bench.messages[1].pending);
    assert!(!bench.messages[1].failed);
    assert_eq!(bench.messages[1].temp_id, Some(second.temp_id));
}

#[tokio::test]
async fn result_for_closed_conversation_is_dropped() {
    let mock = MockTransport::new();
    let mut bench = opened(&mock).await;
    bench.draft = "Q".to_owned();
    let pending = bench.begin_send().unwrap();

    mock.reply(200, detail_json(8, json!([])));
    bench.open_conversation(8).await;
    let before = bench.messages.clone();
    let reply: SendMessageResponse = serde_json::from_value(reply_json(30, 31, "late")).unwrap();
    bench.complete_send(&pending, Ok(reply));

    assert_eq!(bench.messages, before);
}
