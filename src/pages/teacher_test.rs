use super::*;
use crate::net::mock::MockTransport;
use crate::state::auth::Role;
use serde_json::json;

fn teacher() -> AuthState {
    AuthState {
        role: Role::Teacher,
        id: 4,
        name: Some("Li".to_owned()),
        admin_no: None,
        teacher_no: Some("T001".to_owned()),
        student_no: None,
    }
}

fn classes_json() -> serde_json::Value {
    json!([
        { "class_id": 2, "class_code": "C2502", "class_name": "Tax Law" },
        { "class_id": 3, "class_code": "C2503", "class_name": "Contracts" }
    ])
}

#[tokio::test]
async fn load_classes_selects_first_and_scopes_panels() {
    let mock = MockTransport::new().reply(200, classes_json());
    let mut view = TeacherView::new(mock.client(), teacher());
    view.load_classes().await;

    assert_eq!(mock.last_request().path, "/teachers/4/classes");
    assert_eq!(view.selected_class, Some(2));
    assert_eq!(view.documents.query.class_id, Some(2));
    assert_eq!(view.search.query.class_id, Some(2));
    assert_eq!(view.conversations.create.class_id, Some(2));
}

#[tokio::test]
async fn reload_keeps_existing_selection() {
    let mock = MockTransport::new()
        .reply(200, classes_json())
        .reply(200, classes_json());
    let mut view = TeacherView::new(mock.client(), teacher());
    view.load_classes().await;
    view.selected_class = Some(3);
    view.load_classes().await;
    assert_eq!(view.selected_class, Some(3));
}

#[tokio::test]
async fn select_class_reloads_documents() {
    let mock = MockTransport::new()
        .reply(200, classes_json())
        .reply(200, json!({ "page": 1, "page_size": 20, "total": 0, "items": [] }));
    let mut view = TeacherView::new(mock.client(), teacher());
    view.load_classes().await;
    view.select_class(3).await;

    assert_eq!(view.selected_class, Some(3));
    assert_eq!(mock.last_request().query_value("class_id"), Some("3"));
}

#[tokio::test]
async fn select_unknown_class_is_rejected() {
    let mock = MockTransport::new();
    let mut view = TeacherView::new(mock.client(), teacher());
    view.select_class(99).await;
    assert_eq!(view.feedback.error.as_deref(), Some("Unknown class."));
}

#[tokio::test]
async fn pending_documents_cannot_be_embedded() {
    let mock = MockTransport::new();
    let mut view = TeacherView::new(mock.client(), teacher());
    view.documents.rows =
        serde_json::from_value(json!([{ "document_id": 40, "document_name": "a.pdf", "status": "pending" }])).unwrap();
    view.run_embedding(40).await;

    assert_eq!(view.feedback.error.as_deref(), Some("Only approved documents can be embedded."));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn embedding_run_refreshes_documents() {
    let mock = MockTransport::new()
        .reply(200, json!({ "task_id": 7, "document_id": 40, "status": "running" }))
        .reply(200, json!({ "page": 1, "page_size": 20, "total": 0, "items": [] }));
    let mut view = TeacherView::new(mock.client(), teacher());
    view.run_embedding(40).await;

    let requests = mock.requests();
    assert_eq!(requests[0].json_body(), Some(&json!({ "teacher_id": 4, "chunk_method": "table" })));
    assert_eq!(requests[1].path, "/documents");
    assert_eq!(view.last_embedding.as_ref().map(|r| r.task_id), Some(7));
    assert_eq!(view.feedback.notice.as_deref(), Some("Embedding task 7 running."));
}

#[tokio::test]
async fn search_stats_loaded() {
    let mock = MockTransport::new().reply(
        200,
        json!({
            "total_searches": 12, "unique_teacher_count": 1, "unique_student_count": 5,
            "top_queries": [{ "query": "VAT", "count": 4 }]
        }),
    );
    let mut view = TeacherView::new(mock.client(), teacher());
    view.log_query.date_from = Some("2026-01-01".to_owned());
    view.load_search_stats().await;

    assert_eq!(view.stats.as_ref().map(|s| s.total_searches), Some(12));
    assert_eq!(mock.last_request().query_value("date_from"), Some("2026-01-01"));
}
