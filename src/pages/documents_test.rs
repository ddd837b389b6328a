use super::*;
use crate::net::mock::MockTransport;
use crate::net::ApiResponse;
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

fn page_json(total: u64, items: serde_json::Value) -> serde_json::Value {
    json!({ "page": 1, "page_size": 20, "total": total, "items": items })
}

#[test]
fn upload_notice_mentions_review_and_duplicates() {
    let uploaded: UploadResult = serde_json::from_value(json!({
        "id": 40, "kb_id": 2, "status": "pending", "filename": "case.pdf",
        "content_duplicate": true, "duplicate_document_name": "old.pdf"
    }))
    .unwrap();
    assert_eq!(upload_notice(&uploaded), "Uploaded case.pdf; waiting for review. Same content as old.pdf.");
}

#[tokio::test]
async fn load_documents_clamps_paging() {
    let mock = MockTransport::new().reply(200, page_json(45, json!([])));
    let mut panel = DocumentsPanel::new(mock.client(), teacher());
    panel.query.page = 0;
    panel.query.page_size = 1000;
    panel.load_documents().await;

    let request = mock.last_request();
    assert_eq!(request.query_value("page"), Some("1"));
    assert_eq!(request.query_value("page_size"), Some("100"));
    assert_eq!(panel.total, 45);
}

#[tokio::test]
async fn search_requires_filename() {
    let mock = MockTransport::new();
    let mut panel = DocumentsPanel::new(mock.client(), teacher());
    panel.search_by_filename().await;
    assert_eq!(panel.feedback.error.as_deref(), Some("Enter a file name to search."));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn upload_without_file_is_rejected_locally() {
    let mock = MockTransport::new();
    let mut panel = DocumentsPanel::new(mock.client(), teacher());
    panel.upload(UploadFile { file_name: "case.pdf".to_owned(), ..UploadFile::default() }).await;
    assert_eq!(panel.feedback.error.as_deref(), Some("Choose a file to upload."));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn upload_then_refresh() {
    let mock = MockTransport::new()
        .reply(200, json!({ "id": 40, "kb_id": 2, "status": "pending", "filename": "case.pdf" }))
        .reply(
            200,
            page_json(1, json!([{ "document_id": 40, "document_name": "case.pdf", "status": "pending" }])),
        );
    let mut panel = DocumentsPanel::new(mock.client(), teacher());
    panel.upload_class_id = Some(2);
    panel
        .upload(UploadFile { file_name: "case.pdf".to_owned(), mime_type: None, bytes: b"%PDF".to_vec() })
        .await;

    assert_eq!(mock.requests().len(), 2);
    assert_eq!(panel.rows.len(), 1);
    assert_eq!(panel.last_upload.as_ref().map(|u| u.id), Some(40));
    assert_eq!(panel.feedback.notice.as_deref(), Some("Uploaded case.pdf; waiting for review."));
}

#[tokio::test]
async fn duplicate_upload_surfaces_server_detail() {
    let mock = MockTransport::new().reply(409, json!({ "detail": "同名文件已存在" }));
    let mut panel = DocumentsPanel::new(mock.client(), teacher());
    panel
        .upload(UploadFile { file_name: "case.pdf".to_owned(), mime_type: None, bytes: vec![1] })
        .await;
    assert_eq!(panel.feedback.error.as_deref(), Some("同名文件已存在"));
    assert_eq!(panel.last_upload, None);
}

#[tokio::test]
async fn rename_updates_detail_and_rows() {
    let mock = MockTransport::new()
        .reply(200, json!({ "document_id": 12, "document_name": "case.pdf", "status": "approved" }));
    let mut panel = DocumentsPanel::new(mock.client(), teacher());
    panel.rows = vec![
        serde_json::from_value(json!({ "document_id": 12, "document_name": "case.pdf", "status": "approved" })).unwrap(),
    ];
    panel.open_detail(12).await;
    assert_eq!(panel.rename_draft, "case.pdf");

    mock.reply(200, json!({ "document_id": 12, "document_name": "ruling.pdf" }));
    panel.rename_draft = "ruling.pdf".to_owned();
    panel.rename().await;

    assert_eq!(panel.detail.as_ref().unwrap().document_name, "ruling.pdf");
    assert_eq!(panel.rows[0].document_name, "ruling.pdf");
}

#[tokio::test]
async fn preview_stores_content() {
    let mock = MockTransport::new();
    mock.push(Ok(ApiResponse {
        status: 200,
        content_type: Some("text/plain".to_owned()),
        content_disposition: Some("inline; filename=\"note.txt\"".to_owned()),
        body: b"hello".to_vec(),
    }));
    let mut panel = DocumentsPanel::new(mock.client(), teacher());
    panel.load_preview(5).await;

    let preview = panel.preview.unwrap();
    assert_eq!(preview.file_name.as_deref(), Some("note.txt"));
    assert_eq!(preview.bytes, b"hello");
    assert_eq!(mock.last_request().query_value("download"), Some("false"));
}

#[tokio::test]
async fn delete_open_document_closes_detail() {
    let mock = MockTransport::new()
        .reply(200, json!({ "document_id": 12, "document_name": "case.pdf", "status": "approved" }));
    let mut panel = DocumentsPanel::new(mock.client(), teacher());
    panel.open_detail(12).await;

    mock.reply(200, json!({ "document_id": 12, "deleted": true }));
    mock.reply(200, page_json(0, json!([])));
    panel.delete(12).await;

    assert_eq!(panel.detail, None);
    assert_eq!(panel.feedback.notice.as_deref(), Some("Document deleted."));
}
