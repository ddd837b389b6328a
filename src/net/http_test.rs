use super::*;

// =============================================================
// ApiRequest::url
// =============================================================

#[test]
fn url_joins_base_and_path() {
    let req = ApiRequest::get("/audits/pending");
    let url = req.url("http://localhost:8000").unwrap();
    assert_eq!(url.as_str(), "http://localhost:8000/audits/pending");
}

#[test]
fn url_trims_trailing_slash_on_base() {
    let req = ApiRequest::get("/health");
    let url = req.url("http://api.example.test/v1/").unwrap();
    assert_eq!(url.as_str(), "http://api.example.test/v1/health");
}

#[test]
fn url_encodes_query_pairs() {
    let req = ApiRequest::get("/conversations")
        .query("role", "student")
        .query("user_id", 7)
        .query("keyword", "税法 案例&1");
    let url = req.url("http://localhost:8000").unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost:8000/conversations?role=student&user_id=7&keyword=%E7%A8%8E%E6%B3%95+%E6%A1%88%E4%BE%8B%261"
    );
}

#[test]
fn url_rejects_relative_base() {
    let err = ApiRequest::get("/health").url("localhost").unwrap_err();
    assert!(matches!(err, ApiError::InvalidBaseUrl(_)));
}

#[test]
fn query_opt_skips_missing_and_blank_values() {
    let req = ApiRequest::get("/documents")
        .query_opt("class_id", None::<i64>)
        .query_opt("filename", Some("   "))
        .query_opt("status", Some(" pending "));
    assert_eq!(req.query, vec![("status".to_owned(), "pending".to_owned())]);
}

#[test]
fn json_body_is_attached() {
    let req = ApiRequest::post("/auth/admin/login")
        .json(&serde_json::json!({ "account": "A1", "password": "p" }))
        .unwrap();
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.json_body().and_then(|b| b.get("account")), Some(&Value::from("A1")));
}

#[test]
fn upload_form_field_lookup() {
    let form = UploadForm {
        fields: vec![("role".to_owned(), "student".to_owned()), ("uploader_id".to_owned(), "3".to_owned())],
        file_name: "cases.xlsx".to_owned(),
        mime_type: None,
        bytes: vec![1, 2, 3],
    };
    assert_eq!(form.field("uploader_id"), Some("3"));
    assert_eq!(form.field("class_id"), None);
}

// =============================================================
// ApiResponse
// =============================================================

#[test]
fn response_success_range() {
    assert!(ApiResponse { status: 200, ..ApiResponse::default() }.is_success());
    assert!(ApiResponse { status: 204, ..ApiResponse::default() }.is_success());
    assert!(!ApiResponse { status: 302, ..ApiResponse::default() }.is_success());
    assert!(!ApiResponse { status: 404, ..ApiResponse::default() }.is_success());
}

// =============================================================
// disposition_file_name
// =============================================================

#[test]
fn disposition_prefers_encoded_filename() {
    let header = "attachment; filename*=UTF-8''%E6%A1%88%E4%BE%8B.xlsx";
    assert_eq!(disposition_file_name(header).as_deref(), Some("案例.xlsx"));
}

#[test]
fn disposition_plain_filename() {
    let header = "inline; filename=\"report.pdf\"";
    assert_eq!(disposition_file_name(header).as_deref(), Some("report.pdf"));
}

#[test]
fn disposition_without_filename() {
    assert_eq!(disposition_file_name("inline"), None);
}

#[test]
fn disposition_strips_encoded_parent_dirs() {
    let header = "attachment; filename*=UTF-8''..%2F..%2F.bashrc";
    assert_eq!(disposition_file_name(header).as_deref(), Some(".bashrc"));
}

#[test]
fn disposition_strips_absolute_path() {
    let header = "attachment; filename=\"/etc/cron.d/x\"";
    assert_eq!(disposition_file_name(header).as_deref(), Some("x"));
}

#[test]
fn disposition_strips_backslash_path() {
    let header = "attachment; filename=\"..\\..\\boot.ini\"";
    assert_eq!(disposition_file_name(header).as_deref(), Some("boot.ini"));
}

#[test]
fn disposition_rejects_bare_dot_names() {
    assert_eq!(disposition_file_name("attachment; filename*=UTF-8''.."), None);
    assert_eq!(disposition_file_name("attachment; filename*=UTF-8''..%2F"), None);
    assert_eq!(disposition_file_name("attachment; filename=\".\""), None);
    assert_eq!(disposition_file_name("attachment; filename=\"\""), None);
}

#[test]
fn disposition_keeps_invalid_escape_literal() {
    let header = "attachment; filename*=UTF-8''100%ZZ.txt";
    assert_eq!(disposition_file_name(header).as_deref(), Some("100%ZZ.txt"));
}

#[test]
fn http_transport_rejects_bad_base() {
    assert!(matches!(HttpTransport::new("not a url"), Err(ApiError::InvalidBaseUrl(_))));
}

#[test]
fn http_transport_trims_base() {
    let transport = HttpTransport::new("http://localhost:8000/").unwrap();
    assert_eq!(transport.base_url(), "http://localhost:8000");
}

// =============================================================
// HttpTransport over loopback
// =============================================================

/// Accept one connection on a loopback port, capture the raw request, and
/// answer with `response`. Returns the base URL and the captured request.
async fn serve_once(response: String) -> (String, tokio::task::JoinHandle<String>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&raw[..end]).to_ascii_lowercase();
                if head.contains("transfer-encoding: chunked") {
                    if raw.ends_with(b"0\r\n\r\n") {
                        break;
                    }
                    continue;
                }
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map_or(0, |v| v.trim().parse::<usize>().unwrap());
                if raw.len() >= end + 4 + length {
                    break;
                }
            }
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&raw).into_owned()
    });
    (base, handle)
}

fn http_response(status_line: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut out = format!("HTTP/1.1 {status_line}\r\n");
    for (name, value) in headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str(&format!("content-length: {}\r\nconnection: close\r\n\r\n{body}", body.len()));
    out
}

#[tokio::test]
async fn http_transport_sends_json_body() {
    let (base, server) = serve_once(http_response(
        "200 OK",
        &[("content-type", "application/json")],
        r#"{"id":1}"#,
    ))
    .await;
    let transport = HttpTransport::new(&base).unwrap();
    let request = ApiRequest::post("/auth/admin/login")
        .query("next", "a b")
        .json(&serde_json::json!({ "account": "A1", "password": "p" }))
        .unwrap();

    let response = transport.send(request).await.unwrap();
    let raw = server.await.unwrap();

    assert!(raw.starts_with("POST /auth/admin/login?next=a+b HTTP/1.1\r\n"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains("content-type: application/json\r\n"), "{raw}");
    assert!(raw.ends_with(r#"{"account":"A1","password":"p"}"#), "{raw}");
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(response.body, br#"{"id":1}"#.to_vec());
}

#[tokio::test]
async fn http_transport_marks_bodyless_requests_as_json() {
    let (base, server) = serve_once(http_response("204 No Content", &[], "")).await;
    let transport = HttpTransport::new(&base).unwrap();

    let response = transport.send(ApiRequest::delete("/documents/3")).await.unwrap();
    let raw = server.await.unwrap();

    assert!(raw.starts_with("DELETE /documents/3 HTTP/1.1\r\n"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains("content-type: application/json\r\n"), "{raw}");
    assert_eq!(response.status, 204);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn http_transport_sends_multipart_upload() {
    let (base, server) = serve_once(http_response(
        "200 OK",
        &[("content-type", "application/json")],
        r#"{"id":41}"#,
    ))
    .await;
    let transport = HttpTransport::new(&base).unwrap();
    let form = UploadForm {
        fields: vec![
            ("role".to_owned(), "teacher".to_owned()),
            ("uploader_id".to_owned(), "3".to_owned()),
            ("class_id".to_owned(), "2".to_owned()),
        ],
        file_name: "case.pdf".to_owned(),
        mime_type: Some("application/pdf".to_owned()),
        bytes: b"%PDF-1.4 body".to_vec(),
    };

    transport
        .send(ApiRequest::post("/documents/upload").multipart(form))
        .await
        .unwrap();
    let raw = server.await.unwrap();
    let lower = raw.to_ascii_lowercase();

    assert!(raw.starts_with("POST /documents/upload HTTP/1.1\r\n"), "{raw}");
    assert!(lower.contains("content-type: multipart/form-data; boundary="), "{raw}");
    assert!(!lower.contains("content-type: application/json"), "{raw}");
    assert!(raw.contains("name=\"role\"\r\n\r\nteacher\r\n"), "{raw}");
    assert!(raw.contains("name=\"uploader_id\"\r\n\r\n3\r\n"), "{raw}");
    assert!(raw.contains("name=\"class_id\"\r\n\r\n2\r\n"), "{raw}");
    assert!(raw.contains("name=\"file\"; filename=\"case.pdf\""), "{raw}");
    assert!(lower.contains("content-type: application/pdf\r\n\r\n%pdf-1.4 body"), "{raw}");
}

#[tokio::test]
async fn http_transport_returns_error_status_and_headers() {
    let (base, server) = serve_once(http_response(
        "404 Not Found",
        &[
            ("content-type", "application/json"),
            ("content-disposition", "attachment; filename=\"case 1.pdf\""),
        ],
        r#"{"detail":"missing"}"#,
    ))
    .await;
    let transport = HttpTransport::new(&base).unwrap();

    let response = transport.send(ApiRequest::get("/documents/9/content")).await.unwrap();
    server.await.unwrap();

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
    assert_eq!(response.content_disposition.as_deref(), Some("attachment; filename=\"case 1.pdf\""));
    assert_eq!(response.body, br#"{"detail":"missing"}"#.to_vec());
}
