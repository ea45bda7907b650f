//! Unit tests for `RestRemoteStore` request shapes and error mapping.
//!
//! Each test serves a single canned HTTP response from a local listener and
//! inspects the request the store sent.

use estimate_desk::config::RemoteCredentials;
use estimate_desk::models::{EstimateStatus, EstimateType};
use estimate_desk::remote::{RemoteEstimate, RemoteStore, RestRemoteStore};
use estimate_desk::AppError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Request as received by the listener.
struct Captured {
    head: String,
    body: String,
}

impl Captured {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    fn has_header(&self, line: &str) -> bool {
        self.head
            .lines()
            .any(|l| l.trim().eq_ignore_ascii_case(line))
    }
}

/// Accept one connection, record the request, and answer with `status`.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = Vec::new();
        let mut chunk = [0_u8; 1024];

        let head_end = loop {
            let n = socket.read(&mut chunk).await.expect("read");
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < head_end + content_length {
            let n = socket.read(&mut chunk).await.expect("read body");
            assert!(n > 0, "connection closed before body");
            buf.extend_from_slice(&chunk[..n]);
        }
        let request_body =
            String::from_utf8_lossy(&buf[head_end..head_end + content_length]).into_owned();

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.expect("write");
        socket.shutdown().await.expect("shutdown");

        Captured {
            head,
            body: request_body,
        }
    });

    (format!("http://{addr}"), handle)
}

fn store_at(base: &str) -> RestRemoteStore {
    let credentials = RemoteCredentials::new(base, "anon-key").expect("credentials");
    RestRemoteStore::new(&credentials, "estimates").expect("store")
}

fn blank_row(id: i64) -> RemoteEstimate {
    RemoteEstimate {
        id,
        estimate_type: EstimateType::Initial,
        claim_number: "CLM-7".into(),
        client_name: "Harbor Mutual".into(),
        task_number: "T-7".into(),
        date_received: None,
        time_received: None,
        status: EstimateStatus::NotStarted,
        date_returned: None,
        time_returned: None,
        estimate_amount: None,
        ai_predicted_days: None,
        client_billed: false,
    }
}

#[tokio::test]
async fn select_sends_ordered_query_with_auth_headers() {
    let (base, server) = serve_once(
        "200 OK",
        r#"[{"id":1,"estimateType":"Final","claimNumber":"C-1","clientName":"Acme","taskNumber":"T-1","status":"Done","estimateAmount":1250.5,"clientBilled":true}]"#,
    )
    .await;
    let store = store_at(&base);

    let rows = store.select_all().await.expect("select");
    let req = server.await.expect("server");

    assert_eq!(
        req.request_line(),
        "GET /rest/v1/estimates?select=*&order=id.asc HTTP/1.1"
    );
    assert!(req.has_header("apikey: anon-key"), "head: {}", req.head);
    assert!(req.has_header("authorization: Bearer anon-key"), "head: {}", req.head);
    assert!(req.has_header("content-type: application/json"), "head: {}", req.head);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].status, EstimateStatus::Done);
    assert_eq!(rows[0].estimate_amount, Some(1250.5));
    assert!(rows[0].client_billed);
    assert_eq!(rows[0].date_received, None);
}

#[tokio::test]
async fn insert_posts_array_with_minimal_return_and_nulls() {
    let (base, server) = serve_once("201 Created", "").await;
    let store = store_at(&base);

    store.insert(&[blank_row(42)]).await.expect("insert");
    let req = server.await.expect("server");

    assert_eq!(req.request_line(), "POST /rest/v1/estimates HTTP/1.1");
    assert!(req.has_header("prefer: return=minimal"), "head: {}", req.head);

    let body: serde_json::Value = serde_json::from_str(&req.body).expect("json body");
    let rows = body.as_array().expect("array body");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 42);
    assert_eq!(rows[0]["estimateType"], "Initial");
    assert_eq!(rows[0]["status"], "Not Started");
    assert!(rows[0]["dateReceived"].is_null());
    assert!(rows[0]["estimateAmount"].is_null());
    assert!(rows[0]["aiPredictedDays"].is_null());
    assert_eq!(rows[0]["clientBilled"], false);
}

#[tokio::test]
async fn update_patches_single_row_by_id() {
    let (base, server) = serve_once("204 No Content", "").await;
    let store = store_at(&base);

    let mut row = blank_row(5);
    row.status = EstimateStatus::InProgress;
    store.update(&row).await.expect("update");
    let req = server.await.expect("server");

    assert_eq!(
        req.request_line(),
        "PATCH /rest/v1/estimates?id=eq.5 HTTP/1.1"
    );
    assert!(req.has_header("prefer: return=minimal"), "head: {}", req.head);

    let body: serde_json::Value = serde_json::from_str(&req.body).expect("json body");
    assert!(body.is_object(), "update sends a single object");
    assert_eq!(body["status"], "In Progress");
    assert!(body["dateReceived"].is_null());
    assert!(body.get("dateReceived").is_some(), "null columns are sent, not omitted");
}

#[tokio::test]
async fn delete_failure_carries_status_and_body() {
    let (base, server) = serve_once("409 Conflict", r#"{"message":"dup"}"#).await;
    let store = store_at(&base);

    let err = store.delete(9).await.unwrap_err();
    let req = server.await.expect("server");

    assert_eq!(
        req.request_line(),
        "DELETE /rest/v1/estimates?id=eq.9 HTTP/1.1"
    );
    assert!(matches!(err, AppError::Remote(_)));
    assert_eq!(
        err.to_string(),
        r#"remote: delete returned 409 Conflict: {"message":"dup"}"#
    );
}

#[tokio::test]
async fn unauthorized_select_is_remote_error() {
    let (base, server) = serve_once("401 Unauthorized", r#"{"message":"bad key"}"#).await;
    let store = store_at(&base);

    let err = store.select_all().await.unwrap_err();
    server.await.expect("server");

    assert!(
        matches!(err, AppError::Remote(ref msg) if msg.starts_with("select returned 401")),
        "got {err}"
    );
}

#[tokio::test]
async fn unreachable_endpoint_is_remote_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let store = store_at(&format!("http://{addr}"));

    let err = store.delete(1).await.unwrap_err();

    assert!(matches!(err, AppError::Remote(_)), "got {err}");
}

#[test]
fn table_url_strips_trailing_slash() {
    let store = store_at("http://127.0.0.1:9/");
    assert_eq!(store.table_url(), "http://127.0.0.1:9/rest/v1/estimates");
    assert_eq!(store.table(), "estimates");
}
