//! End-to-end tests of the paste operations against an in-process service.

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use rspb_client::{PasteClient, PasteOperations};
use rspb_core::error::ValidationError;
use rspb_core::forms::{
    CreateForm, DeleteForm, ExpireUnit, Expiration, FileUpload, ModifyForm, ViewForm,
};
use rspb_core::history::{HistoryEntry, HistoryStore, MemoryHistory};
use rspb_core::models::{Outcome, PasteInfo};
use rspb_core::status::{Panel, Status, StatusState, StatusView};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReceivedField {
    name: String,
    file_name: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
struct ReceivedRequest {
    method: String,
    path: String,
    key: Option<String>,
    fields: Vec<ReceivedField>,
}

impl ReceivedRequest {
    fn field(&self, name: &str) -> Option<&ReceivedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn text(&self, name: &str) -> Option<String> {
        self.field(name)
            .map(|f| String::from_utf8(f.bytes.clone()).expect("utf8 field"))
    }
}

#[derive(Clone, Default)]
struct MockService {
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
    replies: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
}

impl MockService {
    fn reply(&self, status: StatusCode, body: &str) {
        self.replies
            .lock()
            .expect("replies lock")
            .push_back((status, body.to_string()));
    }

    fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().expect("received lock").clone()
    }
}

async fn record(State(mock): State<MockService>, request: Request) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let key = request
        .headers()
        .get("key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let mut fields = Vec::new();
    if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .expect("multipart body");
        while let Some(field) = multipart.next_field().await.expect("next field") {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.expect("field bytes").to_vec();
            fields.push(ReceivedField {
                name,
                file_name,
                bytes,
            });
        }
    }

    mock.received
        .lock()
        .expect("received lock")
        .push(ReceivedRequest {
            method,
            path,
            key,
            fields,
        });

    let (status, body) = mock
        .replies
        .lock()
        .expect("replies lock")
        .pop_front()
        .unwrap_or((StatusCode::OK, r#"{"success":true}"#.to_string()));
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn spawn_service() -> (MockService, SocketAddr) {
    let mock = MockService::default();
    let app = Router::new().fallback(record).with_state(mock.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (mock, addr)
}

#[derive(Default)]
struct RecordingView {
    cards: Vec<(Panel, Status)>,
    histories: Vec<(Panel, Vec<HistoryEntry>)>,
}

impl RecordingView {
    fn last_card(&self) -> &(Panel, Status) {
        self.cards.last().expect("a card was rendered")
    }

    fn last_history(&self, panel: Panel) -> Option<&Vec<HistoryEntry>> {
        self.histories
            .iter()
            .rev()
            .find(|(p, _)| *p == panel)
            .map(|(_, entries)| entries)
    }
}

impl StatusView for RecordingView {
    fn update_card(&mut self, panel: Panel, status: &Status) {
        self.cards.push((panel, status.clone()));
    }

    fn show_history(&mut self, panel: Panel, entries: &[HistoryEntry]) {
        self.histories.push((panel, entries.to_vec()));
    }
}

type Ops = PasteOperations<MemoryHistory, RecordingView>;

fn operations_for(addr: SocketAddr, history: MemoryHistory) -> Ops {
    let client =
        PasteClient::new(&format!("http://{}", addr), Duration::from_secs(5)).expect("client");
    PasteOperations::new(client, HistoryStore::new(history), RecordingView::default())
}

const CREATED: &str =
    r#"{"success":true,"message":"","info":{"id":"abc123","key":"k1","expire_time":null}}"#;

fn seeded_history() -> MemoryHistory {
    let mut store = HistoryStore::new(MemoryHistory::new());
    for id in ["abc123", "keep01"] {
        store
            .add(PasteInfo {
                id: id.to_string(),
                key: "k1".to_string(),
                expire_time: None,
            })
            .expect("seed");
    }
    store.storage().clone()
}

#[tokio::test]
async fn create_text_caches_record_and_shows_id_and_key() {
    let (mock, addr) = spawn_service().await;
    mock.reply(StatusCode::OK, CREATED);
    let mut ops = operations_for(addr, MemoryHistory::new());

    let form = CreateForm {
        text: "hello".to_string(),
        ..CreateForm::default()
    };
    let outcome = ops.create(&form).await.expect("valid form");
    assert!(outcome.is_success());

    let received = mock.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].method, "POST");
    assert_eq!(received[0].path, "/");
    assert_eq!(received[0].key, None);
    assert_eq!(received[0].text("content").as_deref(), Some("hello"));
    assert!(received[0].field("content").expect("content").file_name.is_none());
    assert!(received[0].field("name").is_none());
    assert!(received[0].field("expire_after").is_none());

    let records = ops.history().list_all();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "abc123");
    assert_eq!(records[0].key, "k1");
    assert_eq!(records[0].expire_time, None);

    let ui = ops.into_ui();
    assert_eq!(ui.cards[0], (Panel::Create, Status::uploading()));
    let (panel, status) = ui.last_card();
    assert_eq!(*panel, Panel::Create);
    assert_eq!(status.state, StatusState::Success);
    assert!(status.message.contains("abc123"));
    assert!(status.message.contains("k1"));

    let delete_list = ui.last_history(Panel::Delete).expect("delete list rendered");
    assert_eq!(delete_list[0].fill.key.as_deref(), Some("k1"));
    let view_list = ui.last_history(Panel::View).expect("view list rendered");
    assert_eq!(view_list[0].fill.key, None);
}

#[tokio::test]
async fn create_empty_paste_never_touches_the_network() {
    let (mock, addr) = spawn_service().await;
    let mut ops = operations_for(addr, MemoryHistory::new());

    let err = ops
        .create(&CreateForm::default())
        .await
        .expect_err("empty paste must fail validation");
    assert_eq!(err, ValidationError::EmptyPaste);
    assert!(mock.received().is_empty());

    let ui = ops.into_ui();
    assert_eq!(ui.cards.len(), 1);
    let (panel, status) = ui.last_card();
    assert_eq!(*panel, Panel::Create);
    assert_eq!(status.state, StatusState::Failed);
    assert_eq!(status.label, "Warning");
    assert_eq!(status.message, "Cannot create empty paste.");
}

#[tokio::test]
async fn create_file_upload_sends_metadata_fields() {
    let (mock, addr) = spawn_service().await;
    mock.reply(
        StatusCode::OK,
        r#"{"success":true,"info":{"id":"f00bar","key":"k9","expire_time":"2030-01-01T00:00:00Z"}}"#,
    );
    let mut ops = operations_for(addr, MemoryHistory::new());

    let form = CreateForm {
        file: Some(FileUpload {
            file_name: "main.rs".to_string(),
            bytes: b"fn main() {}".to_vec(),
        }),
        name: "entrypoint".to_string(),
        expiration: Expiration::new("2", ExpireUnit::Days),
        ..CreateForm::default()
    };
    ops.create(&form).await.expect("valid form");

    let received = mock.received();
    let content = received[0].field("content").expect("content part");
    assert_eq!(content.file_name.as_deref(), Some("main.rs"));
    assert_eq!(content.bytes, b"fn main() {}".to_vec());
    assert_eq!(received[0].text("name").as_deref(), Some("entrypoint"));
    assert_eq!(received[0].text("expire_after").as_deref(), Some("2880"));

    let records = ops.history().list_all();
    assert!(records[0].expire_time.is_some());
    assert!(ops.ui().last_card().1.message.contains("Paste will expire at"));
}

#[tokio::test]
async fn create_rejected_by_server_leaves_history_alone() {
    let (mock, addr) = spawn_service().await;
    mock.reply(
        StatusCode::BAD_REQUEST,
        r#"{"success":false,"message":"Cannot create paste with no content.","info":null}"#,
    );
    let mut ops = operations_for(addr, MemoryHistory::new());

    let form = CreateForm {
        text: "x".to_string(),
        ..CreateForm::default()
    };
    let outcome = ops.create(&form).await.expect("valid form");
    assert_eq!(
        outcome,
        Outcome::Rejected {
            message: "Cannot create paste with no content.".to_string()
        }
    );
    assert!(ops.history().list_all().is_empty());
    let (_, status) = ops.ui().last_card();
    assert_eq!(status.label, "Failed");
    assert_eq!(status.message, "Cannot create paste with no content.");
}

#[tokio::test]
async fn create_success_without_info_is_malformed() {
    let (mock, addr) = spawn_service().await;
    mock.reply(StatusCode::OK, r#"{"success":true}"#);
    let mut ops = operations_for(addr, MemoryHistory::new());

    let form = CreateForm {
        text: "hello".to_string(),
        ..CreateForm::default()
    };
    let outcome = ops.create(&form).await.expect("valid form");
    assert!(matches!(outcome, Outcome::TransportFailed { .. }));
    assert!(ops.history().list_all().is_empty());
    assert_eq!(ops.ui().last_card().1.state, StatusState::Failed);
}

#[tokio::test]
async fn non_json_body_renders_parse_failure() {
    let (mock, addr) = spawn_service().await;
    mock.reply(StatusCode::OK, "<html>maintenance</html>");
    let mut ops = operations_for(addr, MemoryHistory::new());

    let form = CreateForm {
        text: "hello".to_string(),
        ..CreateForm::default()
    };
    let outcome = ops.create(&form).await.expect("valid form");
    let error = outcome.failure_message().expect("failure");
    assert!(error.starts_with("Malformed response"), "error: {}", error);
    assert_eq!(ops.ui().last_card().1.message, error);
}

#[tokio::test]
async fn unreachable_server_renders_transport_failure() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr")
    };
    let mut ops = operations_for(addr, seeded_history());

    let form = DeleteForm {
        id: "abc123".to_string(),
        key: "k1".to_string(),
    };
    let outcome = ops.delete(&form).await.expect("valid form");
    assert!(matches!(outcome, Outcome::TransportFailed { .. }));
    assert_eq!(ops.history().list_all().len(), 2);

    let (panel, status) = ops.ui().last_card();
    assert_eq!(*panel, Panel::Delete);
    assert_eq!(status.label, "Failed");
    assert!(!status.message.is_empty());
}

#[tokio::test]
async fn modify_sends_key_header_and_replacement_text() {
    let (mock, addr) = spawn_service().await;
    mock.reply(StatusCode::OK, r#"{"success":true,"message":"","info":null}"#);
    let mut ops = operations_for(addr, MemoryHistory::new());

    let form = ModifyForm {
        id: "abc123".to_string(),
        key: "k1".to_string(),
        text: "bye".to_string(),
        ..ModifyForm::default()
    };
    let outcome = ops.modify(&form).await.expect("valid form");
    assert!(outcome.is_success());

    let received = mock.received();
    assert_eq!(received[0].method, "PUT");
    assert_eq!(received[0].path, "/abc123");
    assert_eq!(received[0].key.as_deref(), Some("k1"));
    assert_eq!(received[0].text("content").as_deref(), Some("bye"));

    let ui = ops.into_ui();
    assert_eq!(ui.cards[0], (Panel::Modify, Status::working()));
    assert_eq!(*ui.last_card(), (Panel::Modify, Status::updated()));
}

#[tokio::test]
async fn modify_with_bad_key_shows_server_message() {
    let (mock, addr) = spawn_service().await;
    mock.reply(
        StatusCode::BAD_REQUEST,
        r#"{"success":false,"message":"bad key","info":null}"#,
    );
    let mut ops = operations_for(addr, seeded_history());

    let form = ModifyForm {
        id: "abc123".to_string(),
        key: "wrong".to_string(),
        text: "bye".to_string(),
        ..ModifyForm::default()
    };
    let outcome = ops.modify(&form).await.expect("valid form");
    assert_eq!(outcome.failure_message(), Some("bad key"));
    assert_eq!(*ops.ui().last_card(), (Panel::Modify, Status::failed("bad key")));
    assert_eq!(ops.history().list_all().len(), 2);
}

#[tokio::test]
async fn modify_without_key_is_rejected_locally() {
    let (mock, addr) = spawn_service().await;
    let mut ops = operations_for(addr, MemoryHistory::new());

    let form = ModifyForm {
        id: "abc123".to_string(),
        text: "bye".to_string(),
        ..ModifyForm::default()
    };
    assert_eq!(
        ops.modify(&form).await.expect_err("missing key"),
        ValidationError::MissingKey
    );
    assert!(mock.received().is_empty());
}

#[tokio::test]
async fn delete_success_removes_record_from_history_lists() {
    let (mock, addr) = spawn_service().await;
    mock.reply(StatusCode::OK, r#"{"success":true,"message":"","info":null}"#);
    let mut ops = operations_for(addr, seeded_history());

    let form = DeleteForm {
        id: "abc123".to_string(),
        key: "k1".to_string(),
    };
    let outcome = ops.delete(&form).await.expect("valid form");
    assert!(outcome.is_success());

    let received = mock.received();
    assert_eq!(received[0].method, "DELETE");
    assert_eq!(received[0].path, "/abc123");
    assert_eq!(received[0].key.as_deref(), Some("k1"));
    assert!(received[0].fields.is_empty());

    let records = ops.history().list_all();
    assert!(records.iter().all(|r| r.id != "abc123"));
    assert_eq!(records.len(), 1);

    let ui = ops.into_ui();
    assert_eq!(*ui.last_card(), (Panel::Delete, Status::deleted()));
    for panel in Panel::HISTORY_PANELS {
        let list = ui.last_history(panel).expect("list rendered");
        assert!(list.iter().all(|entry| entry.fill.id != "abc123"));
        assert_eq!(list.len(), 1);
    }
}

#[tokio::test]
async fn delete_rejected_keeps_record() {
    let (mock, addr) = spawn_service().await;
    mock.reply(
        StatusCode::FORBIDDEN,
        r#"{"success":false,"message":"Forbidden: Bad Key","info":null}"#,
    );
    let mut ops = operations_for(addr, seeded_history());

    let form = DeleteForm {
        id: "abc123".to_string(),
        key: "nope".to_string(),
    };
    ops.delete(&form).await.expect("valid form");
    assert_eq!(ops.history().list_all().len(), 2);
    assert_eq!(ops.ui().last_card().1.message, "Forbidden: Bad Key");
    assert!(ops.ui().histories.is_empty());
}

#[tokio::test]
async fn view_builds_url_and_fetch_downloads_content() {
    let (mock, addr) = spawn_service().await;
    mock.reply(StatusCode::OK, "hello world");
    let mut ops = operations_for(addr, MemoryHistory::new());

    let url = ops
        .view(&ViewForm {
            id: "abc123".to_string(),
            ext: "rs".to_string(),
        })
        .expect("view url");
    assert_eq!(url.as_str(), format!("http://{}/abc123/rs", addr));
    assert!(mock.received().is_empty());

    let bytes = ops.client().fetch(url).await.expect("fetch");
    assert_eq!(bytes, b"hello world".to_vec());
    assert_eq!(mock.received()[0].method, "GET");

    assert!(ops.view(&ViewForm::default()).is_err());
    assert_eq!(ops.ui().last_card().0, Panel::View);
}

#[tokio::test]
async fn fetch_reports_error_status() {
    let (mock, addr) = spawn_service().await;
    mock.reply(StatusCode::NOT_FOUND, "404 Not Found");
    let ops = operations_for(addr, MemoryHistory::new());

    let url = ops.client().url_for(&["zzzzzz"]).expect("url");
    let err = ops.client().fetch(url).await.expect_err("404");
    assert!(err.to_string().contains("404"));
}
