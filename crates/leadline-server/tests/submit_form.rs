use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use core::time::Duration;
use http_body_util::BodyExt;
use leadline::{
    CounterStore, FileSheetStore, HEADER, Intake, LeadForm, LeadPipeline, LeadReceipt,
    MemoryCounterStore, MemorySheetStore, RecordAppender, ResponseBuilder, SEQUENCE_KEY,
    SequenceAllocator, StoreError, StoreResult, SystemClock, Zone,
};
use leadline_server::server::{
    config::ServerConfig,
    service::{AppState, build_router},
};
use std::{path::Path, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;

const SHEET: &str = "Property Leads";
const MISSING_FIELDS: &str = "Please enter your name and WhatsApp number.";
const TRY_AGAIN: &str = "Something went wrong. Please try again.";

struct OfflineCounter;

impl CounterStore for OfflineCounter {
    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Ok(Some("4".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable {
            reason: "properties service down".to_string(),
        })
    }
}

struct CrashingIntake;

impl Intake for CrashingIntake {
    fn submit(&self, _form: &LeadForm) -> leadline::Result<LeadReceipt> {
        panic!("sheet client blew up mid-append");
    }
}

fn config(data_dir: &Path) -> ServerConfig {
    ServerConfig {
        server_addr: "127.0.0.1:0".to_string(),
        data_dir: data_dir.to_path_buf(),
        spreadsheet_id: "property-leads".to_string(),
        sheet_name: SHEET.to_string(),
        agent_digits: "60143317056".to_string(),
        message_prompt: leadline::DEFAULT_PROMPT.to_string(),
        zone: Zone::default(),
        lock_timeout: Duration::from_secs(1),
    }
}

fn file_router(data_dir: &Path) -> Router {
    build_router(AppState::from_config(&config(data_dir)).unwrap())
}

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (
        status,
        content_type,
        String::from_utf8(bytes.to_vec()).unwrap(),
    )
}

fn stored_rows(data_dir: &Path) -> Vec<Vec<String>> {
    FileSheetStore::open(data_dir, "property-leads")
        .unwrap()
        .rows(SHEET)
        .unwrap()
}

#[tokio::test]
async fn accepted_lead_redirects_to_agent_chat() {
    let data = TempDir::new().unwrap();
    let app = file_router(data.path());

    let (status, content_type, page) = send(
        &app,
        form_request("name=Ali&phone=012-345+6789&unit=B-12-3&strategy=own+stay"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(page.contains("Opening WhatsApp"));

    let rows = stored_rows(data.path());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], HEADER);
    let lead_id = &rows[1][1];
    assert!(lead_id.ends_with("-ZX01"), "unexpected lead id {lead_id}");
    assert_eq!(rows[1][2..], ["Ali", "60123456789", "B-12-3", "own stay"]);

    let message = format!("{}\nRef: {lead_id}", leadline::DEFAULT_PROMPT);
    let link = leadline::whatsapp_link("60143317056", &message);
    assert!(link.starts_with("https://wa.me/60143317056?text="));
    assert!(link.ends_with(&format!("Ref%3A%20{lead_id}")));
    assert!(page.contains(&format!(r#"<a href="{link}">tap here</a>"#)));
}

#[tokio::test]
async fn submissions_get_consecutive_references() {
    let data = TempDir::new().unwrap();
    let app = file_router(data.path());

    for name in ["Ali", "Siti", "Wei"] {
        let (status, _, page) =
            send(&app, form_request(&format!("name={name}&phone=0143317056"))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("Opening WhatsApp"));
    }

    let rows = stored_rows(data.path());
    assert_eq!(rows.len(), 4);
    for (row, suffix) in rows[1..].iter().zip(["ZX01", "ZX02", "ZX03"]) {
        assert!(row[1].ends_with(suffix), "{} should end with {suffix}", row[1]);
        assert_eq!(row[3], "60143317056");
    }
}

#[tokio::test]
async fn missing_fields_render_the_validation_page() {
    let data = TempDir::new().unwrap();
    let app = file_router(data.path());

    for body in ["phone=0123456789", "name=Ali", "name=+++&phone=0123456789", ""] {
        let (status, content_type, page) = send(&app, form_request(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
        assert!(page.contains(MISSING_FIELDS), "{body:?}");
        assert!(!page.contains("wa.me"));
    }

    assert!(!data.path().join("counters.json").exists());
    assert!(stored_rows(data.path()).is_empty());
}

#[tokio::test]
async fn unreadable_body_is_treated_as_missing_fields() {
    let data = TempDir::new().unwrap();
    let app = file_router(data.path());

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Ali","phone":"0123456789"}"#))
        .unwrap();
    let (status, _, page) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(page.contains(MISSING_FIELDS));
    assert!(stored_rows(data.path()).is_empty());
}

#[tokio::test]
async fn store_failure_renders_the_generic_page() {
    let sheet = Arc::new(MemorySheetStore::new());
    let pipeline = LeadPipeline::new(
        SequenceAllocator::new(OfflineCounter),
        RecordAppender::new(Arc::clone(&sheet), SHEET),
        SystemClock,
        Zone::default(),
    );
    let app = build_router(AppState::new(
        Arc::new(pipeline),
        ResponseBuilder::new("60143317056"),
    ));

    let (status, content_type, page) =
        send(&app, form_request("name=Ali&phone=0123456789")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(page.contains(TRY_AGAIN));
    assert!(page.contains("Please go back and try again."));
    assert!(!page.contains("properties service down"));
    assert_eq!(sheet.rows(SHEET), None);
}

#[tokio::test]
async fn panicking_submission_renders_the_generic_page() {
    let app = build_router(AppState::new(
        Arc::new(CrashingIntake),
        ResponseBuilder::new("60143317056"),
    ));

    let (status, content_type, page) =
        send(&app, form_request("name=Ali&phone=0123456789")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(page.contains(TRY_AGAIN));
    assert!(!page.contains("blew up"));
    assert!(!page.contains("panic"));
    assert!(!page.contains("wa.me"));
}

#[tokio::test]
async fn seeded_counter_continues_from_stored_value() {
    let counter = Arc::new(MemoryCounterStore::new().with_value(SEQUENCE_KEY, "4"));
    let sheet = Arc::new(MemorySheetStore::new());
    let pipeline = LeadPipeline::new(
        SequenceAllocator::new(Arc::clone(&counter)),
        RecordAppender::new(Arc::clone(&sheet), SHEET),
        SystemClock,
        Zone::default(),
    );
    let app = build_router(AppState::new(
        Arc::new(pipeline),
        ResponseBuilder::new("60143317056"),
    ));

    let (_, _, page) = send(&app, form_request("name=Ali&phone=0123456789")).await;

    assert_eq!(counter.value(SEQUENCE_KEY).as_deref(), Some("5"));
    let rows = sheet.rows(SHEET).unwrap();
    assert!(rows[1][1].ends_with("-ZX05"));
    assert!(page.contains(&format!("Ref%3A%20{}", rows[1][1])));
}

#[tokio::test]
async fn other_methods_fall_through_to_defaults() {
    let data = TempDir::new().unwrap();
    let app = file_router(data.path());

    let get = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, _, _) = send(&app, get).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/leads")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
