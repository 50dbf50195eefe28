//! Stub extraction backend.
//!
//! Serves `/health`, `/upload` and `/process/{id}` with configurable
//! responses, and records every request it receives so tests can assert on
//! what the client sent and in which order.

use std::net::TcpListener as StdTcpListener;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::runtime::Builder;
use tokio::sync::oneshot;

/// Status and raw body returned for one endpoint.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StubConfig {
    pub health: StubResponse,
    pub upload: StubResponse,
    pub process: StubResponse,
    /// When set, `/upload` records whether this file existed at request time.
    pub watch_fixture: Option<PathBuf>,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            health: StubResponse::json(200, json!({"status": "healthy"})),
            upload: StubResponse::json(200, json!({"document_id": "doc-123"})),
            process: StubResponse::json(200, json!({"fields": example_fields()})),
            watch_fixture: None,
        }
    }
}

/// The field payload a correct backend returns for the bundled report.
pub fn example_fields() -> Value {
    json!({
        "primary_site": {
            "value": "Right upper lobe of lung",
            "source_snippet": "Primary Site: Right upper lobe of lung",
            "exact_source_text": "Right upper lobe of lung",
            "confidence": 0.95,
            "extraction_type": "exact"
        },
        "histology": {
            "value": "Invasive ductal adenocarcinoma, grade 2",
            "source_snippet": "Histologic Type: Invasive ductal adenocarcinoma, grade 2",
            "exact_source_text": "Invasive ductal adenocarcinoma, grade 2",
            "confidence": 0.92,
            "extraction_type": "exact"
        },
        "clinical_t": {
            "value": "T2",
            "source_snippet": "- Clinical T: T2",
            "exact_source_text": "T2",
            "confidence": 0.98,
            "extraction_type": "exact"
        }
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    Health,
    Upload {
        file_name: Option<String>,
        content_type: Option<String>,
        content: String,
        patient_id: Option<String>,
        fixture_existed: Option<bool>,
    },
    Process {
        document_id: String,
        body: Value,
    },
}

#[derive(Clone)]
struct StubState {
    config: Arc<StubConfig>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubState {
    fn record(&self, request: RecordedRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
    }
}

/// Handle for a running stub. The server shuts down on drop.
pub struct StubBackend {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubBackend {
    pub fn spawn() -> Self {
        Self::spawn_with(StubConfig::default())
    }

    pub fn spawn_with(config: StubConfig) -> Self {
        let listener = StdTcpListener::bind("127.0.0.1:0").expect("stub bind failed");
        listener
            .set_nonblocking(true)
            .expect("stub listener nonblocking failed");
        let addr = listener.local_addr().expect("stub local addr failed");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            config: Arc::new(config),
            requests: Arc::clone(&requests),
        };
        let app = Router::new()
            .route("/health", get(handle_health))
            .route("/upload", post(handle_upload))
            .route("/process/{document_id}", post(handle_process))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let join = thread::spawn(move || {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("stub runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("stub tokio listener");
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });
                let _ = server.await;
            });
        });

        Self {
            base_url: format!("http://{}", addr),
            shutdown: Some(shutdown_tx),
            join: Some(join),
            requests,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn upload_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| matches!(r, RecordedRequest::Upload { .. }))
            .count()
    }

    pub fn process_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| matches!(r, RecordedRequest::Process { .. }))
            .count()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn respond(response: &StubResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body.clone(),
    )
        .into_response()
}

async fn handle_health(State(state): State<StubState>) -> Response {
    state.record(RecordedRequest::Health);
    respond(&state.config.health)
}

async fn handle_upload(State(state): State<StubState>, mut multipart: Multipart) -> Response {
    let fixture_existed = state.config.watch_fixture.as_ref().map(|p| p.exists());

    let mut file_name = None;
    let mut content_type = None;
    let mut content = String::new();
    let mut patient_id = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                content = field.text().await.unwrap_or_default();
            }
            Some("patient_id") => {
                patient_id = field.text().await.ok();
            }
            _ => {}
        }
    }

    state.record(RecordedRequest::Upload {
        file_name,
        content_type,
        content,
        patient_id,
        fixture_existed,
    });
    respond(&state.config.upload)
}

async fn handle_process(
    State(state): State<StubState>,
    Path(document_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.record(RecordedRequest::Process { document_id, body });
    respond(&state.config.process)
}
