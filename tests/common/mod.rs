//! Shared utilities for integration tests.
//!
//! `MockCollaborators` serves the extraction, transformation, reconstruction
//! and content-store endpoints from one axum server on an ephemeral port.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use intercept_callback::config::{ServiceConfig, StoreBackend};

#[derive(Default)]
pub struct Counters {
    pub extract_calls: AtomicUsize,
    pub transform_calls: AtomicUsize,
    pub reconstruct_calls: AtomicUsize,
    pub keyed_calls: AtomicUsize,
    pub store_calls: AtomicUsize,
}

#[derive(Default)]
struct StoreState {
    keys: HashMap<(String, String), String>,
    artifacts: HashMap<String, String>,
}

#[derive(Clone, Default)]
struct MockState {
    counters: Arc<Counters>,
    store: Arc<Mutex<StoreState>>,
    extract_delay: Duration,
}

pub struct MockCollaborators {
    pub addr: SocketAddr,
    pub counters: Arc<Counters>,
}

impl MockCollaborators {
    pub async fn start() -> Self {
        Self::start_with_extract_delay(Duration::ZERO).await
    }

    /// Like `start`, but the extractor sleeps before answering.
    pub async fn start_with_extract_delay(extract_delay: Duration) -> Self {
        let state = MockState {
            extract_delay,
            ..MockState::default()
        };
        let counters = state.counters.clone();

        let app = Router::new()
            .route("/extract", post(extract))
            .route("/reconstruct", post(reconstruct))
            .route("/transform/{engine}", post(transform))
            .route("/store/keyed", post(store_keyed))
            .route("/store/store", post(store_artifact))
            .route("/store/retrieve", post(retrieve_artifact))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, counters }
    }

    /// Service config pointing every collaborator and the store at this mock.
    pub fn config(&self) -> ServiceConfig {
        let base = format!("http://{}", self.addr);
        let mut config = ServiceConfig::default();
        config.collaborators.extraction_url = format!("{base}/extract");
        config.collaborators.transformation_url = base.clone();
        config.collaborators.reconstruction_url = format!("{base}/reconstruct");
        config.collaborators.timeout_secs = 5;
        config.store.backend = StoreBackend::Http;
        config.store.url = format!("{base}/store");
        config.store.timeout_secs = 5;
        config
    }

    pub fn extract_calls(&self) -> usize {
        self.counters.extract_calls.load(Ordering::SeqCst)
    }

    pub fn transform_calls(&self) -> usize {
        self.counters.transform_calls.load(Ordering::SeqCst)
    }

    pub fn reconstruct_calls(&self) -> usize {
        self.counters.reconstruct_calls.load(Ordering::SeqCst)
    }
}

/// Splits markup into tag and text tokens; text runs become fragments.
async fn extract(State(state): State<MockState>, body: String) -> Json<Value> {
    state.counters.extract_calls.fetch_add(1, Ordering::SeqCst);
    if !state.extract_delay.is_zero() {
        tokio::time::sleep(state.extract_delay).await;
    }

    let mut structure = Vec::new();
    let mut fragments = BTreeMap::new();
    let mut rest = body.as_str();
    while !rest.is_empty() {
        if rest.starts_with('<') {
            let end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
            structure.push(json!({"tag": &rest[..end]}));
            rest = &rest[end..];
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            let id = format!("h{}", fragments.len());
            fragments.insert(id.clone(), rest[..end].to_string());
            structure.push(json!({"text": id}));
            rest = &rest[end..];
        }
    }
    Json(json!({"structure": structure, "fragments": fragments}))
}

async fn reconstruct(State(state): State<MockState>, Json(request): Json<Value>) -> String {
    state.counters.reconstruct_calls.fetch_add(1, Ordering::SeqCst);

    let fragments = &request["fragments"];
    request["structure"]
        .as_array()
        .map(|nodes| {
            nodes
                .iter()
                .map(|node| match node.get("tag") {
                    Some(tag) => tag.as_str().unwrap_or_default().to_string(),
                    None => {
                        let id = node["text"].as_str().unwrap_or_default();
                        fragments[id].as_str().unwrap_or_default().to_string()
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `roundtrip` is wired to fail so error paths can be exercised.
async fn transform(
    State(state): State<MockState>,
    Path(engine): Path<String>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.counters.transform_calls.fetch_add(1, Ordering::SeqCst);
    if engine == "roundtrip" {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "error_message": "engine unavailable"})),
        );
    }

    let glyph = match request["visual"].as_str() {
        Some("xxx") => Some('x'),
        Some("hashes") => Some('#'),
        _ => None,
    };
    let fragments: BTreeMap<String, String> = request["fragments"]
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(id, text)| {
                    let text = text.as_str().unwrap_or_default();
                    let out = match glyph {
                        Some(g) => text
                            .chars()
                            .map(|c| if c.is_whitespace() { c } else { g })
                            .collect(),
                        None => text.to_string(),
                    };
                    (id.clone(), out)
                })
                .collect()
        })
        .unwrap_or_default();

    let total = fragments.len();
    (
        StatusCode::OK,
        Json(json!({
            "fragments": fragments,
            "success": true,
            "total": total,
            "transformed": total,
        })),
    )
}

fn artifact_key(request: &Value) -> String {
    ["namespace", "id", "data_key", "data_file_id"]
        .iter()
        .map(|k| request[*k].as_str().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("|")
}

async fn store_keyed(State(state): State<MockState>, Json(request): Json<Value>) -> Json<Value> {
    state.counters.keyed_calls.fetch_add(1, Ordering::SeqCst);
    let mut store = state.store.lock().unwrap();
    let key = (
        request["namespace"].as_str().unwrap_or_default().to_string(),
        request["key"].as_str().unwrap_or_default().to_string(),
    );
    let next = store.keys.len() + 1;
    let id = store
        .keys
        .entry(key)
        .or_insert_with(|| format!("page-{next}"))
        .clone();
    Json(json!({"id": id}))
}

async fn store_artifact(State(state): State<MockState>, Json(request): Json<Value>) -> StatusCode {
    state.counters.store_calls.fetch_add(1, Ordering::SeqCst);
    let payload = request["payload"].as_str().unwrap_or_default().to_string();
    state
        .store
        .lock()
        .unwrap()
        .artifacts
        .insert(artifact_key(&request), payload);
    StatusCode::NO_CONTENT
}

/// Misses answer with the `NOT_FOUND` sentinel rather than a 404.
async fn retrieve_artifact(State(state): State<MockState>, Json(request): Json<Value>) -> String {
    state
        .store
        .lock()
        .unwrap()
        .artifacts
        .get(&artifact_key(&request))
        .cloned()
        .unwrap_or_else(|| "NOT_FOUND".to_string())
}
