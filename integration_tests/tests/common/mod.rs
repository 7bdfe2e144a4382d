use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use dockhand_common::config_manager::Config;
use serde_json::{json, Value};

pub const WORKSPACE_ID: &str = "workspacebbbx2ree3iykn8gc";
pub const LIVE_MACHINE: &str = "machinelive00000000000a";
pub const GONE_MACHINE: &str = "machinegone00000000000b";
pub const STOPPED_GONE_MACHINE: &str = "machinegone00000000000c";
pub const STUCK_MACHINE: &str = "machinestuck0000000000d";
pub const FLAKY_MACHINE: &str = "machineflaky0000000000e";

/// Everything the fake daemon was asked to do, in order.
#[derive(Clone, Default)]
pub struct DaemonLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl DaemonLog {
    pub fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct DaemonState {
    log: DaemonLog,
    containers: Value,
    failing_kills: Arc<HashSet<String>>,
}

pub fn container(id: &str, name: &str, status: &str) -> Value {
    json!({
        "Id": id,
        "Names": [format!("/{name}")],
        "Image": "eclipse/ubuntu_jdk8",
        "Status": status,
        "Labels": null,
        "Ports": null,
    })
}

pub fn machine_container_name(user: &str, machine_id: &str, machine_name: &str) -> String {
    dockhand_common::naming::encode(user, WORKSPACE_ID, machine_id, machine_name)
}

async fn list(State(state): State<DaemonState>) -> impl IntoResponse {
    state.log.record("list".to_string());
    Json(state.containers.clone())
}

async fn kill(State(state): State<DaemonState>, Path(id): Path<String>) -> impl IntoResponse {
    state.log.record(format!("kill {id}"));
    if state.failing_kills.contains(&id) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": format!("Cannot kill container {id}: permission denied")})),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn remove(State(state): State<DaemonState>, Path(id): Path<String>) -> impl IntoResponse {
    state.log.record(format!("remove {id}"));
    StatusCode::NO_CONTENT
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Fake Docker daemon serving `containers` from its list endpoint.
pub async fn spawn_docker(containers: Value, failing_kills: &[&str]) -> (SocketAddr, DaemonLog) {
    let log = DaemonLog::default();
    let state = DaemonState {
        log: log.clone(),
        containers,
        failing_kills: Arc::new(failing_kills.iter().map(|id| id.to_string()).collect()),
    };
    let app = Router::new()
        .route("/containers/json", get(list))
        .route("/containers/{id}/kill", post(kill))
        .route("/containers/{id}", delete(remove))
        .with_state(state);
    (serve(app).await, log)
}

async fn machine(Path(id): Path<String>) -> impl IntoResponse {
    match id.as_str() {
        LIVE_MACHINE => (StatusCode::OK, Json(json!({"id": id, "status": "RUNNING"}))),
        FLAKY_MACHINE => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "database is down"})),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": format!("Machine {id} not found")})),
        ),
    }
}

/// Fake workspace API that only knows [`LIVE_MACHINE`] and cannot answer for
/// [`FLAKY_MACHINE`].
pub async fn spawn_machine_api() -> SocketAddr {
    serve(Router::new().route("/api/machine/{id}", get(machine))).await
}

pub fn config_for(docker: SocketAddr, machine_api: Option<SocketAddr>) -> Config {
    Config {
        docker_endpoint: format!("tcp://{docker}"),
        docker_connect_timeout_secs: 5,
        docker_api_version: None,
        cleanup_period_min: 1,
        machine_api_endpoint: machine_api.map(|addr| format!("http://{addr}/api")),
        known_machines: vec![LIVE_MACHINE.to_string()],
        registry_auth: Default::default(),
        log_level: "debug".to_string(),
        log_file: None,
    }
}
