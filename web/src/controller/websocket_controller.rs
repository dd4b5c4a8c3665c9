use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use entity::{Id, Task};
use log::*;
use serde::Serialize;
use utoipa::ToSchema;
use ws::Delivery;

use crate::controller::ApiResponse;
use crate::params::websocket::{BroadcastParams, TestTaskUpdateParams};
use crate::{AppState, Error};

/// Status reported with every manual `SYSTEM_STATUS` broadcast.
const TEST_STATUS: &str = "TEST";
const TEST_TASK_DESCRIPTION: &str = "This is a test task update";

#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionStatus {
    pub active_connections: usize,
}

/// Outcome of a diagnostic broadcast.
#[derive(Debug, Serialize, ToSchema)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub evicted: usize,
    pub degraded: bool,
    /// Live connections remaining after eviction.
    pub active_connections: usize,
}

impl BroadcastReport {
    fn new(delivery: Delivery, active_connections: usize) -> Self {
        Self {
            delivered: delivery.delivered,
            evicted: delivery.evicted,
            degraded: delivery.degraded,
            active_connections,
        }
    }
}

/// GET the number of live WebSocket connections
#[utoipa::path(
    get,
    path = "/websocket/status",
    responses(
        (status = 200, description = "Current connection count", body = ConnectionStatus),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn status(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let active_connections = app_state.hub_ref().active_connections();
    debug!("WebSocket status requested: {active_connections} active");

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        ConnectionStatus { active_connections },
    )))
}

/// GET broadcast a PING to every connected client
#[utoipa::path(
    get,
    path = "/websocket/ping",
    responses(
        (status = 200, description = "PING broadcast", body = BroadcastReport),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn ping(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let hub = app_state.hub_ref();
    let delivery = hub.ping();
    info!("Sent PING to {} connection(s)", delivery.delivered);

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        BroadcastReport::new(delivery, hub.active_connections()),
    )))
}

/// POST broadcast a SYSTEM_STATUS message to every connected client
#[utoipa::path(
    post,
    path = "/websocket/broadcast",
    params(BroadcastParams),
    responses(
        (status = 200, description = "SYSTEM_STATUS broadcast", body = BroadcastReport),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn broadcast(
    State(app_state): State<AppState>,
    Query(params): Query<BroadcastParams>,
) -> Result<impl IntoResponse, Error> {
    let hub = app_state.hub_ref();
    let delivery = hub.system_status(TEST_STATUS, &params.message);
    info!(
        "Broadcast test message to {} connection(s): {}",
        delivery.delivered, params.message
    );

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        BroadcastReport::new(delivery, hub.active_connections()),
    )))
}

/// POST broadcast a TASK_UPDATE for a synthetic task under the given event
#[utoipa::path(
    post,
    path = "/websocket/test-task-update/{event_id}",
    params(
        ("event_id" = String, Path, description = "Event the synthetic task belongs to"),
        TestTaskUpdateParams,
    ),
    responses(
        (status = 200, description = "TASK_UPDATE broadcast", body = BroadcastReport),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn test_task_update(
    State(app_state): State<AppState>,
    Path(event_id): Path<String>,
    Query(params): Query<TestTaskUpdateParams>,
) -> Result<impl IntoResponse, Error> {
    let task = Task {
        id: Id::new_v4(),
        title: Some(params.title),
        description: Some(TEST_TASK_DESCRIPTION.to_string()),
        completed: false,
        ..Default::default()
    };
    debug!("Broadcasting synthetic TASK_UPDATE {} for event {event_id}", task.id);

    let hub = app_state.hub_ref();
    let delivery = hub.task_updated(&event_id, task);

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        BroadcastReport::new(delivery, hub.active_connections()),
    )))
}
