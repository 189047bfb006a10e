use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};

use crate::{
    dto::kitchen::{AdvanceItemRequest, QueueList},
    error::AppResult,
    response::{Ack, ApiResponse},
    services::kitchen_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue", get(list_queue))
        .route("/items/{id}/status", put(advance_item))
}

#[utoipa::path(
    get,
    path = "/api/kitchen/queue",
    responses(
        (status = 200, description = "Items awaiting or in preparation, oldest first", body = ApiResponse<QueueList>),
    ),
    tag = "Kitchen"
)]
pub async fn list_queue(State(state): State<AppState>) -> AppResult<Json<ApiResponse<QueueList>>> {
    let resp = kitchen_service::list_queue(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/kitchen/items/{id}/status",
    params(
        ("id" = i32, Path, description = "Order item ID")
    ),
    request_body = AdvanceItemRequest,
    responses(
        (status = 200, description = "Item advanced", body = ApiResponse<Ack>),
        (status = 400, description = "Target is not preparing or ready"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Item is not in the preceding state"),
    ),
    tag = "Kitchen"
)]
pub async fn advance_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<AdvanceItemRequest>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let resp = kitchen_service::advance(&state, id, payload.status).await?;
    Ok(Json(resp))
}
