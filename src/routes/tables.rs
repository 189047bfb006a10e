use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};

use crate::{
    dto::tables::{CreateTableRequest, OpenOrderRequest, TableList},
    error::{AppError, AppResult},
    models::{DiningTable, Order},
    response::{Ack, ApiResponse},
    services::{order_service, table_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tables).post(create_table))
        .route("/{id}/orders", post(open_order))
        .route("/{id}/release", put(release_table))
}

#[utoipa::path(
    get,
    path = "/api/tables",
    responses(
        (status = 200, description = "Floor view with live occupancy", body = ApiResponse<TableList>),
        (status = 503, description = "Store unavailable"),
    ),
    tag = "Tables"
)]
pub async fn list_tables(State(state): State<AppState>) -> AppResult<Json<ApiResponse<TableList>>> {
    let resp = table_service::list_tables(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 201, description = "Table created", body = ApiResponse<DiningTable>),
        (status = 400, description = "Missing table number"),
        (status = 409, description = "Table number already exists"),
    ),
    tag = "Tables"
)]
pub async fn create_table(
    State(state): State<AppState>,
    Json(payload): Json<CreateTableRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DiningTable>>)> {
    let resp = table_service::create_table(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/tables/{id}/orders",
    params(
        ("id" = i32, Path, description = "Table ID")
    ),
    request_body(content = OpenOrderRequest, description = "Optional client and note"),
    responses(
        (status = 200, description = "The table's open order, created if needed", body = ApiResponse<Order>),
        (status = 404, description = "Table or client not found"),
        (status = 409, description = "Lock contention, retry"),
    ),
    tag = "Tables"
)]
pub async fn open_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<Order>>> {
    // The body is optional; an empty request opens an order with no client.
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        OpenOrderRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))?
    };
    let resp = order_service::open_or_get_order(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/tables/{id}/release",
    params(
        ("id" = i32, Path, description = "Table ID")
    ),
    responses(
        (status = 200, description = "Table released", body = ApiResponse<Ack>),
        (status = 404, description = "Table not found"),
        (status = 409, description = "Table still has active items"),
    ),
    tag = "Tables"
)]
pub async fn release_table(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let resp = order_service::release_table(&state, id).await?;
    Ok(Json(resp))
}
