use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};

use crate::{
    dto::invoices::InvoiceCreated,
    dto::orders::{AddItemRequest, CloseOrderRequest, ItemCreated, MoveOrderRequest, OrderMoved, OrderWithItems},
    error::AppResult,
    response::ApiResponse,
    services::{invoice_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(get_order))
        .route("/{id}/items", post(add_item))
        .route("/{id}/move", put(move_order))
        .route("/{id}/invoice", post(close_with_invoice))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with its items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order_with_items(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/items",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    request_body = AddItemRequest,
    responses(
        (status = 201, description = "Item added as pending", body = ApiResponse<ItemCreated>),
        (status = 400, description = "Invalid quantity or price"),
        (status = 404, description = "Order or product not found"),
        (status = 409, description = "Order is not open"),
    ),
    tag = "Orders"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<AddItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ItemCreated>>)> {
    let resp = order_service::add_item(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/move",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    request_body = MoveOrderRequest,
    responses(
        (status = 200, description = "Order moved", body = ApiResponse<OrderMoved>),
        (status = 400, description = "Destination is the current table"),
        (status = 404, description = "Order or table not found"),
        (status = 409, description = "Destination occupied or order not open"),
    ),
    tag = "Orders"
)]
pub async fn move_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<MoveOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderMoved>>> {
    let resp = order_service::move_order(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/invoice",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    request_body = CloseOrderRequest,
    responses(
        (status = 201, description = "Order closed and invoiced", body = ApiResponse<InvoiceCreated>),
        (status = 400, description = "Missing client or nothing to bill"),
        (status = 404, description = "Order or client not found"),
        (status = 409, description = "Order already closed"),
    ),
    tag = "Orders"
)]
pub async fn close_with_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CloseOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<InvoiceCreated>>)> {
    let resp = invoice_service::close_order_with_invoice(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
