use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, put},
};

use crate::{
    error::AppResult,
    response::{Ack, ApiResponse},
    services::{kitchen_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(remove_item))
        .route("/{id}/send", put(send_to_kitchen))
        .route("/{id}/serve", put(mark_served))
        .route("/{id}/cancel", put(cancel_item))
}

#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    params(
        ("id" = i32, Path, description = "Order item ID")
    ),
    responses(
        (status = 200, description = "Pending item removed", body = ApiResponse<Ack>),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Item already left pending"),
    ),
    tag = "Items"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let resp = order_service::remove_item(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}/send",
    params(
        ("id" = i32, Path, description = "Order item ID")
    ),
    responses(
        (status = 200, description = "Item sent to the kitchen", body = ApiResponse<Ack>),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Item is past the kitchen hand-off"),
    ),
    tag = "Items"
)]
pub async fn send_to_kitchen(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let resp = kitchen_service::send_to_kitchen(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}/serve",
    params(
        ("id" = i32, Path, description = "Order item ID")
    ),
    responses(
        (status = 200, description = "Item served", body = ApiResponse<Ack>),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Item is not ready"),
    ),
    tag = "Items"
)]
pub async fn mark_served(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let resp = kitchen_service::mark_served(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}/cancel",
    params(
        ("id" = i32, Path, description = "Order item ID")
    ),
    responses(
        (status = 200, description = "Item cancelled", body = ApiResponse<Ack>),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Item already served or cancelled"),
    ),
    tag = "Items"
)]
pub async fn cancel_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let resp = order_service::cancel_item(&state, id).await?;
    Ok(Json(resp))
}
