use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::catalog::{ClientList, ClientRequest},
    error::AppResult,
    models::Client,
    response::{Ack, ApiResponse},
    routes::params::{Pagination, SearchQuery},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/search", get(search_clients))
        .route(
            "/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
}

#[utoipa::path(
    get,
    path = "/api/clients",
    params(Pagination),
    responses(
        (status = 200, description = "Clients ordered by name", body = ApiResponse<ClientList>)
    ),
    tag = "Catalog"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ClientList>>> {
    let resp = catalog_service::list_clients(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/clients/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Up to 10 clients whose name or phone starts with `q`", body = ApiResponse<ClientList>)
    ),
    tag = "Catalog"
)]
pub async fn search_clients(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<ClientList>>> {
    let resp = catalog_service::search_clients(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    params(
        ("id" = i32, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Get client", body = ApiResponse<Client>),
        (status = 404, description = "Client not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Client>>> {
    let resp = catalog_service::get_client(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    request_body = ClientRequest,
    responses(
        (status = 201, description = "Create client", body = ApiResponse<Client>),
        (status = 400, description = "Missing name"),
    ),
    tag = "Catalog"
)]
pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<ClientRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Client>>)> {
    let resp = catalog_service::create_client(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    params(
        ("id" = i32, Path, description = "Client ID")
    ),
    request_body = ClientRequest,
    responses(
        (status = 200, description = "Replace client", body = ApiResponse<Client>),
        (status = 400, description = "Missing name"),
        (status = 404, description = "Client not found"),
    ),
    tag = "Catalog"
)]
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ClientRequest>,
) -> AppResult<Json<ApiResponse<Client>>> {
    let resp = catalog_service::update_client(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    params(
        ("id" = i32, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Delete client", body = ApiResponse<Ack>),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Client is referenced by orders or invoices"),
    ),
    tag = "Catalog"
)]
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let resp = catalog_service::delete_client(&state, id).await?;
    Ok(Json(resp))
}
