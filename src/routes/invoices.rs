use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::invoices::{CreateInvoiceRequest, InvoiceCreated, InvoiceDetail, InvoiceList},
    error::AppResult,
    response::ApiResponse,
    routes::params::SalesQuery,
    services::invoice_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/{id}", get(get_invoice))
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("from" = Option<String>, Query, description = "Inclusive start date, YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "Inclusive end date, YYYY-MM-DD"),
        ("q" = Option<String>, Query, description = "Fragment of the client name, or an exact invoice id")
    ),
    responses(
        (status = 200, description = "Sales history, newest first", body = ApiResponse<InvoiceList>),
        (status = 400, description = "Invalid date range"),
    ),
    tag = "Invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> AppResult<Json<ApiResponse<InvoiceList>>> {
    let resp = invoice_service::list_invoices(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created from explicit lines", body = ApiResponse<InvoiceCreated>),
        (status = 400, description = "Missing client or invalid lines"),
        (status = 404, description = "Client not found"),
    ),
    tag = "Invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<InvoiceCreated>>)> {
    let resp = invoice_service::create_invoice_from_items(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    params(
        ("id" = i32, Path, description = "Invoice ID")
    ),
    responses(
        (status = 200, description = "Invoice with client and lines", body = ApiResponse<InvoiceDetail>),
        (status = 404, description = "Invoice not found"),
    ),
    tag = "Invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<InvoiceDetail>>> {
    let resp = invoice_service::get_invoice(&state, id).await?;
    Ok(Json(resp))
}
