use axum::Router;

use crate::state::AppState;

pub mod clients;
pub mod doc;
pub mod health;
pub mod invoices;
pub mod items;
pub mod kitchen;
pub mod orders;
pub mod params;
pub mod products;
pub mod tables;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/tables", tables::router())
        .nest("/orders", orders::router())
        .nest("/items", items::router())
        .nest("/kitchen", kitchen::router())
        .nest("/invoices", invoices::router())
        .nest("/products", products::router())
        .nest("/clients", clients::router())
}
