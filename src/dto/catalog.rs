use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Client, Product};

/// Body for creating a product or replacing one in full.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub code: String,
    pub name: String,
    #[schema(value_type = Option<String>)]
    pub price_kg: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub price_unit: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub price_lb: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClientRequest {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ClientList {
    #[schema(value_type = Vec<Client>)]
    pub items: Vec<Client>,
}
