use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::TableWithOccupancy;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    pub number: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OpenOrderRequest {
    pub client_id: Option<i32>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TableList {
    #[schema(value_type = Vec<TableWithOccupancy>)]
    pub items: Vec<TableWithOccupancy>,
}
