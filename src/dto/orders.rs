use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem};
use crate::workflow::{PaymentMethod, Unit};

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemRequest {
    pub product_id: i32,
    #[schema(value_type = String)]
    pub quantity: Decimal,
    pub unit: Unit,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemCreated {
    pub item_id: i32,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveOrderRequest {
    pub destination_table_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderMoved {
    pub order_id: i32,
    pub origin_table_id: i32,
    pub destination_table_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CloseOrderRequest {
    pub client_id: Option<i32>,
    pub payment_method: PaymentMethod,
}
