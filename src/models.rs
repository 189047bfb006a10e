use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::workflow::{ItemStatus, OrderStatus, PaymentMethod, TableStatus, Unit};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiningTable {
    pub id: i32,
    pub number: String,
    pub description: Option<String>,
    pub status: TableStatus,
    pub created_at: DateTime<Utc>,
}

/// A table as listed for the floor view, with its live order count.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct TableWithOccupancy {
    pub id: i32,
    pub number: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TableStatus,
    pub open_orders: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i32,
    pub table_id: i32,
    pub client_id: Option<i32>,
    pub status: OrderStatus,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub product_name: String,
    #[schema(value_type = String)]
    pub quantity: Decimal,
    #[sqlx(try_from = "String")]
    pub unit: Unit,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[sqlx(try_from = "String")]
    pub status: ItemStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub preparing_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub served_at: Option<DateTime<Utc>>,
}

/// One entry of the kitchen preparation queue.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct QueueItem {
    pub item_id: i32,
    pub order_id: i32,
    pub table_id: i32,
    pub table_number: String,
    pub product_name: String,
    #[schema(value_type = String)]
    pub quantity: Decimal,
    #[sqlx(try_from = "String")]
    pub unit: Unit,
    #[sqlx(try_from = "String")]
    pub status: ItemStatus,
    pub note: Option<String>,
    /// Moment the item entered the kitchen; the queue is ordered by it.
    pub queued_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Invoice {
    pub id: i32,
    pub client_id: i32,
    pub order_id: Option<i32>,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct InvoiceLine {
    pub product_id: i32,
    pub product_name: String,
    #[schema(value_type = String)]
    pub quantity: Decimal,
    #[sqlx(try_from = "String")]
    pub unit: Unit,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
}

/// Sales history row.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct InvoiceSummary {
    pub id: i32,
    pub client_id: i32,
    pub client_name: String,
    pub order_id: Option<i32>,
    #[schema(value_type = String)]
    pub total: Decimal,
    #[sqlx(try_from = "String")]
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Product {
    pub id: i32,
    pub code: String,
    pub name: String,
    #[schema(value_type = String)]
    pub price_kg: Decimal,
    #[schema(value_type = String)]
    pub price_unit: Decimal,
    #[schema(value_type = String)]
    pub price_lb: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}
