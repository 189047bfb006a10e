use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Client, Invoice, InvoiceLine, InvoiceSummary};
use crate::workflow::{PaymentMethod, Unit};

#[derive(Debug, Deserialize, ToSchema)]
pub struct InvoiceLineInput {
    pub product_id: i32,
    #[schema(value_type = String)]
    pub quantity: Decimal,
    pub unit: Unit,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInvoiceRequest {
    pub client_id: Option<i32>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub lines: Vec<InvoiceLineInput>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceCreated {
    pub invoice_id: i32,
    #[schema(value_type = String)]
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub client: Client,
    pub lines: Vec<InvoiceLine>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct InvoiceList {
    #[schema(value_type = Vec<InvoiceSummary>)]
    pub items: Vec<InvoiceSummary>,
}
