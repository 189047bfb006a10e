//! Status enumerations for tables, orders and order items, together with the
//! transition tables that every state-changing query is conditioned on.
//!
//! The datastore keeps these values as lowercase TEXT. SeaORM maps the entity
//! columns through `DeriveActiveEnum`; the `TryFrom<String>` impls serve the
//! sqlx read models.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[sea_orm(string_value = "free")]
    Free,
    #[sea_orm(string_value = "occupied")]
    Occupied,
}

impl TableStatus {
    /// Occupancy derived from the number of non-terminal orders on a table.
    pub fn from_open_orders(count: u64) -> Self {
        if count > 0 {
            TableStatus::Occupied
        } else {
            TableStatus::Free
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Statuses that keep a table occupied.
    pub const NON_TERMINAL: &'static [OrderStatus] = &[OrderStatus::Open];

    pub fn is_terminal(self) -> bool {
        !Self::NON_TERMINAL.contains(&self)
    }

    /// Text values for binding into hand-written sqlx queries.
    pub fn non_terminal_values() -> Vec<String> {
        Self::NON_TERMINAL.iter().map(|s| s.to_value()).collect()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "preparing")]
    Preparing,
    #[sea_orm(string_value = "ready")]
    Ready,
    #[sea_orm(string_value = "served")]
    Served,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl ItemStatus {
    /// Items visible to the kitchen.
    pub const QUEUED: &'static [ItemStatus] =
        &[ItemStatus::Sent, ItemStatus::Preparing, ItemStatus::Ready];

    /// Statuses from which `self` may be entered.
    ///
    /// `Sent` lists itself so a repeated send re-stamps `sent_at` without
    /// ever moving an item backwards.
    pub fn predecessors(self) -> &'static [ItemStatus] {
        match self {
            ItemStatus::Pending => &[],
            ItemStatus::Sent => &[ItemStatus::Pending, ItemStatus::Sent],
            ItemStatus::Preparing => &[ItemStatus::Sent],
            ItemStatus::Ready => &[ItemStatus::Preparing],
            ItemStatus::Served => &[ItemStatus::Ready],
            ItemStatus::Cancelled => &[
                ItemStatus::Pending,
                ItemStatus::Sent,
                ItemStatus::Preparing,
                ItemStatus::Ready,
            ],
        }
    }

    pub fn can_transition_to(self, target: ItemStatus) -> bool {
        target.predecessors().contains(&self)
    }

    /// Entering the kitchen or leaving the bill changes what an invoice
    /// covers, so these targets are refused once the order is closed.
    pub fn requires_open_order(self) -> bool {
        matches!(self, ItemStatus::Sent | ItemStatus::Cancelled)
    }

    pub fn is_queued(self) -> bool {
        Self::QUEUED.contains(&self)
    }

    pub fn queued_values() -> Vec<String> {
        Self::QUEUED.iter().map(|s| s.to_value()).collect()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[sea_orm(string_value = "kg")]
    Kg,
    #[sea_orm(string_value = "unit")]
    Unit,
    #[sea_orm(string_value = "lb")]
    Lb,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "transfer")]
    Transfer,
}

impl TryFrom<String> for TableStatus {
    type Error = DbErr;

    fn try_from(value: String) -> Result<Self, DbErr> {
        Self::try_from_value(&value)
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = DbErr;

    fn try_from(value: String) -> Result<Self, DbErr> {
        Self::try_from_value(&value)
    }
}

impl TryFrom<String> for ItemStatus {
    type Error = DbErr;

    fn try_from(value: String) -> Result<Self, DbErr> {
        Self::try_from_value(&value)
    }
}

impl TryFrom<String> for Unit {
    type Error = DbErr;

    fn try_from(value: String) -> Result<Self, DbErr> {
        Self::try_from_value(&value)
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = DbErr;

    fn try_from(value: String) -> Result<Self, DbErr> {
        Self::try_from_value(&value)
    }
}
