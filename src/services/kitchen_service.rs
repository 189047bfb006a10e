use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveEnum, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::{
    db::begin_locking,
    dto::kitchen::QueueList,
    entity::order_items::{Column as OrderItemCol, Entity as OrderItems},
    error::{AppError, AppResult},
    models::QueueItem,
    response::{Ack, ApiResponse, Meta},
    services::order_service::lock_open_order_for_item,
    state::AppState,
    workflow::ItemStatus,
};

pub async fn list_queue(state: &AppState) -> AppResult<ApiResponse<QueueList>> {
    let items = sqlx::query_as::<_, QueueItem>(
        r#"
        SELECT i.id AS item_id, i.order_id, o.table_id, t.number AS table_number,
               p.name AS product_name, i.quantity, i.unit, i.status, i.note,
               COALESCE(i.sent_at, i.created_at) AS queued_at
        FROM order_items i
        JOIN orders o ON o.id = i.order_id
        JOIN dining_tables t ON t.id = o.table_id
        JOIN products p ON p.id = i.product_id
        WHERE i.status = ANY($1)
        ORDER BY COALESCE(i.sent_at, i.created_at) ASC, i.id ASC
        "#,
    )
    .bind(ItemStatus::queued_values())
    .fetch_all(&state.pool)
    .await?;

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Kitchen queue", QueueList { items }, Some(meta)))
}

pub async fn send_to_kitchen(state: &AppState, item_id: i32) -> AppResult<ApiResponse<Ack>> {
    transition_item(
        state,
        item_id,
        ItemStatus::Sent,
        Some(OrderItemCol::SentAt),
    )
    .await?;
    Ok(ApiResponse::success("Item sent to kitchen", Ack::default(), Some(Meta::empty())))
}

/// Kitchen-side progress: `sent -> preparing` or `preparing -> ready`.
pub async fn advance(
    state: &AppState,
    item_id: i32,
    target: ItemStatus,
) -> AppResult<ApiResponse<Ack>> {
    let stamp = match target {
        ItemStatus::Preparing => OrderItemCol::PreparingAt,
        ItemStatus::Ready => OrderItemCol::ReadyAt,
        other => {
            return Err(AppError::BadRequest(format!(
                "kitchen can only move items to preparing or ready, not {}",
                other.to_value()
            )));
        }
    };
    transition_item(state, item_id, target, Some(stamp)).await?;
    Ok(ApiResponse::success("Status updated", Ack::default(), Some(Meta::empty())))
}

pub async fn mark_served(state: &AppState, item_id: i32) -> AppResult<ApiResponse<Ack>> {
    transition_item(
        state,
        item_id,
        ItemStatus::Served,
        Some(OrderItemCol::ServedAt),
    )
    .await?;
    Ok(ApiResponse::success("Item served", Ack::default(), Some(Meta::empty())))
}

/// Moves an item to `target`. Kitchen entry and cancellation additionally
/// hold a share lock on an open parent order; progress of food already in the
/// kitchen does not depend on the order.
pub(crate) async fn transition_item(
    state: &AppState,
    item_id: i32,
    target: ItemStatus,
    stamp: Option<OrderItemCol>,
) -> AppResult<()> {
    if target.requires_open_order() {
        let txn = begin_locking(&state.orm, state.lock_timeout).await?;
        lock_open_order_for_item(&txn, item_id).await?;
        apply_transition(&txn, item_id, target, stamp).await?;
        txn.commit().await?;
    } else {
        apply_transition(&state.orm, item_id, target, stamp).await?;
    }
    tracing::debug!(item_id, status = %target.to_value(), "item status changed");
    Ok(())
}

/// A single conditional update on the item's current status, so concurrent
/// transitions on one item cannot both win. Zero rows affected means the item
/// is missing or not in a predecessor state.
async fn apply_transition<C: ConnectionTrait>(
    conn: &C,
    item_id: i32,
    target: ItemStatus,
    stamp: Option<OrderItemCol>,
) -> AppResult<()> {
    let mut update = OrderItems::update_many()
        .col_expr(OrderItemCol::Status, Expr::value(target))
        .filter(OrderItemCol::Id.eq(item_id))
        .filter(OrderItemCol::Status.is_in(target.predecessors().iter().copied()));
    if let Some(column) = stamp {
        update = update.col_expr(column, Expr::value(Utc::now()));
    }
    let result = update.exec(conn).await?;

    if result.rows_affected == 0 {
        let current = OrderItems::find_by_id(item_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order item {item_id}")))?;
        let allowed: Vec<String> = target.predecessors().iter().map(|s| s.to_value()).collect();
        return Err(AppError::InvalidState(format!(
            "item {item_id} is {}; moving to {} requires one of: {}",
            current.status.to_value(),
            target.to_value(),
            allowed.join(", ")
        )));
    }
    Ok(())
}
