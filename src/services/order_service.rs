use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set,
};

use crate::{
    audit,
    db::begin_locking,
    dto::orders::{AddItemRequest, ItemCreated, MoveOrderRequest, OrderMoved, OrderWithItems},
    dto::tables::OpenOrderRequest,
    entity::{
        clients::Entity as Clients,
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem},
    pricing,
    response::{Ack, ApiResponse, Meta},
    services::{
        kitchen_service::transition_item,
        table_service::{count_open_orders, lock_table, sync_table_status},
    },
    state::AppState,
    workflow::{ItemStatus, OrderStatus},
};

/// Returns the table's open order, creating it (and occupying the table) when
/// there is none. Safe to call repeatedly while the table is in service.
pub async fn open_or_get_order(
    state: &AppState,
    table_id: i32,
    payload: OpenOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let txn = begin_locking(&state.orm, state.lock_timeout).await?;

    // The table lock serializes concurrent opens of the same table.
    lock_table(&txn, table_id).await?;

    let existing = Orders::find()
        .filter(OrderCol::TableId.eq(table_id))
        .filter(OrderCol::Status.eq(OrderStatus::Open))
        .one(&txn)
        .await?;
    if let Some(order) = existing {
        txn.commit().await?;
        tracing::debug!(table_id, order_id = order.id, "returning open order");
        return Ok(ApiResponse::success(
            "Order already open",
            order_from_entity(order),
            Some(Meta::empty()),
        ));
    }

    if let Some(client_id) = payload.client_id {
        if Clients::find_by_id(client_id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound(format!("Client {client_id}")));
        }
    }

    let order = OrderActive {
        id: NotSet,
        table_id: Set(table_id),
        client_id: Set(payload.client_id),
        status: Set(OrderStatus::Open),
        total: Set(Decimal::ZERO),
        note: Set(clean_note(payload.note)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    sync_table_status(&txn, table_id).await?;
    txn.commit().await?;

    tracing::info!(table_id, order_id = order.id, "order opened");
    audit::record(
        &state.pool,
        "order_open",
        "orders",
        serde_json::json!({ "order_id": order.id, "table_id": table_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order opened",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn get_order_with_items(
    state: &AppState,
    order_id: i32,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {order_id}")))?;

    let items = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT i.id, i.order_id, i.product_id, p.name AS product_name,
               i.quantity, i.unit, i.unit_price, i.subtotal, i.status, i.note,
               i.created_at, i.sent_at, i.preparing_at, i.ready_at, i.served_at
        FROM order_items i
        JOIN products p ON p.id = i.product_id
        WHERE i.order_id = $1
        ORDER BY i.created_at ASC, i.id ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(&state.pool)
    .await?;

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(meta),
    ))
}

/// Adds a pending item. The order's stored total is left alone until close.
pub async fn add_item(
    state: &AppState,
    order_id: i32,
    payload: AddItemRequest,
) -> AppResult<ApiResponse<ItemCreated>> {
    let subtotal = pricing::line_subtotal(payload.quantity, payload.unit_price)?;

    // A share lock keeps the order from being closed between the status check and the insert.
    let txn = begin_locking(&state.orm, state.lock_timeout).await?;
    let order = Orders::find_by_id(order_id)
        .lock(LockType::Share)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {order_id}")))?;
    if order.status != OrderStatus::Open {
        return Err(AppError::Conflict(format!(
            "order {order_id} is {}; items can only be added to open orders",
            order.status.to_value()
        )));
    }

    if Products::find_by_id(payload.product_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!("Product {}", payload.product_id)));
    }

    let item = OrderItemActive {
        id: NotSet,
        order_id: Set(order_id),
        product_id: Set(payload.product_id),
        quantity: Set(payload.quantity),
        unit: Set(payload.unit),
        unit_price: Set(payload.unit_price),
        subtotal: Set(subtotal),
        status: Set(ItemStatus::Pending),
        note: Set(clean_note(payload.note)),
        created_at: NotSet,
        sent_at: Set(None),
        preparing_at: Set(None),
        ready_at: Set(None),
        served_at: Set(None),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::debug!(order_id, item_id = item.id, %subtotal, "item added");

    Ok(ApiResponse::success(
        "Item added",
        ItemCreated {
            item_id: item.id,
            subtotal,
        },
        Some(Meta::empty()),
    ))
}

/// Deletes an item that has not reached the kitchen yet. Anything later must
/// go through [`cancel_item`].
pub async fn remove_item(state: &AppState, item_id: i32) -> AppResult<ApiResponse<Ack>> {
    let txn = begin_locking(&state.orm, state.lock_timeout).await?;
    lock_open_order_for_item(&txn, item_id).await?;

    let result = OrderItems::delete_many()
        .filter(OrderItemCol::Id.eq(item_id))
        .filter(OrderItemCol::Status.eq(ItemStatus::Pending))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        let current = OrderItems::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order item {item_id}")))?;
        return Err(AppError::InvalidState(format!(
            "item {item_id} is {}; only pending items can be removed, cancel it instead",
            current.status.to_value()
        )));
    }
    txn.commit().await?;

    tracing::debug!(item_id, "item removed");
    Ok(ApiResponse::success("Item removed", Ack::default(), Some(Meta::empty())))
}

pub async fn cancel_item(state: &AppState, item_id: i32) -> AppResult<ApiResponse<Ack>> {
    transition_item(state, item_id, ItemStatus::Cancelled, None).await?;
    Ok(ApiResponse::success("Item cancelled", Ack::default(), Some(Meta::empty())))
}

/// Moves an open order to a free table, updating both tables' occupancy in
/// the same transaction.
pub async fn move_order(
    state: &AppState,
    order_id: i32,
    payload: MoveOrderRequest,
) -> AppResult<ApiResponse<OrderMoved>> {
    let destination = payload.destination_table_id;
    let txn = begin_locking(&state.orm, state.lock_timeout).await?;

    let snapshot = Orders::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {order_id}")))?;
    let origin = snapshot.table_id;
    if origin == destination {
        return Err(AppError::BadRequest(format!(
            "order {order_id} is already on table {destination}"
        )));
    }

    let mut tables = [origin, destination];
    tables.sort_unstable();
    for table_id in tables {
        lock_table(&txn, table_id).await?;
    }
    let order = lock_order(&txn, order_id, origin).await?;

    if order.status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "order {order_id} is {} and cannot be moved",
            order.status.to_value()
        )));
    }
    if count_open_orders(&txn, destination).await? > 0 {
        return Err(AppError::Conflict(format!(
            "destination table {destination} is occupied"
        )));
    }

    let mut active: OrderActive = order.into();
    active.table_id = Set(destination);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    sync_table_status(&txn, origin).await?;
    sync_table_status(&txn, destination).await?;
    txn.commit().await?;

    tracing::info!(order_id, origin, destination, "order moved");
    audit::record(
        &state.pool,
        "order_move",
        "orders",
        serde_json::json!({ "order_id": order_id, "from": origin, "to": destination }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order moved",
        OrderMoved {
            order_id,
            origin_table_id: origin,
            destination_table_id: destination,
        },
        Some(Meta::empty()),
    ))
}

/// Frees a table whose orders hold nothing but cancelled items, cancelling
/// those orders.
pub async fn release_table(state: &AppState, table_id: i32) -> AppResult<ApiResponse<Ack>> {
    let txn = begin_locking(&state.orm, state.lock_timeout).await?;
    let table = lock_table(&txn, table_id).await?;

    let open_ids: Vec<i32> = Orders::find()
        .filter(OrderCol::TableId.eq(table_id))
        .filter(OrderCol::Status.is_in(OrderStatus::NON_TERMINAL.iter().copied()))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|o| o.id)
        .collect();

    if !open_ids.is_empty() {
        let active_items = OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(open_ids.clone()))
            .filter(OrderItemCol::Status.ne(ItemStatus::Cancelled))
            .count(&txn)
            .await?;
        if active_items > 0 {
            return Err(AppError::Conflict(format!(
                "table {} has {active_items} active items and cannot be released",
                table.number
            )));
        }

        Orders::update_many()
            .col_expr(OrderCol::Status, Expr::value(OrderStatus::Cancelled))
            .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now()))
            .filter(OrderCol::Id.is_in(open_ids.clone()))
            .exec(&txn)
            .await?;
    }

    sync_table_status(&txn, table_id).await?;
    txn.commit().await?;

    tracing::info!(table_id, cancelled_orders = ?open_ids, "table released");
    audit::record(
        &state.pool,
        "table_release",
        "dining_tables",
        serde_json::json!({ "table_id": table_id, "cancelled_orders": open_ids }),
    )
    .await;

    Ok(ApiResponse::success("Table released", Ack::default(), Some(Meta::empty())))
}

/// Locks an order row that was read as belonging to `expected_table`. The
/// caller must already hold that table's lock; if the order moved in between,
/// the request is rejected so the caller can retry with fresh data.
pub(crate) async fn lock_order<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
    expected_table: i32,
) -> AppResult<OrderModel> {
    let order = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {order_id}")))?;
    if order.table_id != expected_table {
        return Err(AppError::Conflict(format!(
            "order {order_id} was moved by another request, retry"
        )));
    }
    Ok(order)
}

/// Share-locks the order owning `item_id` and refuses the request unless that
/// order is still open. While the lock is held a close cannot bill the item.
pub(crate) async fn lock_open_order_for_item<C: ConnectionTrait>(
    conn: &C,
    item_id: i32,
) -> AppResult<OrderItemModel> {
    let item = OrderItems::find_by_id(item_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order item {item_id}")))?;
    let order = Orders::find_by_id(item.order_id)
        .lock(LockType::Share)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {}", item.order_id)))?;
    if order.status != OrderStatus::Open {
        return Err(AppError::Conflict(format!(
            "order {} is {}; its items can no longer change",
            order.id,
            order.status.to_value()
        )));
    }
    Ok(item)
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        table_id: model.table_id,
        client_id: model.client_id,
        status: model.status,
        total: model.total,
        note: model.note,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
