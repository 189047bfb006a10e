use chrono::Utc;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, SqlErr,
};

use crate::{
    dto::tables::{CreateTableRequest, TableList},
    entity::{
        dining_tables::{ActiveModel as TableActive, Column as TableCol, Entity as DiningTables, Model as TableModel},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    models::{DiningTable, TableWithOccupancy},
    response::{ApiResponse, Meta},
    state::AppState,
    workflow::{OrderStatus, TableStatus},
};

pub async fn list_tables(state: &AppState) -> AppResult<ApiResponse<TableList>> {
    // Occupancy is derived from live orders here rather than read from the stored flag.
    let items = sqlx::query_as::<_, TableWithOccupancy>(
        r#"
        SELECT t.id, t.number, t.description,
               COALESCE(o.open_orders, 0) AS open_orders,
               CASE WHEN COALESCE(o.open_orders, 0) > 0 THEN 'occupied' ELSE 'free' END AS status
        FROM dining_tables t
        LEFT JOIN (
            SELECT table_id, COUNT(*) AS open_orders
            FROM orders
            WHERE status = ANY($1)
            GROUP BY table_id
        ) o ON o.table_id = t.id
        ORDER BY length(t.number), t.number
        "#,
    )
    .bind(OrderStatus::non_terminal_values())
    .fetch_all(&state.pool)
    .await?;

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Tables", TableList { items }, Some(meta)))
}

pub async fn create_table(
    state: &AppState,
    payload: CreateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    let number = payload.number.trim().to_string();
    if number.is_empty() {
        return Err(AppError::BadRequest("table number is required".into()));
    }
    let description = payload
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let active = TableActive {
        id: NotSet,
        number: Set(number.clone()),
        description: Set(description),
        status: Set(TableStatus::Free),
        created_at: NotSet,
    };
    let table = match active.insert(&state.orm).await {
        Ok(table) => table,
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict(format!(
                "table number {number} already exists"
            )));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(table_id = table.id, number = %table.number, "table created");

    Ok(ApiResponse::success(
        "Table created",
        table_from_entity(table),
        Some(Meta::empty()),
    ))
}

/// Takes the row lock on a table. Callers that lock several tables must do so
/// in ascending id order, and always before locking any order row.
pub(crate) async fn lock_table<C: ConnectionTrait>(conn: &C, table_id: i32) -> AppResult<TableModel> {
    DiningTables::find_by_id(table_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Table {table_id}")))
}

pub(crate) async fn count_open_orders<C: ConnectionTrait>(conn: &C, table_id: i32) -> AppResult<u64> {
    let count = Orders::find()
        .filter(OrderCol::TableId.eq(table_id))
        .filter(OrderCol::Status.is_in(OrderStatus::NON_TERMINAL.iter().copied()))
        .count(conn)
        .await?;
    Ok(count)
}

/// Recomputes a table's occupancy from its non-terminal orders and stores it.
pub(crate) async fn sync_table_status<C: ConnectionTrait>(
    conn: &C,
    table_id: i32,
) -> AppResult<TableStatus> {
    let status = TableStatus::from_open_orders(count_open_orders(conn, table_id).await?);
    DiningTables::update_many()
        .col_expr(TableCol::Status, Expr::value(status))
        .filter(TableCol::Id.eq(table_id))
        .exec(conn)
        .await?;
    tracing::debug!(table_id, status = %status.to_value(), "table occupancy synced");
    Ok(status)
}

fn table_from_entity(model: TableModel) -> DiningTable {
    DiningTable {
        id: model.id,
        number: model.number,
        description: model.description,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
