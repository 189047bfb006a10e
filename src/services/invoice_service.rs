use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sqlx::{Postgres, QueryBuilder};

use crate::{
    audit,
    db::begin_locking,
    dto::invoices::{CreateInvoiceRequest, InvoiceCreated, InvoiceDetail, InvoiceList},
    dto::orders::CloseOrderRequest,
    entity::{
        clients::Entity as Clients,
        invoice_lines::{ActiveModel as InvoiceLineActive, Entity as InvoiceLines},
        invoices::{ActiveModel as InvoiceActive, Entity as Invoices, Model as InvoiceModel},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Entity as Orders},
    },
    error::{AppError, AppResult},
    models::{Client, Invoice, InvoiceLine, InvoiceSummary},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{SalesQuery, SearchQuery},
    services::{
        order_service::lock_order,
        table_service::{lock_table, sync_table_status},
    },
    state::AppState,
    workflow::{ItemStatus, OrderStatus, PaymentMethod, Unit},
};

/// A billable line ready to be written as an invoice line.
#[derive(Debug, Clone)]
struct LineDraft {
    product_id: i32,
    quantity: Decimal,
    unit: Unit,
    unit_price: Decimal,
    subtotal: Decimal,
}

/// Invoices an order and closes it. The invoice, the order status and the
/// table release commit together or not at all.
pub async fn close_order_with_invoice(
    state: &AppState,
    order_id: i32,
    payload: CloseOrderRequest,
) -> AppResult<ApiResponse<InvoiceCreated>> {
    let client_id = payload
        .client_id
        .ok_or_else(|| AppError::BadRequest("client_id is required to invoice".into()))?;

    let txn = begin_locking(&state.orm, state.lock_timeout).await?;

    let snapshot = Orders::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {order_id}")))?;
    lock_table(&txn, snapshot.table_id).await?;
    let order = lock_order(&txn, order_id, snapshot.table_id).await?;

    if order.status != OrderStatus::Open {
        return Err(AppError::Conflict(format!(
            "order {order_id} is already {}",
            order.status.to_value()
        )));
    }
    if Clients::find_by_id(client_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound(format!("Client {client_id}")));
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .filter(OrderItemCol::Status.ne(ItemStatus::Cancelled))
        .order_by_asc(OrderItemCol::CreatedAt)
        .order_by_asc(OrderItemCol::Id)
        .all(&txn)
        .await?;
    if items.is_empty() {
        return Err(AppError::BadRequest(format!(
            "order {order_id} has no billable items"
        )));
    }

    let lines: Vec<LineDraft> = items
        .into_iter()
        .map(|item| LineDraft {
            product_id: item.product_id,
            quantity: item.quantity,
            unit: item.unit,
            unit_price: item.unit_price,
            subtotal: item.subtotal,
        })
        .collect();

    let invoice = insert_invoice(
        &txn,
        client_id,
        Some(order_id),
        payload.payment_method,
        &lines,
    )
    .await?;

    let table_id = order.table_id;
    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Closed);
    active.total = Set(invoice.total);
    active.client_id = Set(Some(client_id));
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    sync_table_status(&txn, table_id).await?;
    txn.commit().await?;

    tracing::info!(
        order_id,
        invoice_id = invoice.id,
        table_id,
        total = %invoice.total,
        "order closed with invoice"
    );
    audit::record(
        &state.pool,
        "order_close",
        "invoices",
        serde_json::json!({
            "order_id": order_id,
            "invoice_id": invoice.id,
            "total": invoice.total.to_string(),
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order invoiced",
        InvoiceCreated {
            invoice_id: invoice.id,
            total: invoice.total,
        },
        Some(Meta::empty()),
    ))
}

/// Invoices an ad-hoc list of lines outside the table flow.
pub async fn create_invoice_from_items(
    state: &AppState,
    payload: CreateInvoiceRequest,
) -> AppResult<ApiResponse<InvoiceCreated>> {
    let client_id = payload
        .client_id
        .ok_or_else(|| AppError::BadRequest("client_id is required".into()))?;
    if payload.lines.is_empty() {
        return Err(AppError::BadRequest(
            "an invoice needs at least one line".into(),
        ));
    }

    let lines = payload
        .lines
        .iter()
        .map(|line| {
            Ok(LineDraft {
                product_id: line.product_id,
                quantity: line.quantity,
                unit: line.unit,
                unit_price: line.unit_price,
                subtotal: pricing::line_subtotal(line.quantity, line.unit_price)?,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let txn = begin_locking(&state.orm, state.lock_timeout).await?;
    if Clients::find_by_id(client_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound(format!("Client {client_id}")));
    }
    let invoice = insert_invoice(&txn, client_id, None, payload.payment_method, &lines).await?;
    txn.commit().await?;

    tracing::info!(invoice_id = invoice.id, total = %invoice.total, "invoice created");
    audit::record(
        &state.pool,
        "invoice_create",
        "invoices",
        serde_json::json!({ "invoice_id": invoice.id, "lines": lines.len() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Invoice created",
        InvoiceCreated {
            invoice_id: invoice.id,
            total: invoice.total,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_invoice(state: &AppState, invoice_id: i32) -> AppResult<ApiResponse<InvoiceDetail>> {
    let (invoice, client) = Invoices::find_by_id(invoice_id)
        .find_also_related(Clients)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Invoice {invoice_id}")))?;
    let client = client.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("invoice {invoice_id} has no client"))
    })?;

    let lines = sqlx::query_as::<_, InvoiceLine>(
        r#"
        SELECT l.product_id, p.name AS product_name, l.quantity, l.unit,
               l.unit_price, l.subtotal
        FROM invoice_lines l
        JOIN products p ON p.id = l.product_id
        WHERE l.invoice_id = $1
        ORDER BY l.id
        "#,
    )
    .bind(invoice_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Invoice",
        InvoiceDetail {
            invoice: invoice_from_entity(invoice),
            client: Client {
                id: client.id,
                name: client.name,
                address: client.address,
                phone: client.phone,
            },
            lines,
        },
        Some(Meta::empty()),
    ))
}

/// Sales history, newest first, filtered by date range and by a client name
/// fragment or invoice id.
pub async fn list_invoices(
    state: &AppState,
    query: SalesQuery,
) -> AppResult<ApiResponse<InvoiceList>> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(AppError::BadRequest("`from` must not be after `to`".into()));
        }
    }
    let (page, limit, offset) = query.pagination().normalize();

    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
    push_sales_filters(&mut count, &query);
    let total: i64 = count.build_query_scalar().fetch_one(&state.pool).await?;

    let mut select = QueryBuilder::<Postgres>::new(
        "SELECT f.id, f.client_id, c.name AS client_name, f.order_id, f.total, \
         f.payment_method, f.created_at",
    );
    push_sales_filters(&mut select, &query);
    select
        .push(" ORDER BY f.created_at DESC, f.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let items = select
        .build_query_as::<InvoiceSummary>()
        .fetch_all(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Sales",
        InvoiceList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

fn push_sales_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &SalesQuery) {
    builder.push(" FROM invoices f JOIN clients c ON c.id = f.client_id WHERE TRUE");
    if let Some(from) = query.from {
        builder.push(" AND f.created_at::date >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        builder.push(" AND f.created_at::date <= ").push_bind(to);
    }
    if let Some(term) = query.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = SearchQuery {
            q: Some(term.to_string()),
        }
        .contains_pattern();
        builder
            .push(" AND (c.name ILIKE ")
            .push_bind(pattern)
            .push(" OR f.id::text = ")
            .push_bind(term.to_string())
            .push(")");
    }
}

async fn insert_invoice<C: ConnectionTrait>(
    conn: &C,
    client_id: i32,
    order_id: Option<i32>,
    payment_method: PaymentMethod,
    lines: &[LineDraft],
) -> AppResult<InvoiceModel> {
    let total = pricing::sum_subtotals(lines.iter().map(|l| l.subtotal));

    let invoice = InvoiceActive {
        id: NotSet,
        client_id: Set(client_id),
        order_id: Set(order_id),
        total: Set(total),
        payment_method: Set(payment_method),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;

    let rows = lines.iter().map(|line| InvoiceLineActive {
        id: NotSet,
        invoice_id: Set(invoice.id),
        product_id: Set(line.product_id),
        quantity: Set(line.quantity),
        unit_price: Set(line.unit_price),
        unit: Set(line.unit),
        subtotal: Set(line.subtotal),
    });
    InvoiceLines::insert_many(rows).exec(conn).await?;

    Ok(invoice)
}

fn invoice_from_entity(model: InvoiceModel) -> Invoice {
    Invoice {
        id: model.id,
        client_id: model.client_id,
        order_id: model.order_id,
        total: model.total,
        payment_method: model.payment_method,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
