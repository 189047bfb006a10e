use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use restaurant_pos_api::{
    db::{create_pool, orm_from_pool, run_migrations},
    dto::{
        catalog::{ClientRequest, ProductRequest},
        invoices::{CreateInvoiceRequest, InvoiceLineInput},
        orders::{AddItemRequest, CloseOrderRequest, MoveOrderRequest},
        tables::{CreateTableRequest, OpenOrderRequest},
    },
    error::AppError,
    routes::params::{Pagination, SalesQuery},
    services::{catalog_service, invoice_service, kitchen_service, order_service, table_service},
    state::AppState,
    workflow::{ItemStatus, OrderStatus, PaymentMethod, TableStatus, Unit},
};
use rust_decimal::Decimal;

static SEQ: AtomicU32 = AtomicU32::new(0);

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Names unique across tests and runs, so scenarios never share rows.
fn unique(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!(
        "{prefix}-{}-{}-{}",
        std::process::id(),
        SEQ.fetch_add(1, Ordering::SeqCst),
        nanos % 1_000_000_000
    )
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run POS flow tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, 5).await?;
    run_migrations(&pool).await?;
    let orm = orm_from_pool(&pool);

    Ok(Some(AppState {
        pool,
        orm,
        lock_timeout: Duration::from_secs(2),
    }))
}

async fn new_table(state: &AppState) -> anyhow::Result<i32> {
    let table = table_service::create_table(
        state,
        CreateTableRequest {
            number: unique("T"),
            description: None,
        },
    )
    .await?;
    Ok(table.data.unwrap().id)
}

async fn new_product(state: &AppState, name: &str, unit_price: &str) -> anyhow::Result<i32> {
    let product = catalog_service::create_product(
        state,
        ProductRequest {
            code: unique("P"),
            name: name.to_string(),
            price_kg: None,
            price_unit: Some(dec(unit_price)),
            price_lb: None,
        },
    )
    .await?;
    Ok(product.data.unwrap().id)
}

async fn new_client(state: &AppState, name: &str) -> anyhow::Result<i32> {
    let client = catalog_service::create_client(
        state,
        ClientRequest {
            name: name.to_string(),
            address: None,
            phone: None,
        },
    )
    .await?;
    Ok(client.data.unwrap().id)
}

async fn open(state: &AppState, table_id: i32) -> anyhow::Result<i32> {
    let order = order_service::open_or_get_order(state, table_id, OpenOrderRequest::default()).await?;
    Ok(order.data.unwrap().id)
}

async fn add(
    state: &AppState,
    order_id: i32,
    product_id: i32,
    quantity: &str,
    unit_price: &str,
) -> anyhow::Result<i32> {
    let item = order_service::add_item(
        state,
        order_id,
        AddItemRequest {
            product_id,
            quantity: dec(quantity),
            unit: Unit::Unit,
            unit_price: dec(unit_price),
            note: None,
        },
    )
    .await?;
    Ok(item.data.unwrap().item_id)
}

async fn table_status(state: &AppState, table_id: i32) -> anyhow::Result<TableStatus> {
    let tables = table_service::list_tables(state).await?.data.unwrap().items;
    let table = tables
        .into_iter()
        .find(|t| t.id == table_id)
        .expect("table listed");
    Ok(table.status)
}

/// The occupancy flag as written to `dining_tables`, not the derived listing.
async fn stored_table_status(state: &AppState, table_id: i32) -> anyhow::Result<TableStatus> {
    let raw: String = sqlx::query_scalar("SELECT status FROM dining_tables WHERE id = $1")
        .bind(table_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(TableStatus::try_from(raw)?)
}

async fn send_ready(state: &AppState, item_id: i32) -> anyhow::Result<()> {
    kitchen_service::send_to_kitchen(state, item_id).await?;
    kitchen_service::advance(state, item_id, ItemStatus::Preparing).await?;
    kitchen_service::advance(state, item_id, ItemStatus::Ready).await?;
    Ok(())
}

fn by_client(q: String) -> SalesQuery {
    SalesQuery {
        page: None,
        per_page: None,
        from: None,
        to: None,
        q: Some(q),
    }
}

#[tokio::test]
async fn opening_twice_returns_the_same_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let table_id = new_table(&state).await?;
    assert_eq!(table_status(&state, table_id).await?, TableStatus::Free);

    let first = open(&state, table_id).await?;
    let second = open(&state, table_id).await?;
    assert_eq!(first, second);
    assert_eq!(table_status(&state, table_id).await?, TableStatus::Occupied);
    assert_eq!(stored_table_status(&state, table_id).await?, TableStatus::Occupied);

    let missing = order_service::open_or_get_order(&state, i32::MAX, OpenOrderRequest::default()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn item_flows_through_the_kitchen_queue() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let table_id = new_table(&state).await?;
    let soup = new_product(&state, "Soup", "8.00").await?;
    let order_id = open(&state, table_id).await?;

    let created = order_service::add_item(
        &state,
        order_id,
        AddItemRequest {
            product_id: soup,
            quantity: dec("2"),
            unit: Unit::Unit,
            unit_price: dec("8.00"),
            note: Some("no salt".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.subtotal, dec("16.00"));
    let item_id = created.item_id;

    let in_queue = |items: &[restaurant_pos_api::models::QueueItem]| {
        items.iter().find(|q| q.item_id == item_id).map(|q| q.status)
    };

    let queue = kitchen_service::list_queue(&state).await?.data.unwrap().items;
    assert_eq!(in_queue(&queue), None, "pending items are not queued");

    kitchen_service::send_to_kitchen(&state, item_id).await?;
    let queue = kitchen_service::list_queue(&state).await?.data.unwrap().items;
    assert_eq!(in_queue(&queue), Some(ItemStatus::Sent));

    // Kitchen cannot skip preparing.
    let skipped = kitchen_service::advance(&state, item_id, ItemStatus::Ready).await;
    assert!(matches!(skipped, Err(AppError::InvalidState(_))));
    let wrong_target = kitchen_service::advance(&state, item_id, ItemStatus::Served).await;
    assert!(matches!(wrong_target, Err(AppError::BadRequest(_))));

    kitchen_service::advance(&state, item_id, ItemStatus::Preparing).await?;
    kitchen_service::advance(&state, item_id, ItemStatus::Ready).await?;
    let queue = kitchen_service::list_queue(&state).await?.data.unwrap().items;
    assert_eq!(in_queue(&queue), Some(ItemStatus::Ready));

    kitchen_service::mark_served(&state, item_id).await?;
    let queue = kitchen_service::list_queue(&state).await?.data.unwrap().items;
    assert_eq!(in_queue(&queue), None);

    let order = order_service::get_order_with_items(&state, order_id).await?.data.unwrap();
    let item = order.items.iter().find(|i| i.id == item_id).expect("item");
    assert_eq!(item.status, ItemStatus::Served);
    assert!(item.sent_at.is_some() && item.ready_at.is_some() && item.served_at.is_some());

    // Served is final.
    let again = kitchen_service::advance(&state, item_id, ItemStatus::Preparing).await;
    assert!(matches!(again, Err(AppError::InvalidState(_))));
    let cancel = order_service::cancel_item(&state, item_id).await;
    assert!(matches!(cancel, Err(AppError::InvalidState(_))));
    Ok(())
}

#[tokio::test]
async fn only_pending_items_can_be_removed() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let table_id = new_table(&state).await?;
    let product = new_product(&state, "Bread", "1.50").await?;
    let order_id = open(&state, table_id).await?;

    let pending = add(&state, order_id, product, "1", "1.50").await?;
    let sent = add(&state, order_id, product, "1", "1.50").await?;
    kitchen_service::send_to_kitchen(&state, sent).await?;

    order_service::remove_item(&state, pending).await?;
    let removed_again = order_service::remove_item(&state, pending).await;
    assert!(matches!(removed_again, Err(AppError::NotFound(_))));

    let sent_removal = order_service::remove_item(&state, sent).await;
    assert!(matches!(sent_removal, Err(AppError::InvalidState(_))));

    let bad_qty = order_service::add_item(
        &state,
        order_id,
        AddItemRequest {
            product_id: product,
            quantity: Decimal::ZERO,
            unit: Unit::Unit,
            unit_price: dec("1.50"),
            note: None,
        },
    )
    .await;
    assert!(matches!(bad_qty, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn closing_bills_every_non_cancelled_item() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let table_id = new_table(&state).await?;
    let product = new_product(&state, "Plate", "10.00").await?;
    let client_name = unique("Client");
    let client_id = new_client(&state, &client_name).await?;
    let order_id = open(&state, table_id).await?;

    add(&state, order_id, product, "1", "10.00").await?;
    add(&state, order_id, product, "1", "5.50").await?;
    let cancelled = add(&state, order_id, product, "1", "3.00").await?;
    order_service::cancel_item(&state, cancelled).await?;

    let no_client = invoice_service::close_order_with_invoice(
        &state,
        order_id,
        CloseOrderRequest {
            client_id: None,
            payment_method: PaymentMethod::Cash,
        },
    )
    .await;
    assert!(matches!(no_client, Err(AppError::BadRequest(_))));

    let created = invoice_service::close_order_with_invoice(
        &state,
        order_id,
        CloseOrderRequest {
            client_id: Some(client_id),
            payment_method: PaymentMethod::Cash,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.total, dec("15.50"));

    let order = order_service::get_order_with_items(&state, order_id).await?.data.unwrap();
    assert_eq!(order.order.status, OrderStatus::Closed);
    assert_eq!(order.order.total, dec("15.50"));
    assert_eq!(table_status(&state, table_id).await?, TableStatus::Free);
    assert_eq!(stored_table_status(&state, table_id).await?, TableStatus::Free);

    let detail = invoice_service::get_invoice(&state, created.invoice_id).await?.data.unwrap();
    assert_eq!(detail.client.id, client_id);
    assert_eq!(detail.invoice.order_id, Some(order_id));
    assert_eq!(detail.lines.len(), 2);

    let twice = invoice_service::close_order_with_invoice(
        &state,
        order_id,
        CloseOrderRequest {
            client_id: Some(client_id),
            payment_method: PaymentMethod::Cash,
        },
    )
    .await;
    assert!(matches!(twice, Err(AppError::Conflict(_))));

    let sales = invoice_service::list_invoices(&state, by_client(client_name.clone())).await?;
    let rows = sales.data.unwrap().items;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, created.invoice_id);

    // A fragment from the middle of the name matches too.
    let fragment = client_name["Client-".len()..].to_string();
    let sales = invoice_service::list_invoices(&state, by_client(fragment)).await?;
    let rows = sales.data.unwrap().items;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].client_name, client_name);

    let by_id = invoice_service::list_invoices(&state, by_client(created.invoice_id.to_string()))
        .await?
        .data
        .unwrap()
        .items;
    assert!(by_id.iter().any(|r| r.id == created.invoice_id));

    // The table is free again, so a new order can be opened there.
    let next = open(&state, table_id).await?;
    assert_ne!(next, order_id);
    Ok(())
}

#[tokio::test]
async fn closing_an_empty_order_is_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let table_id = new_table(&state).await?;
    let client_id = new_client(&state, &unique("Empty")).await?;
    let order_id = open(&state, table_id).await?;

    let result = invoice_service::close_order_with_invoice(
        &state,
        order_id,
        CloseOrderRequest {
            client_id: Some(client_id),
            payment_method: PaymentMethod::Transfer,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert_eq!(table_status(&state, table_id).await?, TableStatus::Occupied);
    Ok(())
}

#[tokio::test]
async fn moving_requires_a_free_destination() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let origin = new_table(&state).await?;
    let busy = new_table(&state).await?;
    let free = new_table(&state).await?;
    let order_id = open(&state, origin).await?;
    open(&state, busy).await?;

    let blocked = order_service::move_order(
        &state,
        order_id,
        MoveOrderRequest {
            destination_table_id: busy,
        },
    )
    .await;
    assert!(matches!(blocked, Err(AppError::Conflict(_))));
    for table in [origin, busy] {
        assert_eq!(table_status(&state, table).await?, TableStatus::Occupied);
        assert_eq!(stored_table_status(&state, table).await?, TableStatus::Occupied);
    }
    let still_there = order_service::get_order_with_items(&state, order_id).await?.data.unwrap();
    assert_eq!(still_there.order.table_id, origin);

    let same = order_service::move_order(
        &state,
        order_id,
        MoveOrderRequest {
            destination_table_id: origin,
        },
    )
    .await;
    assert!(matches!(same, Err(AppError::BadRequest(_))));

    let moved = order_service::move_order(
        &state,
        order_id,
        MoveOrderRequest {
            destination_table_id: free,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(moved.origin_table_id, origin);
    assert_eq!(moved.destination_table_id, free);
    assert_eq!(table_status(&state, origin).await?, TableStatus::Free);
    assert_eq!(table_status(&state, free).await?, TableStatus::Occupied);
    assert_eq!(stored_table_status(&state, origin).await?, TableStatus::Free);
    assert_eq!(stored_table_status(&state, free).await?, TableStatus::Occupied);
    Ok(())
}

#[tokio::test]
async fn release_requires_every_item_cancelled() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let table_id = new_table(&state).await?;
    let product = new_product(&state, "Tea", "2.00").await?;
    let order_id = open(&state, table_id).await?;
    let item_id = add(&state, order_id, product, "1", "2.00").await?;
    kitchen_service::send_to_kitchen(&state, item_id).await?;

    let blocked = order_service::release_table(&state, table_id).await;
    assert!(matches!(blocked, Err(AppError::Conflict(_))));
    assert_eq!(table_status(&state, table_id).await?, TableStatus::Occupied);

    order_service::cancel_item(&state, item_id).await?;
    order_service::release_table(&state, table_id).await?;
    assert_eq!(table_status(&state, table_id).await?, TableStatus::Free);
    assert_eq!(stored_table_status(&state, table_id).await?, TableStatus::Free);

    let order = order_service::get_order_with_items(&state, order_id).await?.data.unwrap();
    assert_eq!(order.order.status, OrderStatus::Cancelled);
    Ok(())
}

#[tokio::test]
async fn concurrent_closes_emit_one_invoice() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let table_id = new_table(&state).await?;
    let product = new_product(&state, "Combo", "12.00").await?;
    let client_id = new_client(&state, &unique("Race")).await?;
    let order_id = open(&state, table_id).await?;
    add(&state, order_id, product, "1", "12.00").await?;

    let request = || CloseOrderRequest {
        client_id: Some(client_id),
        payment_method: PaymentMethod::Cash,
    };
    let (a, b) = tokio::join!(
        invoice_service::close_order_with_invoice(&state, order_id, request()),
        invoice_service::close_order_with_invoice(&state, order_id, request()),
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(AppError::Conflict(_)) | Err(AppError::OrmError(_))));

    let invoices: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE order_id = $1")
        .bind(order_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(invoices, 1);
    Ok(())
}

#[tokio::test]
async fn direct_invoice_totals_its_lines() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let product = new_product(&state, "Cheese", "9.99").await?;
    let client_id = new_client(&state, &unique("Counter")).await?;

    let created = invoice_service::create_invoice_from_items(
        &state,
        CreateInvoiceRequest {
            client_id: Some(client_id),
            payment_method: PaymentMethod::Transfer,
            lines: vec![
                InvoiceLineInput {
                    product_id: product,
                    quantity: dec("0.375"),
                    unit: Unit::Kg,
                    unit_price: dec("12.50"),
                },
                InvoiceLineInput {
                    product_id: product,
                    quantity: dec("2"),
                    unit: Unit::Unit,
                    unit_price: dec("9.99"),
                },
            ],
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.total, dec("24.67"));

    let empty = invoice_service::create_invoice_from_items(
        &state,
        CreateInvoiceRequest {
            client_id: Some(client_id),
            payment_method: PaymentMethod::Cash,
            lines: vec![],
        },
    )
    .await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn concurrent_opens_share_one_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let table_id = new_table(&state).await?;

    let (a, b) = tokio::join!(
        order_service::open_or_get_order(&state, table_id, OpenOrderRequest::default()),
        order_service::open_or_get_order(&state, table_id, OpenOrderRequest::default()),
    );
    let a = a?.data.unwrap().id;
    let b = b?.data.unwrap().id;
    assert_eq!(a, b);

    let open_orders: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE table_id = $1 AND status = 'open'",
    )
    .bind(table_id)
    .fetch_one(&state.pool)
    .await?;
    assert_eq!(open_orders, 1);
    assert_eq!(stored_table_status(&state, table_id).await?, TableStatus::Occupied);
    Ok(())
}

#[tokio::test]
async fn kitchen_queue_is_first_sent_first_listed() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let table_id = new_table(&state).await?;
    let product = new_product(&state, "Fries", "3.00").await?;
    let order_id = open(&state, table_id).await?;
    let first_added = add(&state, order_id, product, "1", "3.00").await?;
    let second_added = add(&state, order_id, product, "1", "3.00").await?;

    let positions = |items: &[restaurant_pos_api::models::QueueItem]| -> Vec<i32> {
        items
            .iter()
            .map(|q| q.item_id)
            .filter(|id| *id == first_added || *id == second_added)
            .collect()
    };

    // Sent in reverse order of creation: the queue follows the send time.
    kitchen_service::send_to_kitchen(&state, second_added).await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    kitchen_service::send_to_kitchen(&state, first_added).await?;
    let queue = kitchen_service::list_queue(&state).await?.data.unwrap().items;
    assert_eq!(positions(&queue), vec![second_added, first_added]);

    // Sending again re-stamps the item and moves it to the back.
    tokio::time::sleep(Duration::from_millis(10)).await;
    kitchen_service::send_to_kitchen(&state, second_added).await?;
    let queue = kitchen_service::list_queue(&state).await?.data.unwrap().items;
    assert_eq!(positions(&queue), vec![first_added, second_added]);
    Ok(())
}

#[tokio::test]
async fn items_of_a_closed_order_no_longer_change() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let table_id = new_table(&state).await?;
    let product = new_product(&state, "Stew", "10.00").await?;
    let client_id = new_client(&state, &unique("Closed")).await?;
    let order_id = open(&state, table_id).await?;

    let ready = add(&state, order_id, product, "1", "10.00").await?;
    send_ready(&state, ready).await?;
    let pending = add(&state, order_id, product, "1", "5.50").await?;

    let created = invoice_service::close_order_with_invoice(
        &state,
        order_id,
        CloseOrderRequest {
            client_id: Some(client_id),
            payment_method: PaymentMethod::Cash,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.total, dec("15.50"));

    let cancel = order_service::cancel_item(&state, ready).await;
    assert!(matches!(cancel, Err(AppError::Conflict(_))));
    let removal = order_service::remove_item(&state, pending).await;
    assert!(matches!(removal, Err(AppError::Conflict(_))));
    let send = kitchen_service::send_to_kitchen(&state, pending).await;
    assert!(matches!(send, Err(AppError::Conflict(_))));

    // Food already in the kitchen still reaches the table.
    kitchen_service::mark_served(&state, ready).await?;

    let order = order_service::get_order_with_items(&state, order_id).await?.data.unwrap();
    assert_eq!(order.order.total, dec("15.50"));
    let status_of = |id: i32| order.items.iter().find(|i| i.id == id).map(|i| i.status);
    assert_eq!(status_of(ready), Some(ItemStatus::Served));
    assert_eq!(status_of(pending), Some(ItemStatus::Pending));

    let detail = invoice_service::get_invoice(&state, created.invoice_id).await?.data.unwrap();
    assert_eq!(detail.lines.len(), 2);
    assert_eq!(detail.invoice.total, dec("15.50"));
    Ok(())
}

#[tokio::test]
async fn catalog_entries_are_replaced_and_deleted() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let kept = new_product(&state, "Juice", "2.00").await?;
    let spare = new_product(&state, "Water", "1.00").await?;
    let taken_code = catalog_service::get_product(&state, kept).await?.data.unwrap().code;

    let new_code = unique("J");
    let updated = catalog_service::update_product(
        &state,
        kept,
        ProductRequest {
            code: new_code.clone(),
            name: " Orange juice ".into(),
            price_kg: None,
            price_unit: Some(dec("2.505")),
            price_lb: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.code, new_code);
    assert_eq!(updated.name, "Orange juice");
    assert_eq!(updated.price_unit, dec("2.51"));
    assert_eq!(updated.price_kg, Decimal::ZERO);

    let duplicate = catalog_service::update_product(
        &state,
        spare,
        ProductRequest {
            code: new_code.clone(),
            name: "Water".into(),
            price_kg: None,
            price_unit: Some(dec("1.00")),
            price_lb: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // The old code is free again once replaced.
    let reuse = catalog_service::update_product(
        &state,
        spare,
        ProductRequest {
            code: taken_code,
            name: "Water".into(),
            price_kg: None,
            price_unit: Some(dec("1.00")),
            price_lb: None,
        },
    )
    .await;
    assert!(reuse.is_ok());

    let missing = catalog_service::update_product(
        &state,
        i32::MAX,
        ProductRequest {
            code: unique("X"),
            name: "Ghost".into(),
            price_kg: None,
            price_unit: None,
            price_lb: None,
        },
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    // A product on an order stays; an unused one can go.
    let table_id = new_table(&state).await?;
    let order_id = open(&state, table_id).await?;
    add(&state, order_id, kept, "1", "2.51").await?;
    let in_use = catalog_service::delete_product(&state, kept).await;
    assert!(matches!(in_use, Err(AppError::Conflict(_))));

    catalog_service::delete_product(&state, spare).await?;
    let gone = catalog_service::get_product(&state, spare).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
    let twice = catalog_service::delete_product(&state, spare).await;
    assert!(matches!(twice, Err(AppError::NotFound(_))));

    let page = catalog_service::list_products(
        &state,
        Pagination {
            page: Some(1),
            per_page: Some(5),
        },
    )
    .await?;
    let meta = page.meta.unwrap();
    assert_eq!(meta.per_page, Some(5));
    assert!(meta.total.unwrap_or_default() >= 1);
    assert!(page.data.unwrap().items.len() <= 5);

    let client_id = new_client(&state, &unique("Renamed")).await?;
    let renamed = unique("Renamed");
    let client = catalog_service::update_client(
        &state,
        client_id,
        ClientRequest {
            name: renamed.clone(),
            address: Some("Main St 1".into()),
            phone: Some("  ".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(client.name, renamed);
    assert_eq!(client.address.as_deref(), Some("Main St 1"));
    assert_eq!(client.phone, None);

    invoice_service::create_invoice_from_items(
        &state,
        CreateInvoiceRequest {
            client_id: Some(client_id),
            payment_method: PaymentMethod::Cash,
            lines: vec![InvoiceLineInput {
                product_id: kept,
                quantity: dec("1"),
                unit: Unit::Unit,
                unit_price: dec("2.51"),
            }],
        },
    )
    .await?;
    let billed = catalog_service::delete_client(&state, client_id).await;
    assert!(matches!(billed, Err(AppError::Conflict(_))));

    let walk_in = new_client(&state, &unique("WalkIn")).await?;
    catalog_service::delete_client(&state, walk_in).await?;
    let gone = catalog_service::get_client(&state, walk_in).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));

    let clients = catalog_service::list_clients(&state, Pagination::default()).await?;
    assert_eq!(clients.meta.unwrap().per_page, Some(20));
    Ok(())
}
