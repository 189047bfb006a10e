use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, Condition, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};

use crate::{
    dto::catalog::{ClientList, ClientRequest, ProductList, ProductRequest},
    entity::{
        clients::{ActiveModel as ClientActive, Column as ClientCol, Entity as Clients, Model as ClientModel},
        products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::{Client, Product},
    pricing::round_money,
    response::{Ack, ApiResponse, Meta},
    routes::params::{Pagination, SearchQuery},
    state::AppState,
};

/// Maximum number of suggestions returned by the typeahead searches.
const SEARCH_LIMIT: u64 = 10;

/// Validated product fields, shared by create and full-replace update.
struct ProductFields {
    code: String,
    name: String,
    price_kg: Decimal,
    price_unit: Decimal,
    price_lb: Decimal,
}

impl TryFrom<ProductRequest> for ProductFields {
    type Error = AppError;

    fn try_from(payload: ProductRequest) -> AppResult<Self> {
        let code = payload.code.trim().to_string();
        let name = payload.name.trim().to_string();
        if code.is_empty() || name.is_empty() {
            return Err(AppError::BadRequest("product code and name are required".into()));
        }
        Ok(Self {
            code,
            name,
            price_kg: list_price("price_kg", payload.price_kg)?,
            price_unit: list_price("price_unit", payload.price_unit)?,
            price_lb: list_price("price_lb", payload.price_lb)?,
        })
    }
}

pub async fn list_products(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = pagination.normalize();
    let total = Products::find().count(&state.orm).await?;
    let items: Vec<Product> = Products::find()
        .order_by_asc(ProductCol::Name)
        .order_by_asc(ProductCol::Id)
        .offset(offset as u64)
        .limit(limit as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(page, limit, total as i64)),
    ))
}

pub async fn search_products(
    state: &AppState,
    query: SearchQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let pattern = query.prefix_pattern();
    let condition = Condition::any()
        .add(Expr::col(ProductCol::Name).ilike(pattern.clone()))
        .add(Expr::col(ProductCol::Code).ilike(pattern));

    let items: Vec<Product> = Products::find()
        .filter(condition)
        .order_by_asc(ProductCol::Name)
        .order_by_asc(ProductCol::Id)
        .limit(SEARCH_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;
    Ok(ApiResponse::success(
        "Product",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn create_product(
    state: &AppState,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let fields = ProductFields::try_from(payload)?;
    let code = fields.code.clone();

    let active = ProductActive {
        id: NotSet,
        code: Set(fields.code),
        name: Set(fields.name),
        price_kg: Set(fields.price_kg),
        price_unit: Set(fields.price_unit),
        price_lb: Set(fields.price_lb),
        created_at: NotSet,
    };
    let product = active
        .insert(&state.orm)
        .await
        .map_err(|err| duplicate_code(err, &code))?;

    tracing::info!(product_id = product.id, code = %product.code, "product created");

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Replaces every editable field of a product.
pub async fn update_product(
    state: &AppState,
    id: i32,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let fields = ProductFields::try_from(payload)?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;

    let code = fields.code.clone();
    let mut active: ProductActive = existing.into();
    active.code = Set(fields.code);
    active.name = Set(fields.name);
    active.price_kg = Set(fields.price_kg);
    active.price_unit = Set(fields.price_unit);
    active.price_lb = Set(fields.price_lb);
    let product = active
        .update(&state.orm)
        .await
        .map_err(|err| duplicate_code(err, &code))?;

    tracing::info!(product_id = id, "product updated");

    Ok(ApiResponse::success(
        "Product updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Products already ordered or invoiced are kept for the history.
pub async fn delete_product(state: &AppState, id: i32) -> AppResult<ApiResponse<Ack>> {
    let result = Products::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|err| still_referenced(err, format!("product {id} appears on orders or invoices")))?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Product {id}")));
    }

    tracing::info!(product_id = id, "product deleted");
    Ok(ApiResponse::success("Product deleted", Ack::default(), Some(Meta::empty())))
}

pub async fn list_clients(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<ClientList>> {
    let (page, limit, offset) = pagination.normalize();
    let total = Clients::find().count(&state.orm).await?;
    let items: Vec<Client> = Clients::find()
        .order_by_asc(ClientCol::Name)
        .order_by_asc(ClientCol::Id)
        .offset(offset as u64)
        .limit(limit as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(client_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Clients",
        ClientList { items },
        Some(Meta::new(page, limit, total as i64)),
    ))
}

pub async fn search_clients(
    state: &AppState,
    query: SearchQuery,
) -> AppResult<ApiResponse<ClientList>> {
    let pattern = query.prefix_pattern();
    let condition = Condition::any()
        .add(Expr::col(ClientCol::Name).ilike(pattern.clone()))
        .add(Expr::col(ClientCol::Phone).ilike(pattern));

    let items: Vec<Client> = Clients::find()
        .filter(condition)
        .order_by_asc(ClientCol::Name)
        .order_by_asc(ClientCol::Id)
        .limit(SEARCH_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(client_from_entity)
        .collect();

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Clients", ClientList { items }, Some(meta)))
}

pub async fn get_client(state: &AppState, id: i32) -> AppResult<ApiResponse<Client>> {
    let client = Clients::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client {id}")))?;
    Ok(ApiResponse::success(
        "Client",
        client_from_entity(client),
        Some(Meta::empty()),
    ))
}

pub async fn create_client(
    state: &AppState,
    payload: ClientRequest,
) -> AppResult<ApiResponse<Client>> {
    let (name, address, phone) = client_fields(payload)?;

    let client = ClientActive {
        id: NotSet,
        name: Set(name),
        address: Set(address),
        phone: Set(phone),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(client_id = client.id, "client created");

    Ok(ApiResponse::success(
        "Client created",
        client_from_entity(client),
        Some(Meta::empty()),
    ))
}

pub async fn update_client(
    state: &AppState,
    id: i32,
    payload: ClientRequest,
) -> AppResult<ApiResponse<Client>> {
    let (name, address, phone) = client_fields(payload)?;
    let existing = Clients::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client {id}")))?;

    let mut active: ClientActive = existing.into();
    active.name = Set(name);
    active.address = Set(address);
    active.phone = Set(phone);
    let client = active.update(&state.orm).await?;

    tracing::info!(client_id = id, "client updated");

    Ok(ApiResponse::success(
        "Client updated",
        client_from_entity(client),
        Some(Meta::empty()),
    ))
}

pub async fn delete_client(state: &AppState, id: i32) -> AppResult<ApiResponse<Ack>> {
    let result = Clients::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|err| still_referenced(err, format!("client {id} has orders or invoices")))?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Client {id}")));
    }

    tracing::info!(client_id = id, "client deleted");
    Ok(ApiResponse::success("Client deleted", Ack::default(), Some(Meta::empty())))
}

/// Trimmed name plus optional contact fields, blanks dropped.
fn client_fields(payload: ClientRequest) -> AppResult<(String, Option<String>, Option<String>)> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("client name is required".into()));
    }
    let optional = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    Ok((name, optional(payload.address), optional(payload.phone)))
}

fn duplicate_code(err: DbErr, code: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(format!("product code {code} already exists"))
        }
        _ => err.into(),
    }
}

fn still_referenced(err: DbErr, message: String) -> AppError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::Conflict(message),
        _ => err.into(),
    }
}

/// A missing price means the product is not sold in that unit.
fn list_price(field: &str, value: Option<Decimal>) -> AppResult<Decimal> {
    let price = value.unwrap_or(Decimal::ZERO);
    if price < Decimal::ZERO {
        return Err(AppError::BadRequest(format!("{field} must not be negative")));
    }
    Ok(round_money(price))
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        code: model.code,
        name: model.name,
        price_kg: model.price_kg,
        price_unit: model.price_unit,
        price_lb: model.price_lb,
    }
}

fn client_from_entity(model: ClientModel) -> Client {
    Client {
        id: model.id,
        name: model.name,
        address: model.address,
        phone: model.phone,
    }
}
