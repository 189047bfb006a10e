use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        catalog::{ClientList, ClientRequest, ProductRequest, ProductList},
        invoices::{CreateInvoiceRequest, InvoiceCreated, InvoiceDetail, InvoiceLineInput, InvoiceList},
        kitchen::{AdvanceItemRequest, QueueList},
        orders::{AddItemRequest, CloseOrderRequest, ItemCreated, MoveOrderRequest, OrderMoved, OrderWithItems},
        tables::{CreateTableRequest, OpenOrderRequest, TableList},
    },
    error::ErrorData,
    models::{
        Client, DiningTable, Invoice, InvoiceLine, InvoiceSummary, Order, OrderItem, Product,
        QueueItem, TableWithOccupancy,
    },
    response::{Ack, ApiResponse, Meta},
    routes::{clients, health, invoices, items, kitchen, orders, params, products, tables},
    workflow::{ItemStatus, OrderStatus, PaymentMethod, TableStatus, Unit},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        tables::list_tables,
        tables::create_table,
        tables::open_order,
        tables::release_table,
        orders::get_order,
        orders::add_item,
        orders::move_order,
        orders::close_with_invoice,
        items::remove_item,
        items::send_to_kitchen,
        items::mark_served,
        items::cancel_item,
        kitchen::list_queue,
        kitchen::advance_item,
        invoices::list_invoices,
        invoices::create_invoice,
        invoices::get_invoice,
        products::list_products,
        products::search_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        clients::list_clients,
        clients::search_clients,
        clients::get_client,
        clients::create_client,
        clients::update_client,
        clients::delete_client
    ),
    components(
        schemas(
            TableStatus,
            OrderStatus,
            ItemStatus,
            Unit,
            PaymentMethod,
            DiningTable,
            TableWithOccupancy,
            Order,
            OrderItem,
            QueueItem,
            Invoice,
            InvoiceLine,
            InvoiceSummary,
            Product,
            Client,
            CreateTableRequest,
            OpenOrderRequest,
            TableList,
            OrderWithItems,
            AddItemRequest,
            ItemCreated,
            MoveOrderRequest,
            OrderMoved,
            CloseOrderRequest,
            AdvanceItemRequest,
            QueueList,
            InvoiceLineInput,
            CreateInvoiceRequest,
            InvoiceCreated,
            InvoiceDetail,
            InvoiceList,
            ProductRequest,
            ClientRequest,
            ProductList,
            ClientList,
            params::Pagination,
            params::SearchQuery,
            params::SalesQuery,
            Ack,
            ErrorData,
            Meta,
            ApiResponse<TableList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<QueueList>,
            ApiResponse<InvoiceDetail>,
            ApiResponse<InvoiceList>,
            ApiResponse<ProductList>,
            ApiResponse<ClientList>,
            ApiResponse<Ack>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Tables", description = "Floor plan and table occupancy"),
        (name = "Orders", description = "Table orders"),
        (name = "Items", description = "Order item lifecycle"),
        (name = "Kitchen", description = "Kitchen preparation queue"),
        (name = "Invoices", description = "Billing and sales history"),
        (name = "Catalog", description = "Products and clients"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
