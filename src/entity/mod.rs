pub mod clients;
pub mod dining_tables;
pub mod invoice_lines;
pub mod invoices;
pub mod order_items;
pub mod orders;
pub mod products;

pub use clients::Entity as Clients;
pub use dining_tables::Entity as DiningTables;
pub use invoice_lines::Entity as InvoiceLines;
pub use invoices::Entity as Invoices;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
