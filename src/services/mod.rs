pub mod catalog_service;
pub mod invoice_service;
pub mod kitchen_service;
pub mod order_service;
pub mod table_service;
