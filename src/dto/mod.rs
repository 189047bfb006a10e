pub mod catalog;
pub mod invoices;
pub mod kitchen;
pub mod orders;
pub mod tables;
