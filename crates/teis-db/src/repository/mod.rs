//! # Repository Module
//!
//! Database repository implementations for Teis POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Command (backoffice)                                                  │
//! │       │                                                                 │
//! │       │  db.customers().list(false)                                     │
//! │       ▼                                                                 │
//! │  CustomerRepository                                                    │
//! │  ├── list(&self, show_all)                                             │
//! │  ├── get(&self, dni_nie)                                               │
//! │  ├── insert(&self, customer)                                           │
//! │  └── update(&self, customer)                                           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customers, soft delete
//! - [`product::ProductRepository`] - Product CRUD
//! - [`invoice::InvoiceRepository`] - Invoice headers and sale lines
//! - [`settings::SettingsRepository`] - Key/value preferences
//! - [`location::LocationRepository`] - Provinces and municipalities

pub mod customer;
pub mod invoice;
pub mod location;
pub mod product;
pub mod settings;
