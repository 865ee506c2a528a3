//! # Commands Module
//!
//! Every operation the back office exposes. The launcher in `cli.rs`
//! drives them; a graphical front end would call the same functions.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── customer.rs  ◄─── Customer record manager (soft delete)
//! ├── product.rs   ◄─── Product record manager
//! ├── invoice.rs   ◄─── Invoice headers, draft lines, sales
//! ├── report.rs    ◄─── PDF reports and CSV export
//! ├── backup.rs    ◄─── Backup, restore, list backups
//! ├── settings.rs  ◄─── Settings, config view, themes
//! └── location.rs  ◄─── Provinces and cities
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs database
//! async fn list_customers(db: &DbState, show_all: bool)
//!
//! // Pure, no state at all
//! fn preview(draft: &InvoiceDraft, config: &ConfigState) -> DraftDto
//!
//! // Needs several
//! async fn product_report(db: &DbState, config: &ConfigState, low_stock, family)
//! ```
//!
//! Every command returns `Result<T, ApiError>`; `T` is `Serialize` so the
//! launcher can print it as JSON.

pub mod backup;
pub mod customer;
pub mod invoice;
pub mod location;
pub mod product;
pub mod report;
pub mod settings;
