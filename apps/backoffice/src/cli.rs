//! # Launcher Command Line
//!
//! `teis <area> <action> [args]`, one subcommand per record-manager
//! operation. Results go to stdout as text, or as JSON with `--json`;
//! logs go to stderr.
//!
//! ```text
//! teis customer add 12345678Z --surname Otero --name Marta ...
//! teis product list --json
//! teis invoice new --customer 12345678Z --line "Pan de Cea:2" --line "Aceite:1"
//! teis report customers
//! teis backup create
//! teis theme set Light
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use teis_core::{Customer, CustomerForm, Invoice, InvoiceType, Product, ProductForm, SaleLine};

use crate::commands::{backup, customer, invoice, location, product, report, settings};
use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, DbState, ThemeManager};

/// Teis POS back office.
#[derive(Parser, Debug)]
#[command(name = "teis", version, about, long_about = None)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Database file (overrides TEIS_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage customers
    #[command(subcommand)]
    Customer(CustomerCommand),
    /// Manage products
    #[command(subcommand)]
    Product(ProductCommand),
    /// Manage invoices and their sales
    #[command(subcommand)]
    Invoice(InvoiceCommand),
    /// Write PDF reports and CSV exports
    #[command(subcommand)]
    Report(ReportCommand),
    /// Back up or restore the database
    #[command(subcommand)]
    Backup(BackupCommand),
    /// Read and write settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// List or switch stylesheets
    #[command(subcommand)]
    Theme(ThemeCommand),
    /// List provinces
    Provinces,
    /// List the municipalities of a province
    Cities { province: String },
}

#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    /// List customers (active only unless --all)
    List {
        #[arg(long)]
        all: bool,
    },
    /// Show one customer
    Get { dni_nie: String },
    /// Find a customer by mobile number
    FindMobile { mobile: String },
    /// Register a customer
    Add(CustomerArgs),
    /// Overwrite a customer's data
    Modify {
        #[command(flatten)]
        customer: CustomerArgs,
        /// Mark the customer active again
        #[arg(long)]
        reactivate: bool,
    },
    /// Mark a customer inactive
    Delete { dni_nie: String },
}

#[derive(Args, Debug)]
pub struct CustomerArgs {
    pub dni_nie: String,
    #[arg(long)]
    pub surname: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub mobile: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub province: String,
    #[arg(long)]
    pub city: String,
    /// electronic or paper
    #[arg(long, default_value_t = InvoiceType::Electronic)]
    pub invoice_type: InvoiceType,
    /// Registration date (YYYY-MM-DD); today when omitted
    #[arg(long)]
    pub registered: Option<NaiveDate>,
}

impl From<CustomerArgs> for CustomerForm {
    fn from(args: CustomerArgs) -> Self {
        CustomerForm {
            dni_nie: args.dni_nie,
            registered_on: args.registered,
            surname: args.surname,
            name: args.name,
            email: args.email,
            mobile: args.mobile,
            address: args.address,
            province: args.province,
            city: args.city,
            invoice_type: args.invoice_type,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// List products
    List,
    /// Show one product by name, or by code with --code
    Get {
        #[arg(required_unless_present = "code", conflicts_with = "code")]
        name: Option<String>,
        #[arg(long)]
        code: Option<i64>,
    },
    /// List the families that have products
    Families,
    /// Add a product
    Add(ProductArgs),
    /// Overwrite the product with CODE
    Modify {
        code: i64,
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Delete a product by name
    Delete { name: String },
}

#[derive(Args, Debug)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub stock: String,
    #[arg(long)]
    pub family: String,
    /// Unit price, e.g. 12.50
    #[arg(long)]
    pub price: String,
    #[arg(long, default_value = "€")]
    pub currency: String,
}

impl From<ProductArgs> for ProductForm {
    fn from(args: ProductArgs) -> Self {
        ProductForm {
            name: args.name,
            stock: args.stock,
            family: args.family,
            unit_price: args.price,
            currency: args.currency,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum InvoiceCommand {
    /// List invoices, newest first
    List,
    /// Show the customer an invoice for DNI_NIE would carry
    Header { dni_nie: String },
    /// Create an invoice and save its lines
    New {
        /// Customer national ID; the generic customer when omitted
        #[arg(long)]
        customer: Option<String>,
        /// PRODUCT:QUANTITY, repeatable
        #[arg(long = "line", value_parser = parse_line)]
        lines: Vec<(String, i64)>,
    },
    /// Show the lines and totals an invoice would have, saving nothing
    Preview {
        /// PRODUCT:QUANTITY, repeatable
        #[arg(long = "line", value_parser = parse_line, required = true)]
        lines: Vec<(String, i64)>,
    },
    /// Add lines to an existing invoice
    AddLines {
        id: i64,
        /// PRODUCT:QUANTITY, repeatable
        #[arg(long = "line", value_parser = parse_line, required = true)]
        lines: Vec<(String, i64)>,
    },
    /// Show an invoice with lines and totals
    Show { id: i64 },
    /// Delete an invoice and its lines
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// PDF of all customers
    Customers,
    /// PDF of the product catalogue
    Products {
        /// Only products with stock below this level (default 10)
        #[arg(
            long,
            value_name = "BELOW",
            num_args = 0..=1,
            default_missing_value = "10"
        )]
        low_stock: Option<i64>,
        /// Only products of this family
        #[arg(long, conflicts_with = "low_stock")]
        family: Option<String>,
    },
    /// PDF of one invoice
    Invoice { id: i64 },
    /// CSV of all customers
    Export,
}

#[derive(Subcommand, Debug)]
pub enum BackupCommand {
    /// Snapshot the database into the backups directory
    Create,
    /// Replace the database with a backup
    Restore { path: PathBuf },
    /// List backups, newest first
    List,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// List stored settings
    List,
    /// Show one setting
    Get { key: String },
    /// Store a setting
    Set { key: String, value: String },
    /// Show the active configuration
    Config,
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// List available stylesheets
    List,
    /// Show the current theme
    Current,
    /// Switch theme
    Set { name: String },
}

/// Parses `PRODUCT:QUANTITY`. The product name may itself contain `:`.
pub fn parse_line(s: &str) -> Result<(String, i64), String> {
    let (name, qty) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected PRODUCT:QUANTITY, got '{s}'"))?;
    let qty = qty
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid quantity in '{s}'"))?;
    Ok((name.trim().to_string(), qty))
}

// =============================================================================
// Dispatch
// =============================================================================

/// State handed to every command.
pub struct Context<'a> {
    pub db: &'a DbState,
    pub config: &'a ConfigState,
    pub themes: &'a mut ThemeManager,
    pub json: bool,
}

impl Context<'_> {
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T) -> String) -> ApiResult<()> {
        if self.json {
            let text = serde_json::to_string_pretty(value)
                .map_err(|e| ApiError::internal(e.to_string()))?;
            println!("{text}");
        } else {
            println!("{}", human(value));
        }
        Ok(())
    }
}

/// Runs one parsed command.
pub async fn dispatch(command: Commands, mut ctx: Context<'_>) -> ApiResult<()> {
    let db = ctx.db;
    let config = ctx.config;

    match command {
        Commands::Customer(cmd) => match cmd {
            CustomerCommand::List { all } => {
                let customers = customer::list_customers(db, all).await?;
                ctx.emit(&customers, |c| customer_table(c))
            }
            CustomerCommand::Get { dni_nie } => {
                let c = customer::get_customer(db, &dni_nie).await?;
                ctx.emit(&c, customer_card)
            }
            CustomerCommand::FindMobile { mobile } => {
                let c = customer::find_customer_by_mobile(db, &mobile).await?;
                ctx.emit(&c, customer_card)
            }
            CustomerCommand::Add(args) => {
                let c = customer::create_customer(db, args.into()).await?;
                ctx.emit(&c, |c| format!("Customer {} saved", c.dni_nie))
            }
            CustomerCommand::Modify {
                customer: args,
                reactivate,
            } => {
                let c = customer::modify_customer(db, args.into(), reactivate).await?;
                ctx.emit(&c, |c| format!("Customer {} modified", c.dni_nie))
            }
            CustomerCommand::Delete { dni_nie } => {
                customer::delete_customer(db, &dni_nie).await?;
                ctx.emit(&dni_nie, |d| format!("Customer {d} marked inactive"))
            }
        },

        Commands::Product(cmd) => match cmd {
            ProductCommand::List => {
                let products = product::list_products(db).await?;
                ctx.emit(&products, |p| product_table(p))
            }
            ProductCommand::Get { name, code } => {
                let p = match (code, name) {
                    (Some(code), _) => product::get_product_by_code(db, code).await?,
                    (None, Some(name)) => product::get_product(db, &name).await?,
                    (None, None) => return Err(ApiError::validation("give a name or --code")),
                };
                ctx.emit(&p, |p| product_table(std::slice::from_ref(p)))
            }
            ProductCommand::Families => {
                let families = product::product_families(db).await?;
                ctx.emit(&families, |f| f.join("\n"))
            }
            ProductCommand::Add(args) => {
                let p = product::create_product(db, args.into()).await?;
                ctx.emit(&p, |p| format!("Product {} saved with code {}", p.name, p.code))
            }
            ProductCommand::Modify { code, product: args } => {
                let p = product::modify_product(db, code, args.into()).await?;
                ctx.emit(&p, |p| format!("Product {} modified", p.code))
            }
            ProductCommand::Delete { name } => {
                product::delete_product(db, &name).await?;
                ctx.emit(&name, |n| format!("Product {n} deleted"))
            }
        },

        Commands::Invoice(cmd) => match cmd {
            InvoiceCommand::List => {
                let invoices = invoice::list_invoices(db).await?;
                ctx.emit(&invoices, |i| invoice_table(i))
            }
            InvoiceCommand::Header { dni_nie } => {
                let c = invoice::invoice_header(db, &dni_nie).await?;
                ctx.emit(&c, customer_card)
            }
            InvoiceCommand::New { customer, lines } => {
                let draft = invoice::build_draft(db, &lines).await?;
                let created = invoice::issue_invoice(db, customer.as_deref(), &draft).await?;
                let detail = invoice::invoice_detail(db, config, created.id).await?;
                ctx.emit(&detail, |d| invoice_card(d, &config.currency_symbol))
            }
            InvoiceCommand::Preview { lines } => {
                let draft = invoice::build_draft(db, &lines).await?;
                let view = invoice::preview(&draft, config);
                ctx.emit(&view, |v| draft_card(v, &config.currency_symbol))
            }
            InvoiceCommand::AddLines { id, lines } => {
                let draft = invoice::build_draft(db, &lines).await?;
                invoice::save_sales(db, id, &draft).await?;
                let detail = invoice::invoice_detail(db, config, id).await?;
                ctx.emit(&detail, |d| invoice_card(d, &config.currency_symbol))
            }
            InvoiceCommand::Show { id } => {
                let detail = invoice::invoice_detail(db, config, id).await?;
                ctx.emit(&detail, |d| invoice_card(d, &config.currency_symbol))
            }
            InvoiceCommand::Delete { id } => {
                let lines = invoice::delete_invoice(db, id).await?;
                ctx.emit(&lines, |n| format!("Invoice {id} deleted with {n} lines"))
            }
        },

        Commands::Report(cmd) => {
            let path = match cmd {
                ReportCommand::Customers => report::customer_report(db, config).await?,
                ReportCommand::Products { low_stock, family } => {
                    report::product_report(db, config, low_stock, family.as_deref()).await?
                }
                ReportCommand::Invoice { id } => report::invoice_report(db, config, id).await?,
                ReportCommand::Export => report::export_customers(db, config).await?,
            };
            ctx.emit(&path, |p| format!("Written {}", p.display()))
        }

        Commands::Backup(cmd) => match cmd {
            BackupCommand::Create => {
                let info = backup::backup_database(db, config).await?;
                ctx.emit(&info, |b| format!("Backup {} ({} bytes)", b.path.display(), b.bytes))
            }
            BackupCommand::Restore { path } => {
                backup::restore_database(db, &path).await?;
                ctx.emit(&path, |p| format!("Restored from {}", p.display()))
            }
            BackupCommand::List => {
                let backups = backup::list_backups(config).await?;
                ctx.emit(&backups, |list| {
                    list.iter()
                        .map(|b| format!("{}  {} bytes", b.path.display(), b.bytes))
                        .collect::<Vec<_>>()
                        .join("\n")
                })
            }
        },

        Commands::Settings(cmd) => match cmd {
            SettingsCommand::List => {
                let all = settings::list_settings(db).await?;
                ctx.emit(&all, |map| {
                    map.iter()
                        .map(|(k, v)| format!("{k} = {v}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                })
            }
            SettingsCommand::Get { key } => {
                let value = settings::get_setting(db, &key).await?;
                ctx.emit(&value, |v| v.clone())
            }
            SettingsCommand::Set { key, value } => {
                settings::save_setting(db, &key, &value).await?;
                ctx.emit(&key, |k| format!("Setting {k} saved"))
            }
            SettingsCommand::Config => {
                let dto = settings::get_config(config);
                ctx.emit(&dto, |d| {
                    format!(
                        "database: {}\nreports:  {}\nexports:  {}\nbackups:  {}\nstyles:   {}\nIVA:      {}%",
                        d.config.db_path.display(),
                        d.reports_dir.display(),
                        d.exports_dir.display(),
                        d.backups_dir.display(),
                        d.config.styles_dir.display(),
                        d.config.vat_rate().percentage(),
                    )
                })
            }
        },

        Commands::Theme(cmd) => match cmd {
            ThemeCommand::List => {
                let themes = settings::available_themes(ctx.themes);
                ctx.emit(&themes, |t| t.join("\n"))
            }
            ThemeCommand::Current => {
                let current = ctx.themes.current_theme().to_string();
                ctx.emit(&current, |c| c.clone())
            }
            ThemeCommand::Set { name } => {
                settings::change_theme(db, ctx.themes, &name).await?;
                ctx.emit(&name, |n| format!("Theme changed to {n}"))
            }
        },

        Commands::Provinces => {
            let provinces = location::list_provinces(db).await?;
            ctx.emit(&provinces, |p| {
                p.iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Commands::Cities { province } => {
            let cities = location::list_cities(db, &province).await?;
            ctx.emit(&cities, |c| c.join("\n"))
        }
    }
}

// =============================================================================
// Text Rendering
// =============================================================================

fn customer_table(customers: &[Customer]) -> String {
    let mut out = format!(
        "{:<10} {:<20} {:<14} {:<10} {:<16} {:<10} {}",
        "DNI_NIE", "SURNAME", "NAME", "MOBILE", "CITY", "INVOICE", "STATE"
    );
    for c in customers {
        out.push_str(&format!(
            "\n{:<10} {:<20} {:<14} {:<10} {:<16} {:<10} {}",
            c.dni_nie,
            c.surname,
            c.name,
            c.mobile,
            c.city,
            c.invoice_type.as_str(),
            c.status_label()
        ));
    }
    out
}

fn customer_card(c: &Customer) -> String {
    format!(
        "{} ({})\n{}\n{} | {}\nregistered {} | {} invoices | {}",
        c.full_name(),
        c.dni_nie,
        c.full_address(),
        c.email,
        c.mobile,
        c.registered_on.format("%d/%m/%Y"),
        c.invoice_type,
        c.status_label()
    )
}

fn product_table(products: &[Product]) -> String {
    let mut out = format!(
        "{:>5} {:<30} {:>6} {:<12} {:>12}",
        "CODE", "NAME", "STOCK", "FAMILY", "PRICE"
    );
    for p in products {
        out.push_str(&format!(
            "\n{:>5} {:<30} {:>6} {:<12} {:>12}",
            p.code,
            p.name,
            p.stock,
            p.family,
            p.unit_price.format_with(&p.currency)
        ));
    }
    out
}

fn invoice_table(invoices: &[Invoice]) -> String {
    let mut out = format!("{:>5} {:<10} {}", "ID", "DNI_NIE", "DATE");
    for i in invoices {
        out.push_str(&format!(
            "\n{:>5} {:<10} {}",
            i.id,
            i.dni_nie,
            i.issued_on.format("%d/%m/%Y")
        ));
    }
    out
}

fn sale_rows(lines: &[SaleLine], currency: &str) -> String {
    lines
        .iter()
        .map(|l| {
            format!(
                "{:>5} {:<30} {:>12} {:>4} {:>12}",
                l.product_code,
                l.product_name,
                l.unit_price.format_with(currency),
                l.quantity,
                l.line_total.format_with(currency)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn invoice_card(d: &invoice::InvoiceDetail, currency: &str) -> String {
    format!(
        "Invoice Nº {} ({})\n{} ({})\n\n{}\n\nSubtotal: {}\nIVA:      {}\nTotal:    {}",
        d.invoice.id,
        d.invoice.issued_on.format("%d/%m/%Y"),
        d.customer.full_name(),
        d.customer.dni_nie,
        sale_rows(&d.lines, currency),
        d.totals.subtotal.format_with(currency),
        d.totals.tax.format_with(currency),
        d.totals.total.format_with(currency)
    )
}

fn draft_card(d: &invoice::DraftDto, currency: &str) -> String {
    let rows = d
        .lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            format!(
                "{:>3} {:<30} {:>12} {:>4} {:>12}",
                i + 1,
                l.product_name,
                l.unit_price.format_with(currency),
                l.quantity,
                l.line_total.format_with(currency)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{}\n\nSubtotal: {}\nIVA:      {}\nTotal:    {}",
        rows,
        d.totals.subtotal.format_with(currency),
        d.totals.tax.format_with(currency),
        d.totals.total.format_with(currency)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("Pan de Cea:2"), Ok(("Pan de Cea".to_string(), 2)));
        assert_eq!(parse_line("Cable 2:1 m:3"), Ok(("Cable 2:1 m".to_string(), 3)));
        assert!(parse_line("Pan").is_err());
        assert!(parse_line("Pan:two").is_err());
    }

    #[test]
    fn test_parse_invoice_new() {
        let cli = Cli::try_parse_from([
            "teis", "--json", "invoice", "new", "--customer", "12345678Z", "--line", "Pan:2",
            "--line", "Aceite:1",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Invoice(InvoiceCommand::New { customer, lines }) => {
                assert_eq!(customer.as_deref(), Some("12345678Z"));
                assert_eq!(lines.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_customer_add_with_invoice_type() {
        let cli = Cli::try_parse_from([
            "teis", "customer", "add", "12345678Z", "--surname", "Otero", "--name", "Marta",
            "--email", "marta@mail.com", "--mobile", "612345678", "--address", "Rúa 1",
            "--province", "Pontevedra", "--city", "Vigo", "--invoice-type", "paper",
        ])
        .unwrap();

        match cli.command {
            Commands::Customer(CustomerCommand::Add(args)) => {
                let form: CustomerForm = args.into();
                assert_eq!(form.invoice_type, InvoiceType::Paper);
                assert!(form.registered_on.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_report_products_options() {
        let parse = |args: &[&str]| {
            let mut argv = vec!["teis", "report", "products"];
            argv.extend_from_slice(args);
            Cli::try_parse_from(argv)
        };

        match parse(&["--low-stock"]).unwrap().command {
            Commands::Report(ReportCommand::Products { low_stock, family }) => {
                assert_eq!(low_stock, Some(teis_reports::DEFAULT_LOW_STOCK_THRESHOLD));
                assert!(family.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
        match parse(&["--low-stock", "3"]).unwrap().command {
            Commands::Report(ReportCommand::Products { low_stock, .. }) => {
                assert_eq!(low_stock, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        match parse(&["--family", "Foods"]).unwrap().command {
            Commands::Report(ReportCommand::Products { low_stock, family }) => {
                assert!(low_stock.is_none());
                assert_eq!(family.as_deref(), Some("Foods"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(parse(&["--low-stock", "--family", "Foods"]).is_err());
    }

    #[test]
    fn test_parse_product_get_by_name_or_code() {
        match Cli::try_parse_from(["teis", "product", "get", "--code", "7"]).unwrap().command {
            Commands::Product(ProductCommand::Get { name, code }) => {
                assert!(name.is_none());
                assert_eq!(code, Some(7));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["teis", "product", "get"]).is_err());
        assert!(Cli::try_parse_from(["teis", "product", "get", "Pan", "--code", "7"]).is_err());
    }

    #[test]
    fn test_parse_invoice_add_lines_requires_a_line() {
        let cli = Cli::try_parse_from(["teis", "invoice", "add-lines", "4", "--line", "Pan:2"]).unwrap();
        match cli.command {
            Commands::Invoice(InvoiceCommand::AddLines { id, lines }) => {
                assert_eq!(id, 4);
                assert_eq!(lines, vec![("Pan".to_string(), 2)]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["teis", "invoice", "add-lines", "4"]).is_err());
    }

    #[test]
    fn test_draft_card_lists_lines_and_totals() {
        let mut draft = teis_core::InvoiceDraft::new();
        let product = Product {
            code: 1,
            name: "Aceite".to_string(),
            stock: 5,
            family: "Foods".to_string(),
            unit_price: teis_core::Money::from_cents(1000),
            currency: "€".to_string(),
        };
        draft.add_line(&product, 2).unwrap();

        let config = ConfigState::with_data_dir("/tmp/teis-test");
        let text = draft_card(&invoice::preview(&draft, &config), "€");
        assert!(text.contains("Aceite"));
        assert!(text.contains("Total:    24.20 €"));
    }
}
