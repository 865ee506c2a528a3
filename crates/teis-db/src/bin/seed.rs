//! # Seed Data Generator
//!
//! Populates the database with demo products and customers.
//!
//! ## Usage
//! ```bash
//! # Seed ./teis_dev.db
//! cargo run -p teis-db --bin seed
//!
//! # Specify database path
//! cargo run -p teis-db --bin seed -- --db ./data/teis.db
//! ```
//!
//! ## Generated Data
//! - One product per name below, spread over the four families
//! - A handful of Galician customers (one of them logically deleted)
//! - One invoice with two lines, so reports have something to show

use chrono::{Local, NaiveDate};
use std::env;
use teis_core::{Customer, InvoiceType, LineDraft, Money, NewProduct};
use teis_db::{Database, DbConfig};

/// (family, product name, price in cents)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("Foods", "Aceite de oliva 1L", 899),
    ("Foods", "Pan de Cea", 250),
    ("Foods", "Queso Tetilla", 1150),
    ("Foods", "Pulpo cocido 500g", 1875),
    ("Furniture", "Silla de roble", 4599),
    ("Furniture", "Mesa de castaño", 21900),
    ("Furniture", "Estantería", 8950),
    ("Clothes", "Chubasquero", 3499),
    ("Clothes", "Jersey de lana", 4250),
    ("Clothes", "Botas de agua", 2799),
    ("Electronic", "Auriculares", 5990),
    ("Electronic", "Cargador USB-C", 1999),
    ("Electronic", "Altavoz bluetooth", 3950),
];

/// (dni, surname, name, mobile, city, province, active)
const CUSTOMERS: &[(&str, &str, &str, &str, &str, &str, bool)] = &[
    ("12345678Z", "Otero Vila", "Marta", "612345678", "Vigo", "Pontevedra", true),
    ("00000001R", "Abal Souto", "Xoán", "622222222", "Lugo", "Lugo", true),
    ("X1234567L", "Silva Costa", "Joana", "633333333", "Ourense", "Ourense", true),
    ("11111111H", "Castro Rey", "Antón", "644444444", "A Coruña", "A Coruña", false),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./teis_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Teis POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./teis_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Teis POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");
    let mut created = Vec::new();
    for (family, name, cents) in PRODUCTS {
        let product = NewProduct {
            name: name.to_string(),
            stock: 5 + (*cents % 40),
            family: family.to_string(),
            unit_price: Money::from_cents(*cents),
            currency: "€".to_string(),
        };
        match db.products().insert(&product).await {
            Ok(p) => created.push(p),
            Err(e) => eprintln!("Failed to insert {}: {}", name, e),
        }
    }
    println!("  ✓ {} products", created.len());

    println!("Generating customers...");
    let registered_on = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap_or_default();
    for (dni, surname, name, mobile, city, province, active) in CUSTOMERS {
        let customer = Customer {
            dni_nie: dni.to_string(),
            registered_on,
            surname: surname.to_string(),
            name: name.to_string(),
            email: format!("{}@mail.com", name.to_lowercase()),
            mobile: mobile.to_string(),
            address: "Rúa Principal 1".to_string(),
            province: province.to_string(),
            city: city.to_string(),
            invoice_type: if *active {
                InvoiceType::Electronic
            } else {
                InvoiceType::Paper
            },
            is_active: *active,
        };
        if let Err(e) = db.customers().insert(&customer).await {
            eprintln!("Failed to insert {}: {}", dni, e);
        }
    }
    println!("  ✓ {} customers", CUSTOMERS.len());

    if created.len() >= 2 {
        println!("Generating a sample invoice...");
        let invoice = db
            .invoices()
            .create(CUSTOMERS[0].0, Local::now().date_naive())
            .await?;
        let lines: Vec<LineDraft> = created[..2]
            .iter()
            .map(|p| LineDraft {
                product_code: p.code,
                product_name: p.name.clone(),
                unit_price: p.unit_price,
                quantity: 2,
            })
            .collect();
        db.invoices().save_lines(invoice.id, &lines).await?;
        println!("  ✓ invoice {} with {} lines", invoice.id, lines.len());
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
