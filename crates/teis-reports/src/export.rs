//! # Customer CSV Export
//!
//! Fixed 11-column layout, one row per customer (inactive ones included):
//!
//! ```text
//! dni_nie,adddata,surname,name,mail,mobile,address,province,city,invoicetype,historical
//! 12345678Z,01/01/2025,Otero,Marta,marta@mail.com,612345678,Rúa 1,Pontevedra,Vigo,paper,True
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use teis_core::Customer;
use tracing::info;

use crate::error::ReportResult;

/// Column names, in file order.
pub const CUSTOMER_CSV_HEADER: [&str; 11] = [
    "dni_nie",
    "adddata",
    "surname",
    "name",
    "mail",
    "mobile",
    "address",
    "province",
    "city",
    "invoicetype",
    "historical",
];

#[derive(Debug, Serialize)]
struct CustomerRow<'a> {
    dni_nie: &'a str,
    adddata: String,
    surname: &'a str,
    name: &'a str,
    mail: &'a str,
    mobile: &'a str,
    address: &'a str,
    province: &'a str,
    city: &'a str,
    invoicetype: &'a str,
    historical: &'static str,
}

impl<'a> From<&'a Customer> for CustomerRow<'a> {
    fn from(c: &'a Customer) -> Self {
        CustomerRow {
            dni_nie: &c.dni_nie,
            adddata: c.registered_on.format("%d/%m/%Y").to_string(),
            surname: &c.surname,
            name: &c.name,
            mail: &c.email,
            mobile: &c.mobile,
            address: &c.address,
            province: &c.province,
            city: &c.city,
            invoicetype: c.invoice_type.as_str(),
            historical: if c.is_active { "True" } else { "False" },
        }
    }
}

/// Writes the customers as CSV to any writer. Returns the row count.
pub fn write_customers_csv<W: Write>(customers: &[Customer], out: W) -> ReportResult<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    // Written explicitly so an empty export still carries the header.
    writer.write_record(CUSTOMER_CSV_HEADER)?;
    for customer in customers {
        writer.serialize(CustomerRow::from(customer))?;
    }
    writer.flush()?;

    Ok(customers.len())
}

/// Writes the customers CSV to `path`.
pub fn export_customers_csv(customers: &[Customer], path: &Path) -> ReportResult<usize> {
    let file = std::fs::File::create(path)?;
    let rows = write_customers_csv(customers, file)?;
    info!(path = %path.display(), rows, "Customers exported");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use teis_core::InvoiceType;

    fn customer(dni: &str, active: bool) -> Customer {
        Customer {
            dni_nie: dni.to_string(),
            registered_on: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            surname: "Otero Vila".to_string(),
            name: "Marta".to_string(),
            email: "marta@mail.com".to_string(),
            mobile: "612345678".to_string(),
            address: "Rúa 1, 2º".to_string(),
            province: "Pontevedra".to_string(),
            city: "Vigo".to_string(),
            invoice_type: InvoiceType::Paper,
            is_active: active,
        }
    }

    #[test]
    fn test_header_and_rows() {
        let mut buf = Vec::new();
        let rows = write_customers_csv(
            &[customer("12345678Z", true), customer("X1234567L", false)],
            &mut buf,
        )
        .unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CUSTOMER_CSV_HEADER.join(","));
        assert_eq!(
            lines[1],
            "12345678Z,02/01/2025,Otero Vila,Marta,marta@mail.com,612345678,\"Rúa 1, 2º\",Pontevedra,Vigo,paper,True"
        );
        assert!(lines[2].ends_with(",paper,False"));
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let mut buf = Vec::new();
        write_customers_csv(&[], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_export_to_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.csv");
        export_customers_csv(&[customer("12345678Z", true)], &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 11);
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "12345678Z");
        assert_eq!(&record[10], "True");
    }
}
