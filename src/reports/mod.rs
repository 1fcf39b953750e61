//! Reports page: aggregate statistics, category rollups, sorted catalog and
//! low-stock tables, plus CSV export.
//!
//! Everything derives from one in-memory snapshot of the product collection;
//! nothing here re-fetches or mutates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{ClientError, Result};
use crate::models::{Action, Product, Role, StockStatus};
use crate::render::{Cell, Row, Table};

/// Severity of a low-stock row. Distinct from the three-way stock status: it
/// grades how urgent the restock is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    OutOfStock,
    Critical,
    Low,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::OutOfStock => "OUT OF STOCK",
            Severity::Critical => "CRITICAL",
            Severity::Low => "LOW",
        }
    }

    /// Zero stock is always `OutOfStock`; otherwise a shortage strictly above
    /// half the minimum level is `Critical`. A shortage exactly at half is
    /// `Low`.
    pub fn classify(product: &Product) -> Self {
        if product.quantity_in_stock == 0 {
            Severity::OutOfStock
        } else if 2 * product.shortage() > product.min_stock_level {
            Severity::Critical
        } else {
            Severity::Low
        }
    }
}

/// Per-category rollup, keyed by category name ("Uncategorized" when empty).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub count: usize,
    pub total_stock: i64,
    pub total_value: Decimal,
}

/// All derived report data, recomputed from scratch on every load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub total_products: usize,
    pub total_value: Decimal,
    /// Flagged products that still have some stock.
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    /// Sorted by category name.
    pub categories: BTreeMap<String, CategoryStat>,
    /// Full catalog, sorted case-insensitively by product name.
    pub catalog: Vec<Product>,
    /// Products at or below minimum, most critical (largest shortage) first.
    pub low_stock: Vec<Product>,
}

const UNCATEGORIZED: &str = "Uncategorized";

impl ReportSnapshot {
    pub fn build(products: &[Product]) -> Self {
        let total_products = products.len();
        let total_value: Decimal = products.iter().map(Product::stock_value).sum();
        let low_stock_count = products
            .iter()
            .filter(|p| p.is_low() && p.quantity_in_stock > 0)
            .count();
        let out_of_stock_count = products
            .iter()
            .filter(|p| p.quantity_in_stock == 0)
            .count();

        let mut categories: BTreeMap<String, CategoryStat> = BTreeMap::new();
        for product in products {
            let key = if product.category.is_empty() {
                UNCATEGORIZED.to_string()
            } else {
                product.category.clone()
            };
            let stat = categories.entry(key).or_default();
            stat.count += 1;
            stat.total_stock += product.quantity_in_stock;
            stat.total_value += product.stock_value();
        }

        let mut catalog = products.to_vec();
        catalog.sort_by(|a, b| {
            a.product_name
                .to_lowercase()
                .cmp(&b.product_name.to_lowercase())
        });

        let mut low_stock: Vec<Product> = products.iter().filter(|p| p.is_low()).cloned().collect();
        low_stock.sort_by(|a, b| b.shortage().cmp(&a.shortage()));

        Self {
            total_products,
            total_value,
            low_stock_count,
            out_of_stock_count,
            categories,
            catalog,
            low_stock,
        }
    }

    /// Full catalog table. The stock-value column is `unit_price * quantity`.
    pub fn catalog_table(&self, role: Role) -> Table {
        let mut table = Table::new(
            "Product Catalog",
            vec![
                "SKU", "Name", "Category", "Supplier", "Unit Price", "In Stock", "Stock Value",
                "Status", "Actions",
            ],
        )
        .with_empty_message("No products available");

        for product in &self.catalog {
            let actions = if role.allows(Action::RecordStock) {
                vec!["Stock", "Edit"]
            } else {
                vec![]
            };
            table.rows.push(Row::new(vec![
                Cell::Text(product.sku.clone()),
                Cell::Text(product.product_name.clone()),
                Cell::Text(product.category.clone()),
                Cell::Text(product.supplier.clone()),
                Cell::Money(product.unit_price),
                Cell::Quantity(product.quantity_in_stock, product.unit_of_measure.clone()),
                Cell::Money(product.stock_value()),
                Cell::Badge(product.stock_status().label()),
                if actions.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Actions(actions)
                },
            ]));
        }
        table
    }

    /// Low-stock alert table, most critical first.
    pub fn low_stock_table(&self) -> Table {
        let mut table = Table::new(
            "Low Stock Alert",
            vec![
                "SKU", "Name", "Category", "In Stock", "Required", "Shortage", "Status",
                "Unit Price",
            ],
        )
        .with_empty_message("No low stock items - all good!");

        for product in &self.low_stock {
            table.rows.push(Row::new(vec![
                Cell::Text(product.sku.clone()),
                Cell::Text(product.product_name.clone()),
                Cell::Text(product.category.clone()),
                Cell::Quantity(product.quantity_in_stock, product.unit_of_measure.clone()),
                Cell::Quantity(product.min_stock_level, product.unit_of_measure.clone()),
                Cell::Quantity(product.shortage(), product.unit_of_measure.clone()),
                Cell::Badge(Severity::classify(product).label()),
                Cell::Money(product.unit_price),
            ]));
        }
        table
    }

    /// CSV of the full catalog: text fields double-quoted, numerics bare,
    /// stock value rounded to two decimals.
    pub fn catalog_csv(&self) -> String {
        let mut csv =
            String::from("SKU,Product Name,Category,Supplier,Unit Price,In Stock,Stock Value,Status\n");
        for product in &self.catalog {
            let status = match product.stock_status() {
                StockStatus::OutOfStock => "Out of Stock",
                StockStatus::LowStock => "Low Stock",
                StockStatus::InStock => "In Stock",
            };
            csv.push_str(&format!(
                "{},{},{},{},{},{},{:.2},{}\n",
                quote(&product.sku),
                quote(&product.product_name),
                quote(&product.category),
                quote(&product.supplier),
                product.unit_price,
                product.quantity_in_stock,
                product.stock_value(),
                quote(status),
            ));
        }
        csv
    }

    /// CSV of the low-stock subset, in table order.
    pub fn low_stock_csv(&self) -> String {
        let mut csv = String::from(
            "SKU,Product Name,Category,In Stock,Required,Need to Restock,Status,Unit Price\n",
        );
        for product in &self.low_stock {
            let status = match Severity::classify(product) {
                Severity::OutOfStock => "Out of Stock",
                Severity::Critical => "Critical",
                Severity::Low => "Low",
            };
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                quote(&product.sku),
                quote(&product.product_name),
                quote(&product.category),
                product.quantity_in_stock,
                product.min_stock_level,
                product.shortage(),
                quote(status),
                product.unit_price,
            ));
        }
        csv
    }
}

/// Double-quotes a text field, doubling embedded quotes.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Export file names carry the current date: `inventory-report-YYYY-MM-DD.csv`.
pub fn catalog_export_name(now: DateTime<Utc>) -> String {
    format!("inventory-report-{}.csv", now.format("%Y-%m-%d"))
}

/// `low-stock-alert-YYYY-MM-DD.csv`.
pub fn low_stock_export_name(now: DateTime<Utc>) -> String {
    format!("low-stock-alert-{}.csv", now.format("%Y-%m-%d"))
}

/// What an export attempt produced.
#[derive(Debug, PartialEq)]
pub enum ExportOutcome {
    Written(PathBuf),
    /// Export/print are admin features; other roles get a silent no-op.
    SkippedForRole,
    /// Nothing matched the subset (e.g. no low-stock items).
    NothingToExport,
}

/// Writes the catalog CSV into `dir`. Silently returns for non-admin roles.
pub fn export_catalog(
    snapshot: &ReportSnapshot,
    role: Role,
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<ExportOutcome> {
    if !role.allows(Action::ExportReports) {
        return Ok(ExportOutcome::SkippedForRole);
    }
    let path = dir.join(catalog_export_name(now));
    std::fs::write(&path, snapshot.catalog_csv())?;
    info!(path = %path.display(), rows = snapshot.catalog.len(), "catalog exported");
    Ok(ExportOutcome::Written(path))
}

/// Writes the low-stock CSV into `dir`. Silently returns for non-admin roles;
/// reports an empty subset instead of writing a header-only file.
pub fn export_low_stock(
    snapshot: &ReportSnapshot,
    role: Role,
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<ExportOutcome> {
    if !role.allows(Action::ExportReports) {
        return Ok(ExportOutcome::SkippedForRole);
    }
    if snapshot.low_stock.is_empty() {
        return Ok(ExportOutcome::NothingToExport);
    }
    let path = dir.join(low_stock_export_name(now));
    std::fs::write(&path, snapshot.low_stock_csv())?;
    info!(path = %path.display(), rows = snapshot.low_stock.len(), "low-stock alert exported");
    Ok(ExportOutcome::Written(path))
}

/// Print is a no-op for non-admin roles; for admins the caller renders the
/// tables.
pub fn can_print(role: Role) -> bool {
    role.allows(Action::PrintReports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn product(sku: &str, name: &str, category: &str, price: Decimal, qty: i64, min: i64) -> Product {
        Product {
            product_id: 0,
            sku: sku.into(),
            product_name: name.into(),
            description: None,
            category: category.into(),
            supplier: "Acme".into(),
            unit_price: price,
            quantity_in_stock: qty,
            min_stock_level: min,
            unit_of_measure: "pcs".into(),
            is_low_stock: qty <= min,
            created_at: None,
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product("A1", "anvil", "Hardware", dec!(2.50), 5, 10),
            product("B2", "Bolt", "Hardware", dec!(0.10), 100, 20),
            product("C3", "Coffee", "", dec!(8.00), 0, 5),
            product("D4", "desk", "Furniture", dec!(120.00), 2, 12),
        ]
    }

    #[test]
    fn totals_fold_over_the_snapshot() {
        let snapshot = ReportSnapshot::build(&sample());
        assert_eq!(snapshot.total_products, 4);
        // 5*2.50 + 100*0.10 + 0 + 2*120.00
        assert_eq!(snapshot.total_value, dec!(262.50));
        assert_eq!(snapshot.low_stock_count, 2); // A1 and D4; C3 is out of stock
        assert_eq!(snapshot.out_of_stock_count, 1);
    }

    #[test]
    fn empty_category_folds_into_uncategorized() {
        let snapshot = ReportSnapshot::build(&sample());
        let uncategorized = &snapshot.categories["Uncategorized"];
        assert_eq!(uncategorized.count, 1);
        assert_eq!(uncategorized.total_stock, 0);
        assert_eq!(uncategorized.total_value, Decimal::ZERO);

        let hardware = &snapshot.categories["Hardware"];
        assert_eq!(hardware.count, 2);
        assert_eq!(hardware.total_stock, 105);
        assert_eq!(hardware.total_value, dec!(22.50));
    }

    #[test]
    fn catalog_sorts_by_name_case_insensitively() {
        let snapshot = ReportSnapshot::build(&sample());
        let names: Vec<_> = snapshot
            .catalog
            .iter()
            .map(|p| p.product_name.as_str())
            .collect();
        assert_eq!(names, vec!["anvil", "Bolt", "Coffee", "desk"]);
    }

    #[test]
    fn low_stock_sorts_by_shortage_descending() {
        let snapshot = ReportSnapshot::build(&sample());
        let skus: Vec<_> = snapshot.low_stock.iter().map(|p| p.sku.as_str()).collect();
        // shortages: D4=10, A1=5, C3=5 — D4 first, ties keep build order
        assert_eq!(skus[0], "D4");
        assert_eq!(snapshot.low_stock.len(), 3);
        for pair in snapshot.low_stock.windows(2) {
            assert!(pair[0].shortage() >= pair[1].shortage());
        }
    }

    #[test]
    fn severity_boundary_at_half_min_is_low() {
        // shortage 5 with min 10: 5 is not > 5, so LOW
        let p = product("A1", "Anvil", "Hardware", dec!(1.00), 5, 10);
        assert_eq!(Severity::classify(&p), Severity::Low);
        // shortage 6 with min 10: CRITICAL
        let p = product("A1", "Anvil", "Hardware", dec!(1.00), 4, 10);
        assert_eq!(Severity::classify(&p), Severity::Critical);
        // zero stock wins regardless of min
        let p = product("A1", "Anvil", "Hardware", dec!(1.00), 0, 0);
        assert_eq!(Severity::classify(&p), Severity::OutOfStock);
    }

    #[test]
    fn catalog_csv_matches_rendered_rows() {
        let snapshot = ReportSnapshot::build(&sample());
        let csv = snapshot.catalog_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), snapshot.catalog.len() + 1);
        assert_eq!(
            lines[0],
            "SKU,Product Name,Category,Supplier,Unit Price,In Stock,Stock Value,Status"
        );
        for (line, product) in lines[1..].iter().zip(&snapshot.catalog) {
            assert!(line.starts_with(&format!("\"{}\"", product.sku)));
            assert!(line.contains(&format!("{:.2}", product.stock_value())));
        }
    }

    #[test]
    fn csv_doubles_embedded_quotes() {
        let p = product("A1", "3\" Nails", "Hardware", dec!(1.00), 5, 1);
        let snapshot = ReportSnapshot::build(&[p]);
        assert!(snapshot.catalog_csv().contains("\"3\"\" Nails\""));
    }

    #[test]
    fn low_stock_csv_has_shortage_column() {
        let snapshot = ReportSnapshot::build(&sample());
        let csv = snapshot.low_stock_csv();
        let first = csv.lines().nth(1).unwrap();
        // D4: qty 2, min 12, shortage 10
        assert!(first.contains("\"D4\""));
        assert!(first.contains(",2,12,10,"));
    }

    #[test]
    fn export_names_carry_the_date() {
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap();
        assert_eq!(catalog_export_name(now), "inventory-report-2026-08-27.csv");
        assert_eq!(low_stock_export_name(now), "low-stock-alert-2026-08-27.csv");
    }

    #[test]
    fn export_is_a_silent_noop_for_clients() {
        let snapshot = ReportSnapshot::build(&sample());
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        assert_eq!(
            export_catalog(&snapshot, Role::Client, dir.path(), now).unwrap(),
            ExportOutcome::SkippedForRole
        );
        assert_eq!(
            export_low_stock(&snapshot, Role::Client, dir.path(), now).unwrap(),
            ExportOutcome::SkippedForRole
        );
        assert!(!can_print(Role::Client));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn export_writes_for_admin() {
        let snapshot = ReportSnapshot::build(&sample());
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap();
        match export_catalog(&snapshot, Role::Admin, dir.path(), now).unwrap() {
            ExportOutcome::Written(path) => {
                assert!(path.ends_with("inventory-report-2026-08-27.csv"));
                let content = std::fs::read_to_string(path).unwrap();
                assert_eq!(content, snapshot.catalog_csv());
            }
            other => panic!("expected a written file, got {:?}", other),
        }
    }

    #[test]
    fn empty_low_stock_export_reports_nothing_to_export() {
        let snapshot =
            ReportSnapshot::build(&[product("B2", "Bolt", "Hardware", dec!(0.10), 100, 20)]);
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            export_low_stock(&snapshot, Role::Admin, dir.path(), Utc::now()).unwrap(),
            ExportOutcome::NothingToExport
        );
    }
}
