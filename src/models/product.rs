use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A product as returned by the API. The client holds a transient copy per page
/// load and never persists it locally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i64,
    pub sku: String,
    pub product_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub supplier: String,
    pub unit_price: Decimal,
    pub quantity_in_stock: i64,
    pub min_stock_level: i64,
    pub unit_of_measure: String,
    /// Server-computed flag. Kept on the wire for compatibility, but every view
    /// derives status locally through `stock_status()` so the inventory page and
    /// reports can never disagree.
    #[serde(default)]
    pub is_low_stock: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Authoritative three-way stock classification, computed from
    /// `quantity_in_stock` and `min_stock_level`. Exhaustive and mutually
    /// exclusive: zero is always `OutOfStock` regardless of the threshold.
    pub fn stock_status(&self) -> StockStatus {
        if self.quantity_in_stock == 0 {
            StockStatus::OutOfStock
        } else if self.quantity_in_stock <= self.min_stock_level {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// At or below the configured minimum, including zero.
    pub fn is_low(&self) -> bool {
        self.quantity_in_stock <= self.min_stock_level
    }

    /// Units needed to get back to the minimum level. Never negative.
    pub fn shortage(&self) -> i64 {
        (self.min_stock_level - self.quantity_in_stock).max(0)
    }

    /// `unit_price * quantity_in_stock`.
    pub fn stock_value(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity_in_stock)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::InStock => "In Stock",
        }
    }
}

/// Payload for `POST /products`. Initial stock is only settable here; later
/// quantity changes must go through a recorded movement.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku: String,
    #[validate(length(min = 1, message = "Product name is required"))]
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "Supplier is required"))]
    pub supplier: String,
    pub unit_price: Decimal,
    #[validate(range(min = 0, message = "Initial stock must be non-negative"))]
    pub quantity_in_stock: i64,
    #[validate(range(min = 0, message = "Minimum stock level must be non-negative"))]
    pub min_stock_level: i64,
    #[validate(length(min = 1, message = "Unit of measure is required"))]
    pub unit_of_measure: String,
}

/// Payload for `PUT /products/:id`. Structurally has no quantity field: stock
/// is only ever mutated through the movement endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku: String,
    #[validate(length(min = 1, message = "Product name is required"))]
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "Supplier is required"))]
    pub supplier: String,
    pub unit_price: Decimal,
    #[validate(range(min = 0, message = "Minimum stock level must be non-negative"))]
    pub min_stock_level: i64,
    #[validate(length(min = 1, message = "Unit of measure is required"))]
    pub unit_of_measure: String,
}
