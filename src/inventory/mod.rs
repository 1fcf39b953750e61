//! Inventory page: cached product collection, compound filtering, typed table
//! rendering and the create/edit/delete/view flows.
//!
//! The page owns its snapshots (`products`, `categories`, `suppliers`) — there
//! is no shared mutable state between pages. Every mutating flow re-fetches the
//! affected collections instead of patching the cache, so the displayed state
//! always reflects the backend's authoritative view.

use rust_decimal::Decimal;
use tracing::info;
use validator::Validate;

use crate::client::ApiClient;
use crate::errors::{ClientError, Result};
use crate::models::{Action, NewProduct, Product, ProductUpdate, Role, StockMovement};
use crate::render::{Cell, DetailPanel, Message, Row, Table};

/// Compound product filter. Unset values pass everything through; set values
/// combine conjunctively.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring match against name or SKU.
    pub search: String,
    /// Exact category match.
    pub category: String,
    /// Exact supplier match.
    pub supplier: String,
    /// Keep only products at or below their minimum level.
    pub low_stock_only: bool,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if !self.search.is_empty() {
            let term = self.search.to_lowercase();
            let hit = product.product_name.to_lowercase().contains(&term)
                || product.sku.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if !self.category.is_empty() && product.category != self.category {
            return false;
        }
        if !self.supplier.is_empty() && product.supplier != self.supplier {
            return false;
        }
        if self.low_stock_only && !product.is_low() {
            return false;
        }
        true
    }

    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        products.iter().filter(|p| self.matches(p)).cloned().collect()
    }

    pub fn clear(&mut self) {
        *self = ProductFilter::default();
    }

    pub fn is_unset(&self) -> bool {
        *self == ProductFilter::default()
    }
}

/// Header summary cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InventorySummary {
    pub total_products: usize,
    pub low_stock: usize,
}

#[derive(Clone, Debug, PartialEq)]
enum FormMode {
    Create,
    Edit { product_id: i64 },
}

/// One form serves both create and edit. In edit mode the SKU and the initial
/// quantity are frozen: stock quantity is only ever mutated through a recorded
/// movement, never through a plain product update.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductForm {
    mode: FormMode,
    sku: String,
    pub product_name: String,
    pub description: String,
    pub category: String,
    pub supplier: String,
    pub unit_price: Decimal,
    quantity_in_stock: i64,
    pub min_stock_level: i64,
    pub unit_of_measure: String,
}

impl ProductForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            sku: String::new(),
            product_name: String::new(),
            description: String::new(),
            category: String::new(),
            supplier: String::new(),
            unit_price: Decimal::ZERO,
            quantity_in_stock: 0,
            min_stock_level: 0,
            unit_of_measure: String::new(),
        }
    }

    pub fn edit(product: &Product) -> Self {
        Self {
            mode: FormMode::Edit {
                product_id: product.product_id,
            },
            sku: product.sku.clone(),
            product_name: product.product_name.clone(),
            description: product.description.clone().unwrap_or_default(),
            category: product.category.clone(),
            supplier: product.supplier.clone(),
            unit_price: product.unit_price,
            quantity_in_stock: product.quantity_in_stock,
            min_stock_level: product.min_stock_level,
            unit_of_measure: product.unit_of_measure.clone(),
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn initial_quantity(&self) -> i64 {
        self.quantity_in_stock
    }

    /// SKU is immutable once a product exists.
    pub fn set_sku(&mut self, sku: impl Into<String>) -> Result<()> {
        if self.is_edit() {
            return Err(ClientError::validation("SKU cannot be changed on an existing product"));
        }
        self.sku = sku.into();
        Ok(())
    }

    /// Initial quantity is only settable when creating. Afterwards quantity
    /// changes go through the stock movement path.
    pub fn set_initial_quantity(&mut self, quantity: i64) -> Result<()> {
        if self.is_edit() {
            return Err(ClientError::validation(
                "Stock quantity can only be changed through a stock movement",
            ));
        }
        self.quantity_in_stock = quantity;
        Ok(())
    }

    fn description_or_none(&self) -> Option<String> {
        let trimmed = self.description.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    fn payload(&self) -> Result<FormPayload> {
        match self.mode {
            FormMode::Create => {
                let payload = NewProduct {
                    sku: self.sku.trim().to_uppercase(),
                    product_name: self.product_name.trim().to_string(),
                    description: self.description_or_none(),
                    category: self.category.trim().to_string(),
                    supplier: self.supplier.trim().to_string(),
                    unit_price: self.unit_price,
                    quantity_in_stock: self.quantity_in_stock,
                    min_stock_level: self.min_stock_level,
                    unit_of_measure: self.unit_of_measure.trim().to_string(),
                };
                payload
                    .validate()
                    .map_err(|e| ClientError::Validation(e.to_string()))?;
                Ok(FormPayload::Create(payload))
            }
            FormMode::Edit { product_id } => {
                let payload = ProductUpdate {
                    sku: self.sku.trim().to_uppercase(),
                    product_name: self.product_name.trim().to_string(),
                    description: self.description_or_none(),
                    category: self.category.trim().to_string(),
                    supplier: self.supplier.trim().to_string(),
                    unit_price: self.unit_price,
                    min_stock_level: self.min_stock_level,
                    unit_of_measure: self.unit_of_measure.trim().to_string(),
                };
                payload
                    .validate()
                    .map_err(|e| ClientError::Validation(e.to_string()))?;
                Ok(FormPayload::Update {
                    product_id,
                    update: payload,
                })
            }
        }
    }
}

enum FormPayload {
    Create(NewProduct),
    Update {
        product_id: i64,
        update: ProductUpdate,
    },
}

/// Read-only product detail: identity panel plus full movement history in the
/// order the API returned it (newest first, no client-side re-sort).
#[derive(Clone, Debug)]
pub struct ProductDetails {
    pub panel: DetailPanel,
    pub movements: Vec<StockMovement>,
}

impl ProductDetails {
    pub fn render(&self) -> String {
        let mut out = self.panel.render();
        out.push('\n');
        out.push_str("Stock Movement History\n");
        if self.movements.is_empty() {
            out.push_str("No stock movements recorded\n");
            return out;
        }
        for m in &self.movements {
            let when = m
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            out.push_str(&format!(
                "[{}] {}  qty {}  {} -> {}\n",
                when,
                m.movement_type.label(),
                m.quantity,
                m.previous_quantity,
                m.new_quantity
            ));
            if let Some(reference) = &m.reference_number {
                out.push_str(&format!("  Ref: {}\n", reference));
            }
            if let Some(notes) = &m.notes {
                out.push_str(&format!("  Notes: {}\n", notes));
            }
        }
        out
    }
}

/// The inventory page controller. `products` is the single source of truth
/// after each successful load; filtering always reads this snapshot and never
/// re-fetches.
pub struct InventoryPage {
    role: Role,
    products: Vec<Product>,
    categories: Vec<String>,
    suppliers: Vec<String>,
    pub filter: ProductFilter,
    submitting: bool,
}

impl InventoryPage {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            products: Vec::new(),
            categories: Vec::new(),
            suppliers: Vec::new(),
            filter: ProductFilter::default(),
            submitting: false,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn suppliers(&self) -> &[String] {
        &self.suppliers
    }

    /// Loads the three collections the page is built from.
    pub async fn load(&mut self, client: &ApiClient) -> Result<()> {
        self.products = client.list_products().await?;
        self.categories = client.list_categories().await?;
        self.suppliers = client.list_suppliers().await?;
        info!(
            products = self.products.len(),
            categories = self.categories.len(),
            suppliers = self.suppliers.len(),
            "inventory loaded"
        );
        Ok(())
    }

    /// The filtered view of the cached snapshot.
    pub fn visible_products(&self) -> Vec<Product> {
        self.filter.apply(&self.products)
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    pub fn summary(&self) -> InventorySummary {
        InventorySummary {
            total_products: self.products.len(),
            low_stock: self.products.iter().filter(|p| p.is_low()).count(),
        }
    }

    /// Renders the product table for the current filter. Non-admin roles only
    /// get the View affordance.
    pub fn product_table(&self) -> Table {
        Self::table_for(&self.visible_products(), self.role)
    }

    /// Pure rendering of a product list; zero products yields the no-data row.
    pub fn table_for(products: &[Product], role: Role) -> Table {
        let mut table = Table::new(
            "Products",
            vec![
                "SKU", "Name", "Category", "Supplier", "Unit Price", "In Stock", "Min Level",
                "Status", "Actions",
            ],
        )
        .with_empty_message("No products found.");

        for product in products {
            let actions = if role.allows(Action::ManageProducts) {
                vec!["View", "Stock", "Edit", "Delete"]
            } else {
                vec!["View"]
            };
            table.rows.push(Row::new(vec![
                Cell::Text(product.sku.clone()),
                Cell::Text(product.product_name.clone()),
                Cell::Text(product.category.clone()),
                Cell::Text(product.supplier.clone()),
                Cell::Money(product.unit_price),
                Cell::Quantity(product.quantity_in_stock, product.unit_of_measure.clone()),
                Cell::Count(product.min_stock_level),
                Cell::Badge(product.stock_status().label()),
                Cell::Actions(actions),
            ]));
        }
        table
    }

    pub fn begin_create(&self) -> Result<ProductForm> {
        if !self.role.allows(Action::ManageProducts) {
            return Err(ClientError::forbidden("Only admins can add products"));
        }
        Ok(ProductForm::create())
    }

    /// Fetches the product fresh and opens the form in edit mode.
    pub async fn begin_edit(&self, client: &ApiClient, product_id: i64) -> Result<ProductForm> {
        if !self.role.allows(Action::ManageProducts) {
            return Err(ClientError::forbidden("Only admins can edit products"));
        }
        let product = client.get_product(product_id).await?;
        Ok(ProductForm::edit(&product))
    }

    /// Submits the form. While the request is in flight the page refuses a
    /// second submission; the guard is cleared on every outcome. Success
    /// reloads products, categories and suppliers so newly introduced
    /// category/supplier values appear in the filters.
    pub async fn submit_form(&mut self, client: &ApiClient, form: &ProductForm) -> Result<Message> {
        if !self.role.allows(Action::ManageProducts) {
            return Err(ClientError::forbidden("Only admins can modify products"));
        }
        if self.submitting {
            return Err(ClientError::validation("A submission is already in progress"));
        }
        self.submitting = true;
        let result = self.submit_inner(client, form).await;
        self.submitting = false;
        result
    }

    async fn submit_inner(&mut self, client: &ApiClient, form: &ProductForm) -> Result<Message> {
        let message = match form.payload()? {
            FormPayload::Create(payload) => {
                let created = client.create_product(&payload).await?;
                info!(product_id = created.product_id, sku = %created.sku, "product created");
                Message::success("Product created successfully!")
            }
            FormPayload::Update { product_id, update } => {
                client.update_product(product_id, &update).await?;
                info!(product_id, "product updated");
                Message::success("Product updated successfully!")
            }
        };
        self.load(client).await?;
        Ok(message)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Deletes after an explicit confirmation. An unconfirmed call is a no-op
    /// and issues no request.
    pub async fn delete_product(
        &mut self,
        client: &ApiClient,
        product_id: i64,
        confirmed: bool,
    ) -> Result<Message> {
        if !self.role.allows(Action::ManageProducts) {
            return Err(ClientError::forbidden("Only admins can delete products"));
        }
        if !confirmed {
            return Ok(Message::info("Deletion cancelled."));
        }
        client.delete_product(product_id).await?;
        info!(product_id, "product deleted");
        self.products = client.list_products().await?;
        Ok(Message::success("Product deleted successfully!"))
    }

    /// Fetches the product and its movement history and renders the read-only
    /// detail panel.
    pub async fn view_product(&self, client: &ApiClient, product_id: i64) -> Result<ProductDetails> {
        let product = client.get_product(product_id).await?;
        let movements = client.list_movements(product_id).await?;

        let created = product
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let panel = DetailPanel::new(format!("Product {}", product.sku))
            .field("SKU:", product.sku.clone())
            .field("Product Name:", product.product_name.clone())
            .field(
                "Description:",
                product.description.clone().unwrap_or_else(|| "N/A".into()),
            )
            .field("Category:", product.category.clone())
            .field("Supplier:", product.supplier.clone())
            .field("Unit Price:", format!("${:.2}", product.unit_price))
            .field(
                "Current Stock:",
                format!("{} {}", product.quantity_in_stock, product.unit_of_measure),
            )
            .field("Min Stock Level:", product.min_stock_level.to_string())
            .field("Status:", product.stock_status().label())
            .field("Created:", created);

        Ok(ProductDetails { panel, movements })
    }
}
