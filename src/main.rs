use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::warn;

use stocklens::client::ApiClient;
use stocklens::config;
use stocklens::inventory::{InventoryPage, ProductFilter};
use stocklens::models::{MovementType, Role, StockUpdate};
use stocklens::profile::ProfilePage;
use stocklens::reports::{self, ExportOutcome, ReportSnapshot};
use stocklens::stock;

#[derive(Parser)]
#[command(name = "stocklens", version, about = "Inventory dashboard client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Product list, filtering and CRUD flows
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
    /// Aggregated statistics, catalog and low-stock tables, CSV export
    Reports {
        #[command(subcommand)]
        action: ReportsAction,
    },
    /// Record a stock movement for a product
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Identity panel and password change
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum InventoryAction {
    /// List products, optionally filtered
    List(FilterArgs),
    /// Show a product with its full movement history
    View { product_id: i64 },
    /// Create a product (admin only)
    Create(ProductArgs),
    /// Edit a product; quantity is not editable here (admin only)
    Edit {
        product_id: i64,
        #[command(flatten)]
        fields: EditArgs,
    },
    /// Delete a product after confirmation (admin only)
    Delete {
        product_id: i64,
        /// Confirm the deletion; without this flag nothing happens
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Substring match on name or SKU, case-insensitive
    #[arg(long, default_value = "")]
    search: String,
    /// Exact category match
    #[arg(long, default_value = "")]
    category: String,
    /// Exact supplier match
    #[arg(long, default_value = "")]
    supplier: String,
    /// Only products at or below their minimum level
    #[arg(long)]
    low_stock: bool,
}

#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    sku: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: String,
    #[arg(long)]
    supplier: String,
    #[arg(long)]
    price: Decimal,
    #[arg(long, default_value_t = 0)]
    quantity: i64,
    #[arg(long, default_value_t = 0)]
    min_level: i64,
    #[arg(long)]
    unit: String,
}

#[derive(Args)]
struct EditArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    supplier: Option<String>,
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long)]
    min_level: Option<i64>,
    #[arg(long)]
    unit: Option<String>,
}

#[derive(Subcommand)]
enum ReportsAction {
    /// Render the summary cards, catalog and low-stock tables
    Show,
    /// Export the full catalog as CSV (admin only)
    Export,
    /// Export the low-stock subset as CSV (admin only)
    ExportLowStock,
}

#[derive(Subcommand)]
enum StockAction {
    /// Record a movement with optional reference and notes (admin only)
    Record {
        product_id: i64,
        /// stock-in or stock-out
        #[arg(long = "type")]
        movement_type: String,
        #[arg(long)]
        quantity: i64,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Quick update with a +N/-N token, as on the reports page (admin only)
    Quick { product_id: i64, token: String },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the identity panel
    Show,
    /// Change the account password
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let client = ApiClient::new(&cfg).context("failed to build API client")?;
    let user = client
        .current_user()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("failed to resolve the signed-in user")?;
    let role = user.role;

    let outcome = match cli.command {
        Command::Inventory { action } => run_inventory(&client, role, action).await,
        Command::Reports { action } => run_reports(&client, role, &cfg.export_dir, action).await,
        Command::Stock { action } => run_stock(&client, role, action).await,
        Command::Profile { action } => run_profile(&client, user, action).await,
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(err) => {
            // Error region of the page: the backend's message, verbatim
            eprintln!("{}", err.user_message());
            std::process::exit(1);
        }
    }
}

async fn run_inventory(
    client: &ApiClient,
    role: Role,
    action: InventoryAction,
) -> stocklens::Result<()> {
    let mut page = InventoryPage::new(role);
    match action {
        InventoryAction::List(filter) => {
            page.load(client).await?;
            page.filter = ProductFilter {
                search: filter.search,
                category: filter.category,
                supplier: filter.supplier,
                low_stock_only: filter.low_stock,
            };
            let summary = page.summary();
            println!(
                "Total products: {}   Low stock: {}\n",
                summary.total_products, summary.low_stock
            );
            println!("{}", page.product_table().render());
        }
        InventoryAction::View { product_id } => {
            let details = page.view_product(client, product_id).await?;
            println!("{}", details.render());
        }
        InventoryAction::Create(args) => {
            let mut form = page.begin_create()?;
            form.set_sku(args.sku)?;
            form.set_initial_quantity(args.quantity)?;
            form.product_name = args.name;
            form.description = args.description.unwrap_or_default();
            form.category = args.category;
            form.supplier = args.supplier;
            form.unit_price = args.price;
            form.min_stock_level = args.min_level;
            form.unit_of_measure = args.unit;
            let message = page.submit_form(client, &form).await?;
            println!("{}", message.text);
        }
        InventoryAction::Edit { product_id, fields } => {
            let mut form = page.begin_edit(client, product_id).await?;
            if let Some(name) = fields.name {
                form.product_name = name;
            }
            if let Some(description) = fields.description {
                form.description = description;
            }
            if let Some(category) = fields.category {
                form.category = category;
            }
            if let Some(supplier) = fields.supplier {
                form.supplier = supplier;
            }
            if let Some(price) = fields.price {
                form.unit_price = price;
            }
            if let Some(min_level) = fields.min_level {
                form.min_stock_level = min_level;
            }
            if let Some(unit) = fields.unit {
                form.unit_of_measure = unit;
            }
            let message = page.submit_form(client, &form).await?;
            println!("{}", message.text);
        }
        InventoryAction::Delete { product_id, yes } => {
            if !yes {
                warn!("deletion not confirmed; pass --yes to proceed");
            }
            let message = page.delete_product(client, product_id, yes).await?;
            println!("{}", message.text);
        }
    }
    Ok(())
}

async fn run_reports(
    client: &ApiClient,
    role: Role,
    export_dir: &str,
    action: ReportsAction,
) -> stocklens::Result<()> {
    let products = client.list_products().await?;
    let snapshot = ReportSnapshot::build(&products);
    match action {
        ReportsAction::Show => {
            println!(
                "Total products: {}   Total value: ${:.2}   Low stock: {}   Out of stock: {}\n",
                snapshot.total_products,
                snapshot.total_value,
                snapshot.low_stock_count,
                snapshot.out_of_stock_count
            );
            println!("{}", snapshot.catalog_table(role).render());
            println!("{}", snapshot.low_stock_table().render());
        }
        ReportsAction::Export => {
            report_outcome(reports::export_catalog(
                &snapshot,
                role,
                Path::new(export_dir),
                Utc::now(),
            )?);
        }
        ReportsAction::ExportLowStock => {
            report_outcome(reports::export_low_stock(
                &snapshot,
                role,
                Path::new(export_dir),
                Utc::now(),
            )?);
        }
    }
    Ok(())
}

fn report_outcome(outcome: ExportOutcome) {
    match outcome {
        ExportOutcome::Written(path) => println!("Exported {}", path.display()),
        ExportOutcome::SkippedForRole => {}
        ExportOutcome::NothingToExport => println!("No low stock items to export!"),
    }
}

async fn run_stock(client: &ApiClient, role: Role, action: StockAction) -> stocklens::Result<()> {
    use stocklens::models::Action;
    if !role.allows(Action::RecordStock) {
        return Err(stocklens::ClientError::forbidden(
            "Only admins can record stock movements",
        ));
    }
    let ack = match action {
        StockAction::Record {
            product_id,
            movement_type,
            quantity,
            reference,
            notes,
        } => {
            let movement_type = match movement_type.as_str() {
                "stock-in" => MovementType::StockIn,
                "stock-out" => MovementType::StockOut,
                other => {
                    return Err(stocklens::ClientError::validation(format!(
                        "movement type must be stock-in or stock-out, got '{}'",
                        other
                    )))
                }
            };
            let mut update = StockUpdate::new(movement_type, quantity);
            if let Some(reference) = reference {
                update = update.with_reference(reference);
            }
            if let Some(notes) = notes {
                update = update.with_notes(notes);
            }
            stock::record_movement(client, product_id, &update).await?
        }
        StockAction::Quick { product_id, token } => {
            stock::quick_update(client, product_id, &token).await?
        }
    };
    println!("{}", ack.message);
    if let Some(movement) = ack.movement {
        println!(
            "{}: {} ({} -> {})",
            movement.movement_type.label(),
            movement.quantity,
            movement.previous_quantity,
            movement.new_quantity
        );
    }
    Ok(())
}

async fn run_profile(
    client: &ApiClient,
    user: stocklens::models::User,
    action: ProfileAction,
) -> stocklens::Result<()> {
    let mut page = ProfilePage::new(user);
    match action {
        ProfileAction::Show => {
            println!("{}", page.identity_panel().render());
        }
        ProfileAction::ChangePassword {
            current,
            new,
            confirm,
        } => {
            let message = page
                .change_password(client, &current, &new, &confirm)
                .await?;
            println!("{}", message.text);
        }
    }
    Ok(())
}
