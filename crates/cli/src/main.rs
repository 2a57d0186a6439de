//! Food Market CLI - status map, catalog, cart and checkout tools.
//!
//! # Usage
//!
//! ```bash
//! # Inspect or edit the shared status file
//! fm-cli status show
//! fm-cli status set 3 archived
//!
//! # Manage the admin catalog (changes are pushed to the bridge)
//! fm-cli catalog list --brands
//! fm-cli catalog toggle-brand 4
//!
//! # Shop
//! fm-cli cart add 1 --qty 2
//! fm-cli cart coupon NEWYEAR2025
//! fm-cli checkout --first-name Mei --last-name Lin ...
//! ```
//!
//! # Environment Variables
//!
//! - `FM_DATA_DIR` - State directory (default: .food-market)
//! - `FM_BRIDGE_URL` - Bridge base URL (default: http://127.0.0.1:3100)
//! - `BRIDGE_STATUS_FILE` - Status file (default: shared/product-status.json)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use food_market_bridge::client::DEFAULT_BASE_URL;
use food_market_core::checkout::{PickupPoint, ShippingInfoPatch};
use food_market_core::{
    BrandId, DeliveryMethod, PaymentMethod, PickupPointId, ProductId, ProductStatus,
};

mod commands;
mod store;

use commands::Context;
use commands::checkout::CheckoutInput;
use store::JsonDirStore;

#[derive(Parser)]
#[command(name = "fm-cli")]
#[command(author, version, about = "Food Market CLI tools")]
struct Cli {
    /// Directory holding cart, wishlist and catalog state
    #[arg(long, global = true, env = "FM_DATA_DIR", default_value = ".food-market")]
    data_dir: PathBuf,

    /// Base URL of the status bridge
    #[arg(long, global = true, env = "FM_BRIDGE_URL", default_value = DEFAULT_BASE_URL)]
    bridge_url: String,

    /// Status map file for `status` commands
    #[arg(
        long,
        global = true,
        env = "BRIDGE_STATUS_FILE",
        default_value = "shared/product-status.json"
    )]
    status_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read or write the shared status file directly
    Status {
        #[command(subcommand)]
        action: StatusAction,
    },
    /// Manage admin products and brands
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout(CheckoutArgs),
}

#[derive(Subcommand)]
enum StatusAction {
    /// Print the status map
    Show,
    /// Set one product's status
    Set {
        /// Product id
        id: String,
        /// `active`, `archived` or `draft`
        status: ProductStatus,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products (or brands)
    List {
        #[arg(long)]
        brands: bool,
    },
    /// Flip a product between active and archived
    ToggleProduct { id: ProductId },
    /// Enable or disable a brand and its products
    ToggleBrand { id: BrandId },
    /// Archive products of disabled brands
    Sync,
    /// Push every product status to the bridge
    Push,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show lines and totals
    Show,
    /// Add a product
    Add {
        product_id: ProductId,
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Set a line's quantity (0 removes it)
    Update {
        product_id: ProductId,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Remove a line
    Remove { product_id: ProductId },
    /// Apply a coupon code
    Coupon { code: String },
    /// Remove the applied coupon
    Uncoupon,
    /// Empty the cart
    Clear,
}

#[derive(Args)]
struct CheckoutArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    district: Option<String>,
    #[arg(long)]
    postal_code: Option<String>,
    #[arg(long)]
    notes: Option<String>,

    /// `home` or `convenience`
    #[arg(long, default_value = "home")]
    delivery: DeliveryMethod,
    /// Pickup store id (convenience delivery)
    #[arg(long, requires = "store_name")]
    store_id: Option<PickupPointId>,
    /// Pickup store name (convenience delivery)
    #[arg(long, requires = "store_id")]
    store_name: Option<String>,

    /// `credit_card`, `line_pay` or `cod`
    #[arg(long, default_value = "credit_card")]
    payment: PaymentMethod,
}

impl From<CheckoutArgs> for CheckoutInput {
    fn from(args: CheckoutArgs) -> Self {
        let pickup_point = args
            .store_id
            .zip(args.store_name)
            .map(|(id, name)| PickupPoint { id, name });
        Self {
            shipping: ShippingInfoPatch {
                first_name: args.first_name,
                last_name: args.last_name,
                email: args.email,
                phone: args.phone,
                address: args.address,
                city: args.city,
                district: args.district,
                postal_code: args.postal_code,
                notes: args.notes,
            },
            delivery: args.delivery,
            pickup_point,
            payment: args.payment,
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fm_cli=info,food_market_core=info,food_market_bridge=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context {
        store: JsonDirStore::shared(cli.data_dir),
        bridge_url: cli.bridge_url,
        status_file: cli.status_file,
    };
    let mut stdout = std::io::stdout().lock();
    let out = &mut stdout;

    match cli.command {
        Commands::Status { action } => match action {
            StatusAction::Show => commands::status::show(&ctx, out).await?,
            StatusAction::Set { id, status } => {
                commands::status::set(&ctx, &id, status, out).await?;
            }
        },
        Commands::Catalog { action } => match action {
            CatalogAction::List { brands } => commands::catalog::list(&ctx, brands, out).await?,
            CatalogAction::ToggleProduct { id } => {
                commands::catalog::toggle_product(&ctx, id, out).await?;
            }
            CatalogAction::ToggleBrand { id } => {
                commands::catalog::toggle_brand(&ctx, id, out).await?;
            }
            CatalogAction::Sync => commands::catalog::sync(&ctx, out).await?,
            CatalogAction::Push => commands::catalog::push(&ctx, out).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx, out)?,
            CartAction::Add { product_id, qty } => {
                commands::cart::add(&ctx, product_id, qty, out)?;
            }
            CartAction::Update { product_id, qty } => {
                commands::cart::update(&ctx, product_id, qty, out)?;
            }
            CartAction::Remove { product_id } => commands::cart::remove(&ctx, product_id, out)?,
            CartAction::Coupon { code } => commands::cart::coupon(&ctx, &code, out)?,
            CartAction::Uncoupon => commands::cart::uncoupon(&ctx, out)?,
            CartAction::Clear => commands::cart::clear(&ctx, out)?,
        },
        Commands::Checkout(args) => commands::checkout::run(&ctx, args.into(), out)?,
    }

    out.flush()?;
    Ok(())
}
