//! Checkout Example
//!
//! This example fills a cart from a catalog search, prints the priced receipt and places
//! the order through the simulated gateway.
//!
//! Use `-c` to load a catalog file instead of the built-in catalog
//! Use `-C` to load a store configuration file
//! Use `-d` to persist the cart and wishlist into a directory between runs
//! Use `-t` to pick the delivery tier and `-q` to change the search query

use std::{io, time::Instant};

use anyhow::Result;

use clap::Parser;
use luma::{
    catalog::Catalog,
    checkout::{Checkout, SimulatedGateway},
    config::StoreConfig,
    persistence::{FileStore, MemoryStore, SnapshotStore},
    products::ProductFlag,
    receipt::Receipt,
    session::ShoppingSession,
    utils::{DemoArgs, init_tracing},
};

/// Checkout Example
#[tokio::main]
pub async fn main() -> Result<()> {
    let args = DemoArgs::parse();

    init_tracing(&args.log_level);

    let catalog = match args.catalog.as_deref() {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin()?,
    };

    let mut config = match args.config.as_deref() {
        Some(path) => StoreConfig::from_path(path)?,
        None => StoreConfig::default(),
    };

    if let Some(dir) = &args.data_dir {
        config.persistence.data_dir = Some(dir.clone());
    }

    match config.persistence.data_dir.clone() {
        Some(dir) => {
            let session = ShoppingSession::restore(&catalog, FileStore::new(dir), &config.persistence);
            run(&args, &config, session).await
        }
        None => {
            let session = ShoppingSession::new(&catalog, MemoryStore::new(), &config.persistence);
            run(&args, &config, session).await
        }
    }
}

#[expect(clippy::print_stdout, reason = "Example code")]
async fn run<S: SnapshotStore>(
    args: &DemoArgs,
    config: &StoreConfig,
    mut session: ShoppingSession<'_, '_, S>,
) -> Result<()> {
    println!(
        "Restored {} item(s) in cart, {} in wishlist",
        session.cart_items_count(),
        session.wishlist().len()
    );

    for product in session.catalog().search(&args.query) {
        let shade = product.default_variant().map(|variant| variant.name.as_str());

        session.add_to_cart(product.id.as_str(), 1, shade)?;
    }

    for product in session.catalog().filter_by_flag(ProductFlag::Featured) {
        session.toggle_wishlist(product.id.as_str());
    }

    if let Some(failure) = session.last_persistence_error() {
        println!("Warning: {failure}");
    }

    let mut checkout = Checkout::new(config)?;
    checkout.select_delivery_tier(&args.delivery)?;

    println!("Checking out with {}", checkout.delivery_tier().name);

    let gateway = SimulatedGateway::from_config(config);
    let start = Instant::now();

    let placed = checkout.place_order(&mut session, &gateway).await?;

    let elapsed = start.elapsed().as_secs_f32();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::for_placed(&placed).write_to(&mut handle)?;

    println!(
        "Order placed in {elapsed:.2}s; cart now holds {} item(s)",
        session.cart_items_count()
    );

    Ok(())
}
