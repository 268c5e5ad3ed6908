//! Utils

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Catalog YAML file; the built-in catalog is used when omitted
    #[clap(short, long, env = "LUMA_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Store configuration YAML file
    #[clap(short = 'C', long, env = "LUMA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for cart and wishlist snapshots, overriding the configuration
    #[clap(short, long, env = "LUMA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Delivery tier to check out with
    #[clap(short = 't', long, default_value = "standard")]
    pub delivery: String,

    /// Search query used to pick products for the cart
    #[clap(short, long, default_value = "lip")]
    pub query: String,

    /// Default log filter when `RUST_LOG` is unset
    #[clap(long, default_value = "info")]
    pub log_level: String,
}

/// Install a compact `tracing` subscriber filtered by `RUST_LOG`, or `default_level` when unset.
///
/// Installing a second subscriber is a no-op.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new(default_level));

    _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true),
        )
        .try_init();
}
