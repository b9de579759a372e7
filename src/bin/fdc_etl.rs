//! fdc-etl: Pull FoodData Central search results into food and nutrient tables
//!
//! Usage:
//!   # Every page, key from the environment (or a .env file)
//!   USDA_API_KEY=... fdc-etl
//!
//!   # Only the first two pages
//!   fdc-etl --api-key ... --first-page 1 --last-page 2
//!
//!   # Progress logging
//!   RUST_LOG=info fdc-etl
//!
//! Prints the shape of the food table, `(rows, columns)`, on success.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use clap::Parser;
use fdc_etl::{EtlConfig, PageRange, FDC_SEARCH_URL};

#[derive(Parser, Debug)]
#[command(name = "fdc-etl")]
#[command(about = "Flatten FoodData Central search results into food and nutrient tables", long_about = None)]
struct Args {
    /// FoodData Central API key
    #[arg(long, env = "USDA_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Search endpoint
    #[arg(long, env = "FDC_BASE_URL", default_value = FDC_SEARCH_URL)]
    base_url: String,

    /// First page to fetch (1-based)
    #[arg(long, default_value_t = 1)]
    first_page: u32,

    /// Last page to fetch, inclusive (default: the last page the API reports)
    #[arg(long)]
    last_page: Option<u32>,

    /// Accept foods that share an fdcId instead of failing
    #[arg(long)]
    allow_duplicate_ids: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let config = EtlConfig {
        base_url: args.base_url,
        api_key: args.api_key,
        pages: PageRange {
            first: args.first_page,
            last: args.last_page,
        },
        validate_unique_ids: !args.allow_duplicate_ids,
        ..EtlConfig::default()
    };

    let summary = fdc_etl::run(config)?;
    println!("{}", summary);

    Ok(())
}
