//! # fdc-etl - FoodData Central extract/transform
//!
//! Pulls paginated search results from the USDA FoodData Central API and
//! flattens them into two related tables: foods, and the nutrients of each
//! food linked back by `fdcId`.
//!
//! ## Stages
//!
//! - **client**: page count and page fetch against the search endpoint
//! - **extractor**: walk the configured page window, then flatten the pages
//! - **transform**: project raw objects onto fixed columns and link nutrients
//! - **pipeline**: run the stages in order and hand the tables to a loader
//!
//! ## Quick Start
//!
//! ```rust
//! use fdc_etl::Transformer;
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let foods = vec![json!({
//!     "fdcId": 10,
//!     "description": "Apple",
//!     "foodNutrients": [{"nutrientId": 1003, "value": 0.3}]
//! })];
//!
//! let (foods, nutrients) = Transformer::default().transform(foods)?;
//!
//! assert_eq!(foods.shape(), (1, 7));
//! assert_eq!(nutrients.rows()[0].fdc_id, json!(10));
//! # Ok(())
//! # }
//! ```

use anyhow::Result;

pub mod client;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod transform;
pub mod types;

// Re-export commonly used types for convenience
pub use client::{ApiClient, FoodSource};
pub use error::EtlError;
pub use extractor::{flatten_pages, Extractor};
pub use pipeline::{Loader, NoopLoader, Pipeline, Summary, Tables};
pub use transform::{project_food, project_nutrient, Transformer};
pub use types::{EtlConfig, FoodRecord, NutrientRecord, PageRange, Row, Table, FDC_SEARCH_URL, PAGE_SIZE};

/// Main entry point: run the whole pipeline against the live API
pub fn run(config: EtlConfig) -> Result<Summary> {
    Pipeline::from_config(config).run()
}
