use crate::client::{ApiClient, FoodSource};
use crate::extractor::{flatten_pages, Extractor};
use crate::transform::Transformer;
use crate::types::{EtlConfig, FoodRecord, NutrientRecord, Table};
use anyhow::{Context, Result};
use log::info;
use std::fmt;

/// Receives the finished tables at the end of a run
pub trait Loader {
    fn load(&mut self, foods: &Table<FoodRecord>, nutrients: &Table<NutrientRecord>) -> Result<()>;
}

/// Loader that keeps nothing
#[derive(Debug, Default)]
pub struct NoopLoader;

impl Loader for NoopLoader {
    fn load(&mut self, _foods: &Table<FoodRecord>, _nutrients: &Table<NutrientRecord>) -> Result<()> {
        Ok(())
    }
}

/// The two related tables produced by one run
#[derive(Debug, Clone)]
pub struct Tables {
    pub pages_fetched: usize,
    pub foods: Table<FoodRecord>,
    pub nutrients: Table<NutrientRecord>,
}

/// What a finished run produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub pages_fetched: usize,
    pub foods: (usize, usize),
    pub nutrients: (usize, usize),
}

impl Summary {
    pub fn of(tables: &Tables) -> Self {
        Summary {
            pages_fetched: tables.pages_fetched,
            foods: tables.foods.shape(),
            nutrients: tables.nutrients.shape(),
        }
    }
}

/// Prints the food table shape, `(rows, columns)`
impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.foods.0, self.foods.1)
    }
}

/// Extract, transform, load. Strictly sequential; any failure ends the run
/// without handing tables to the loader.
pub struct Pipeline<S: FoodSource, L: Loader> {
    source: S,
    loader: L,
    config: EtlConfig,
}

impl Pipeline<ApiClient, NoopLoader> {
    /// Pipeline against the live API, dropping the result tables
    pub fn from_config(config: EtlConfig) -> Self {
        let source = ApiClient::new(&config);
        Pipeline::new(source, NoopLoader, config)
    }
}

impl<S: FoodSource, L: Loader> Pipeline<S, L> {
    pub fn new(source: S, loader: L, config: EtlConfig) -> Self {
        Pipeline {
            source,
            loader,
            config,
        }
    }

    /// Fetch the configured pages and build both tables
    pub fn extract_and_transform(&self) -> Result<Tables> {
        let pages = Extractor::new(&self.source, self.config.pages)
            .extract()
            .context("Failed to extract foods")?;
        let pages_fetched = pages.len();

        let (foods, nutrients) = Transformer::new(self.config.validate_unique_ids)
            .transform(flatten_pages(pages))
            .context("Failed to transform foods")?;

        info!(
            "Built {} food rows and {} nutrient rows from {} pages",
            foods.len(),
            nutrients.len(),
            pages_fetched
        );

        Ok(Tables {
            pages_fetched,
            foods,
            nutrients,
        })
    }

    pub fn run(&mut self) -> Result<Summary> {
        let tables = self.extract_and_transform()?;
        self.loader
            .load(&tables.foods, &tables.nutrients)
            .context("Failed to load tables")?;
        Ok(Summary::of(&tables))
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use crate::extractor::tests::FakeSource;
    use crate::types::PageRange;
    use serde_json::json;

    /// Keeps the shapes it was handed
    #[derive(Default)]
    struct RecordingLoader {
        loads: Vec<((usize, usize), (usize, usize))>,
    }

    impl Loader for RecordingLoader {
        fn load(&mut self, foods: &Table<FoodRecord>, nutrients: &Table<NutrientRecord>) -> Result<()> {
            self.loads.push((foods.shape(), nutrients.shape()));
            Ok(())
        }
    }

    fn food(id: u64, nutrient_count: usize) -> serde_json::Value {
        let nutrients: Vec<_> = (0..nutrient_count)
            .map(|i| json!({"nutrientId": i, "value": 1.5}))
            .collect();
        json!({"fdcId": id, "description": format!("food {}", id), "foodNutrients": nutrients})
    }

    fn source() -> FakeSource {
        FakeSource::new(vec![
            vec![food(1, 2), food(2, 3)],
            vec![food(3, 0)],
            vec![food(4, 1)],
        ])
    }

    #[test]
    fn test_run_all_pages() {
        let mut pipeline = Pipeline::new(source(), RecordingLoader::default(), EtlConfig::default());
        let summary = pipeline.run().unwrap();

        assert_eq!(summary.pages_fetched, 3);
        assert_eq!(summary.foods, (4, 7));
        assert_eq!(summary.nutrients, (6, 9));
        assert_eq!(summary.to_string(), "(4, 7)");
        assert_eq!(pipeline.loader().loads, vec![((4, 7), (6, 9))]);
    }

    #[test]
    fn test_run_bounded_pages() {
        let config = EtlConfig {
            pages: PageRange::bounded(1, 2),
            ..EtlConfig::default()
        };
        let pipeline = Pipeline::new(source(), NoopLoader, config);
        let tables = pipeline.extract_and_transform().unwrap();

        assert_eq!(tables.pages_fetched, 2);
        assert_eq!(tables.foods.len(), 3);
        assert_eq!(tables.nutrients.len(), 5);
    }

    #[test]
    fn test_run_zero_pages() {
        let mut pipeline = Pipeline::new(
            FakeSource::new(vec![]),
            RecordingLoader::default(),
            EtlConfig::default(),
        );
        let summary = pipeline.run().unwrap();

        assert_eq!(summary.foods, (0, 7));
        assert_eq!(summary.nutrients, (0, 9));
        assert_eq!(summary.to_string(), "(0, 7)");
    }

    #[test]
    fn test_request_failure_loads_nothing() {
        let mut failing = source();
        failing.failing_page = Some(3);
        let mut pipeline = Pipeline::new(failing, RecordingLoader::default(), EtlConfig::default());

        let err = pipeline.run().unwrap_err();

        assert!(matches!(err.downcast_ref::<EtlError>(), Some(EtlError::Request(_))));
        assert!(pipeline.loader().loads.is_empty());
    }

    #[test]
    fn test_count_failure_is_request_error() {
        let mut failing = source();
        failing.fail_count = true;
        let mut pipeline = Pipeline::new(failing, NoopLoader, EtlConfig::default());

        let err = pipeline.run().unwrap_err();
        assert!(matches!(err.downcast_ref::<EtlError>(), Some(EtlError::Request(_))));
    }

    #[test]
    fn test_duplicate_ids_across_pages() {
        let pages = FakeSource::new(vec![vec![food(1, 1)], vec![food(1, 1)]]);
        let mut pipeline = Pipeline::new(pages, RecordingLoader::default(), EtlConfig::default());

        let err = pipeline.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::DuplicateFdcId(_))
        ));
        assert!(pipeline.loader().loads.is_empty());
    }
}
