use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;

/// FoodData Central search endpoint
pub const FDC_SEARCH_URL: &str = "https://api.nal.usda.gov/fdc/v1/foods/search";

/// Results requested per page
pub const PAGE_SIZE: u32 = 100;

/// A record type with a fixed, ordered set of columns.
pub trait Row {
    const COLUMNS: &'static [&'static str];
}

/// One food, projected onto the columns we keep.
///
/// Every field holds whatever JSON value the API sent for it, or `null` when
/// the key was absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FoodRecord {
    pub fdc_id: Value,
    pub description: Value,
    pub common_names: Value,
    pub food_code: Value,
    pub published_date: Value,
    pub food_category: Value,
    pub food_category_id: Value,
}

impl FoodRecord {
    /// Join key as text, `None` when the food has no `fdcId`
    pub fn fdc_key(&self) -> Option<String> {
        match &self.fdc_id {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl Row for FoodRecord {
    const COLUMNS: &'static [&'static str] = &[
        "fdcId",
        "description",
        "commonNames",
        "foodCode",
        "publishedDate",
        "foodCategory",
        "foodCategoryId",
    ];
}

/// One nutrient measurement of a food.
///
/// `fdc_id` is never read from the raw nutrient; the transformer copies it
/// from the owning food.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NutrientRecord {
    pub nutrient_id: Value,
    pub nutrient_name: Value,
    pub nutrient_number: Value,
    pub unit_name: Value,
    pub value: Value,
    pub rank: Value,
    pub indent_level: Value,
    pub food_nutrient_id: Value,
    #[serde(skip_deserializing)]
    pub fdc_id: Value,
}

impl Row for NutrientRecord {
    const COLUMNS: &'static [&'static str] = &[
        "nutrientId",
        "nutrientName",
        "nutrientNumber",
        "unitName",
        "value",
        "rank",
        "indentLevel",
        "foodNutrientId",
        "fdcId",
    ];
}

/// An ordered, in-memory table of rows of one record type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R: Row> Table<R> {
    pub fn new() -> Self {
        Table { rows: Vec::new() }
    }

    pub fn push(&mut self, row: R) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), R::COLUMNS.len())
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}

impl<R: Row> Default for Table<R> {
    fn default() -> Self {
        Table::new()
    }
}

/// Inclusive, 1-based window of result pages to fetch.
///
/// `last: None` means "through the last page the API reports".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: u32,
    pub last: Option<u32>,
}

impl PageRange {
    pub fn all() -> Self {
        PageRange {
            first: 1,
            last: None,
        }
    }

    pub fn bounded(first: u32, last: u32) -> Self {
        PageRange {
            first,
            last: Some(last),
        }
    }

    /// Clamp the window to the pages that exist. Empty when `total` is 0 or
    /// the window lies past the end.
    pub fn resolve(&self, total: u32) -> RangeInclusive<u32> {
        let first = self.first.max(1);
        let last = self.last.map_or(total, |last| last.min(total));
        first..=last
    }
}

impl Default for PageRange {
    fn default() -> Self {
        PageRange::all()
    }
}

/// Configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct EtlConfig {
    /// Search endpoint queried for both the page count and the pages
    pub base_url: String,

    /// API credential sent as `api_key`
    pub api_key: String,

    /// Results per page
    pub page_size: u32,

    /// Which pages to fetch
    pub pages: PageRange,

    /// Reject food tables in which two foods share an `fdcId`
    pub validate_unique_ids: bool,
}

impl Default for EtlConfig {
    fn default() -> Self {
        EtlConfig {
            base_url: String::from(FDC_SEARCH_URL),
            api_key: String::new(),
            page_size: PAGE_SIZE,
            pages: PageRange::all(),
            validate_unique_ids: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_range_defaults_to_every_page() {
        let pages: Vec<u32> = PageRange::all().resolve(4).collect();
        assert_eq!(pages, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_page_range_is_clamped_to_total() {
        let pages: Vec<u32> = PageRange::bounded(2, 9).resolve(3).collect();
        assert_eq!(pages, vec![2, 3]);

        let pages: Vec<u32> = PageRange::bounded(0, 1).resolve(3).collect();
        assert_eq!(pages, vec![1]);
    }

    #[test]
    fn test_page_range_empty_cases() {
        assert_eq!(PageRange::all().resolve(0).count(), 0);
        assert_eq!(PageRange::bounded(5, 6).resolve(3).count(), 0);
        assert_eq!(PageRange::bounded(3, 2).resolve(10).count(), 0);
    }

    #[test]
    fn test_empty_tables_keep_their_columns() {
        let foods: Table<FoodRecord> = Table::new();
        let nutrients: Table<NutrientRecord> = Table::default();

        assert_eq!(foods.shape(), (0, 7));
        assert_eq!(nutrients.shape(), (0, 9));
        assert_eq!(nutrients.columns().last(), Some(&"fdcId"));
    }

    #[test]
    fn test_records_serialize_with_api_names() {
        let record = FoodRecord {
            fdc_id: json!(10),
            description: json!("Apple"),
            ..FoodRecord::default()
        };

        let value = serde_json::to_value(&record).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();

        let mut expected = FoodRecord::COLUMNS.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert_eq!(value["commonNames"], Value::Null);
    }

    #[test]
    fn test_fdc_key() {
        let mut record = FoodRecord::default();
        assert_eq!(record.fdc_key(), None);

        record.fdc_id = json!(167512);
        assert_eq!(record.fdc_key().as_deref(), Some("167512"));
    }
}
