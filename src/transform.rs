//! Projection of raw foods onto the food and nutrient tables
//!
//! Raw API objects carry many more keys than we keep, and any of the kept ones
//! may be missing. Projection reads exactly the columns of [`FoodRecord`] and
//! [`NutrientRecord`], filling absent ones with `null`, so every row of a
//! table has the same shape.

use crate::error::EtlError;
use crate::types::{FoodRecord, NutrientRecord, Table};
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// Key under which a raw food lists its nutrients
pub const NUTRIENTS_KEY: &str = "foodNutrients";

/// Project a raw food onto the seven food columns
pub fn project_food(raw: &Value) -> Result<FoodRecord, EtlError> {
    project(raw, "food")
}

/// Project a raw nutrient onto the eight nutrient columns. The `fdcId` key is
/// left `null` for the caller to fill in.
pub fn project_nutrient(raw: &Value) -> Result<NutrientRecord, EtlError> {
    project(raw, "nutrient")
}

fn project<'a, R: Deserialize<'a>>(raw: &'a Value, what: &str) -> Result<R, EtlError> {
    // serde would also accept an array positionally
    if !raw.is_object() {
        return Err(EtlError::malformed(what, format!("expected an object, found {}", raw)));
    }
    R::deserialize(raw).map_err(|e| EtlError::malformed(what, e.to_string()))
}

/// Builds the food and nutrient tables from a flat list of raw foods
#[derive(Debug, Clone)]
pub struct Transformer {
    validate_unique_ids: bool,
}

impl Transformer {
    pub fn new(validate_unique_ids: bool) -> Self {
        Transformer { validate_unique_ids }
    }

    /// Project every food and each of its nutrients, in input order.
    ///
    /// Each nutrient row gets the `fdcId` of the food it was listed under. A
    /// food without a nutrient list contributes no nutrient rows.
    pub fn transform(
        &self,
        foods: Vec<Value>,
    ) -> Result<(Table<FoodRecord>, Table<NutrientRecord>), EtlError> {
        let mut food_table = Table::new();
        let mut nutrient_table = Table::new();
        let mut seen_ids = HashSet::new();

        for raw in foods {
            let food = project_food(&raw)?;

            match food.fdc_key() {
                Some(key) => {
                    if self.validate_unique_ids && !seen_ids.insert(key.clone()) {
                        return Err(EtlError::DuplicateFdcId(key));
                    }
                }
                None => warn!("Food without fdcId: {}", food.description),
            }

            match raw.get(NUTRIENTS_KEY) {
                Some(Value::Array(nutrients)) => {
                    for raw_nutrient in nutrients {
                        let mut nutrient = project_nutrient(raw_nutrient)?;
                        nutrient.fdc_id = food.fdc_id.clone();
                        nutrient_table.push(nutrient);
                    }
                }
                None | Some(Value::Null) => {
                    warn!("Food {} has no {} list", food.fdc_id, NUTRIENTS_KEY);
                }
                Some(other) => {
                    return Err(EtlError::malformed(
                        NUTRIENTS_KEY,
                        format!("expected an array for food {}, found {}", food.fdc_id, other),
                    ));
                }
            }

            food_table.push(food);
        }

        Ok((food_table, nutrient_table))
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Transformer::new(true)
    }
}
