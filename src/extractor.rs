use crate::client::FoodSource;
use crate::error::EtlError;
use crate::types::PageRange;
use log::{debug, info};
use serde_json::Value;

/// Walks the result pages of a [`FoodSource`] in order
pub struct Extractor<'a, S: FoodSource> {
    source: &'a S,
    pages: PageRange,
}

impl<'a, S: FoodSource> Extractor<'a, S> {
    pub fn new(source: &'a S, pages: PageRange) -> Self {
        Extractor { source, pages }
    }

    /// Fetch every page in the configured window, one list of raw foods per
    /// page, in page order.
    ///
    /// The page count is asked for once, before any page is fetched. The
    /// first failing request aborts the walk.
    pub fn extract(&self) -> Result<Vec<Vec<Value>>, EtlError> {
        let total = self.source.total_pages()?;
        let window = self.pages.resolve(total);
        info!(
            "API reports {} pages, fetching pages {}..={}",
            total,
            window.start(),
            window.end()
        );

        let mut pages = Vec::new();
        for page in window {
            let foods = self.source.fetch_page(page)?;
            debug!("Page {} returned {} foods", page, foods.len());
            pages.push(foods);
        }

        info!("Fetched {} pages", pages.len());
        Ok(pages)
    }
}

/// Concatenate per-page food lists, keeping page order and in-page order
pub fn flatten_pages(pages: Vec<Vec<Value>>) -> Vec<Value> {
    pages.into_iter().flatten().collect()
}
