//! Restaurant catalog.
//!
//! Listings are fetched per backend category and cached using `moka`
//! (5-minute TTL by default). Search and sort are applied locally.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use foody_core::{ApiCategory, Category, Restaurant, SortOption};
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::api::{ApiClient, ApiError};
use crate::state::Filters;

/// Restaurant listings with an in-memory query cache.
///
/// Cheaply cloneable; clones share the cache.
#[derive(Clone)]
pub struct CatalogService {
    api: ApiClient,
    cache: Cache<ApiCategory, Arc<Vec<Restaurant>>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("cached_listings", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl CatalogService {
    /// Create a catalog whose listings stay cached for `ttl`.
    #[must_use]
    pub fn new(api: ApiClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(ttl)
            .build();

        Self { api, cache }
    }

    /// Restaurants for a home view category.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing has to be fetched and the request
    /// fails.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn restaurants(&self, category: Category) -> Result<Arc<Vec<Restaurant>>, ApiError> {
        let api_category = category.api_category();

        if let Some(list) = self.cache.get(&api_category).await {
            debug!(count = list.len(), "Cache hit for restaurants");
            return Ok(list);
        }

        let list = Arc::new(self.api.restaurants(api_category).await?);
        self.cache.insert(api_category, Arc::clone(&list)).await;
        Ok(list)
    }

    /// The listing for the filters' category, searched and sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing has to be fetched and the request
    /// fails.
    pub async fn browse(&self, filters: &Filters) -> Result<Vec<Restaurant>, ApiError> {
        let list = self.restaurants(filters.category).await?;
        let mut matches = filter_restaurants(&list, &filters.search);
        sort_restaurants(&mut matches, filters.sort);
        Ok(matches)
    }

    /// Drop every cached listing.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

// =============================================================================
// Local Search and Sort
// =============================================================================

/// Restaurants whose name contains `query`, ignoring case.
///
/// The query is trimmed; an empty query keeps every entry. Order is
/// preserved.
#[must_use]
pub fn filter_restaurants(list: &[Restaurant], query: &str) -> Vec<Restaurant> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return list.to_vec();
    }

    list.iter()
        .filter(|r| r.name_or_empty().to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Sort in place. Entries missing the sort key go last; ties keep their
/// order.
pub fn sort_restaurants(list: &mut [Restaurant], sort: Option<SortOption>) {
    match sort {
        None => {}
        Some(SortOption::Rating) => list.sort_by(|a, b| missing_last(a.rating, b.rating, true)),
        Some(SortOption::PriceAsc) => list.sort_by(|a, b| missing_last(a.price, b.price, false)),
        Some(SortOption::PriceDesc) => list.sort_by(|a, b| missing_last(a.price, b.price, true)),
    }
}

fn missing_last(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
