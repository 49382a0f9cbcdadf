use cached::{Cached, TimedSizedCache};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::trace;

use crate::error::Result;
use crate::predictor::{GrowthPredictor, PredictionRequest, PredictionResult, PredictionTarget};
use crate::region_growth::RegionGrowthTable;

/// Key of the single-region prediction cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredictionKey {
    region: String,
    target: PredictionTarget,
}

impl From<&PredictionRequest> for PredictionKey {
    fn from(request: &PredictionRequest) -> Self {
        Self {
            region: request.region.clone(),
            target: request.target,
        }
    }
}

/// A caching wrapper for GrowthPredictor implementations.
///
/// Results of both prediction methods are memoized with a TTL. Errors are
/// never cached.
pub struct CachedGrowthPredictor<T: GrowthPredictor> {
    /// The wrapped predictor
    inner: T,
    prediction_cache: Arc<Mutex<TimedSizedCache<PredictionKey, PredictionResult>>>,
    table_cache: Arc<Mutex<TimedSizedCache<PredictionTarget, RegionGrowthTable>>>,
}

impl<T: GrowthPredictor> CachedGrowthPredictor<T> {
    /// Creates a new cache wrapping the provided predictor.
    ///
    /// # Arguments
    /// * `inner` - The predictor to wrap with caching
    /// * `cache_size` - Maximum number of entries in each cache
    /// * `ttl` - Time to live for cached entries
    pub fn new(inner: T, cache_size: usize, ttl: Duration) -> Self {
        Self {
            inner,
            prediction_cache: Arc::new(Mutex::new(TimedSizedCache::with_size_and_lifespan(
                cache_size,
                ttl.as_secs(),
            ))),
            table_cache: Arc::new(Mutex::new(TimedSizedCache::with_size_and_lifespan(
                cache_size,
                ttl.as_secs(),
            ))),
        }
    }

    /// Clears all caches.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.prediction_cache.lock() {
            cache.cache_clear();
        }
        if let Ok(mut cache) = self.table_cache.lock() {
            cache.cache_clear();
        }
    }

    /// Returns the number of cached entries over both caches.
    pub fn cache_size(&self) -> usize {
        let predictions = self
            .prediction_cache
            .lock()
            .map(|c| c.cache_size())
            .unwrap_or(0);
        let tables = self.table_cache.lock().map(|c| c.cache_size()).unwrap_or(0);
        predictions + tables
    }
}

impl<T: GrowthPredictor> fmt::Debug for CachedGrowthPredictor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedGrowthPredictor")
            .field("inner", &self.inner)
            .field("cache_size", &self.cache_size())
            .finish()
    }
}

impl<T: GrowthPredictor> GrowthPredictor for CachedGrowthPredictor<T> {
    fn predict_growth(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        let key = PredictionKey::from(request);
        if let Ok(mut cache) = self.prediction_cache.lock() {
            if let Some(result) = cache.cache_get(&key) {
                trace!("Prediction cache hit for {:?}", key);
                return Ok(result.clone());
            }
        }

        let result = self.inner.predict_growth(request)?;
        if let Ok(mut cache) = self.prediction_cache.lock() {
            cache.cache_set(key, result.clone());
        }
        Ok(result)
    }

    fn predict_region_growth_table(&self, target: PredictionTarget) -> Result<RegionGrowthTable> {
        if let Ok(mut cache) = self.table_cache.lock() {
            if let Some(table) = cache.cache_get(&target) {
                trace!("Region table cache hit for {:?}", target);
                return Ok(table.clone());
            }
        }

        let table = self.inner.predict_region_growth_table(target)?;
        if let Ok(mut cache) = self.table_cache.lock() {
            cache.cache_set(target, table.clone());
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_predictor;

    #[test]
    fn test_results_are_cached() {
        let cached = CachedGrowthPredictor::new(fixture_predictor(), 100, Duration::from_secs(300));
        let request = PredictionRequest::new("Madrid", PredictionTarget::Year(2025));

        let first = cached.predict_growth(&request).unwrap();
        assert_eq!(cached.cache_size(), 1);
        let second = cached.predict_growth(&request).unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.cache_size(), 1);

        cached
            .predict_region_growth_table(PredictionTarget::Horizon(2))
            .unwrap();
        assert_eq!(cached.cache_size(), 2);

        cached.clear_cache();
        assert_eq!(cached.cache_size(), 0);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cached = CachedGrowthPredictor::new(fixture_predictor(), 100, Duration::from_secs(300));
        let request = PredictionRequest::new("Madrid", PredictionTarget::Year(1999));

        assert!(cached.predict_growth(&request).is_err());
        assert_eq!(cached.cache_size(), 0);
    }

    #[test]
    fn test_cache_size_is_bounded() {
        let cached = CachedGrowthPredictor::new(fixture_predictor(), 1, Duration::from_secs(60));

        for year in [2024, 2025, 2026] {
            cached
                .predict_growth(&PredictionRequest::new("Madrid", PredictionTarget::Year(year)))
                .unwrap();
        }
        assert_eq!(cached.cache_size(), 1);
    }
}
