//! Working set of sailing results for the current search.

use chrono::{DateTime, Utc};
use common::SailingId;

use crate::delta::AvailabilityDelta;
use crate::reconciler::{ReconcileOutcome, apply_delta};
use crate::sailing::SailingResult;

/// Holds the sailing records returned by the most recent search.
///
/// The cache is owned by the controller task and mutated only through
/// [`SearchCache::seed`] (a new search) and [`SearchCache::apply`] (a pushed
/// delta), so no locking is needed.
#[derive(Debug, Default)]
pub struct SearchCache {
    results: Vec<SailingResult>,
    searched_at: Option<DateTime<Utc>>,
}

impl SearchCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached results with a fresh search response.
    ///
    /// Any previously cached sailings, including the reconciled state
    /// they carried, are discarded.
    pub fn seed(&mut self, results: Vec<SailingResult>, searched_at: DateTime<Utc>) {
        tracing::info!(count = results.len(), "seeding search cache");
        self.results = results;
        self.searched_at = Some(searched_at);
    }

    /// Drops all cached results.
    pub fn clear(&mut self) {
        self.results.clear();
        self.searched_at = None;
    }

    /// Folds one availability delta into the cached results.
    pub fn apply(&mut self, sailing_id: &SailingId, delta: &AvailabilityDelta) -> ReconcileOutcome {
        apply_delta(&mut self.results, sailing_id, delta)
    }

    /// Returns the cached sailing with the given id.
    pub fn get(&self, sailing_id: &SailingId) -> Option<&SailingResult> {
        self.results.iter().find(|s| s.id == *sailing_id)
    }

    /// Returns all cached results in search order.
    pub fn results(&self) -> &[SailingResult] {
        &self.results
    }

    /// Returns when the cached results were fetched, if any.
    pub fn searched_at(&self) -> Option<DateTime<Utc>> {
        self.searched_at
    }

    /// Returns the number of cached sailings.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no search has been cached.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::{ChangeType, DeltaSource};
    use crate::sailing::{AvailableSpaces, PriceTable};
    use chrono::TimeZone;

    fn make_sailing(id: &str) -> SailingResult {
        SailingResult {
            id: SailingId::new(id),
            route: "HEL-TAL".into(),
            operator: "Nordline".to_string(),
            departure_port: "Helsinki".to_string(),
            arrival_port: "Tallinn".to_string(),
            departure_time: Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2026, 6, 1, 10, 30, 0).unwrap(),
            prices: PriceTable::default(),
            available_spaces: AvailableSpaces {
                passengers: 100,
                vehicles: 20,
                cabins: 8,
            },
            cabin_types: vec![],
        }
    }

    #[test]
    fn test_seed_replaces_previous_results() {
        let mut cache = SearchCache::new();
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();

        cache.seed(vec![make_sailing("A"), make_sailing("B")], now);
        assert_eq!(cache.len(), 2);

        cache.seed(vec![make_sailing("C")], now);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&SailingId::new("A")).is_none());
        assert!(cache.get(&SailingId::new("C")).is_some());
    }

    #[test]
    fn test_apply_reaches_the_matching_sailing() {
        let mut cache = SearchCache::new();
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        cache.seed(vec![make_sailing("A"), make_sailing("B")], now);

        let delta = AvailabilityDelta::new(ChangeType::BookingCreated, DeltaSource::External)
            .with_passengers_booked(10);
        let outcome = cache.apply(&SailingId::new("B"), &delta);

        assert_eq!(outcome, ReconcileOutcome::Applied);
        assert_eq!(
            cache.get(&SailingId::new("B")).unwrap().available_spaces.passengers,
            90
        );
        // Sibling untouched.
        assert_eq!(
            cache.get(&SailingId::new("A")).unwrap().available_spaces.passengers,
            100
        );
    }

    #[test]
    fn test_clear_empties_the_cache() {
        let mut cache = SearchCache::new();
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        cache.seed(vec![make_sailing("A")], now);

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.searched_at().is_none());
    }
}
