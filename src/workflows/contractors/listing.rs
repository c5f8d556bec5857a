use super::domain::{Contractor, RawContractor, ServiceCatalog};
use super::filter::{apply_filter, FilterSpec};
use super::normalizer::normalize_all;
use super::sort::{sort_contractors, SortKey};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Filter and sort settings for one render of a contractor list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractorQuery {
    #[serde(flatten)]
    pub filter: FilterSpec,
    #[serde(default)]
    pub sort: SortKey,
}

impl ContractorQuery {
    /// Resolve the service dropdown name into an id before filtering.
    #[must_use]
    pub fn resolve_service(self, catalog: &ServiceCatalog) -> Self {
        Self {
            filter: self.filter.resolve_service(catalog),
            sort: self.sort,
        }
    }
}

/// Filter, then stable-sort, a normalized roster.
pub fn list_contractors(contractors: &[Contractor], query: &ContractorQuery) -> Vec<Contractor> {
    let mut visible = apply_filter(contractors, &query.filter);
    sort_contractors(&mut visible, query.sort);
    debug!(
        total = contractors.len(),
        matched = visible.len(),
        sort = query.sort.as_str(),
        "contractor listing filtered"
    );
    visible
}

/// Distinct non-empty states in first-seen order, for the region dropdown.
pub fn region_options(contractors: &[Contractor]) -> Vec<String> {
    let mut seen = HashSet::new();
    contractors
        .iter()
        .filter_map(|contractor| contractor.state.as_deref())
        .filter(|state| !state.is_empty())
        .filter(|state| seen.insert(state.to_string()))
        .map(str::to_string)
        .collect()
}

/// Everything the listing page renders from one API payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractorListing {
    pub total: usize,
    pub matched: usize,
    pub regions: Vec<String>,
    pub contractors: Vec<Contractor>,
}

impl ContractorListing {
    pub fn build(raw: &[RawContractor], query: &ContractorQuery) -> Self {
        let roster = normalize_all(raw);
        Self::from_roster(&roster, query)
    }

    pub fn from_roster(roster: &[Contractor], query: &ContractorQuery) -> Self {
        let contractors = list_contractors(roster, query);
        Self {
            total: roster.len(),
            matched: contractors.len(),
            regions: region_options(roster),
            contractors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_roster() -> Vec<RawContractor> {
        serde_json::from_value(json!([
            { "id": 1, "user": { "first_name": "Asha", "last_name": "Rao" }, "rating": 4.5, "experience": 10, "state": "Delhi" },
            { "id": 2, "first_name": "Vikram", "rating": null, "experience": 2, "state": "Mumbai" },
            { "id": 3, "user": { "first_name": "Kiran" }, "rating": "3.0", "experience": 30, "state": "Delhi" }
        ]))
        .expect("roster parses")
    }

    #[test]
    fn delhi_scenario_returns_rated_contractors_in_rating_order() {
        let query: ContractorQuery = serde_json::from_value(json!({
            "region": "Delhi",
            "min_rating": 3,
            "sort": "rating-desc"
        }))
        .expect("query parses");

        let listing = ContractorListing::build(&raw_roster(), &query);

        let ids: Vec<i64> = listing.contractors.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(listing.total, 3);
        assert_eq!(listing.matched, 2);
        assert_eq!(listing.contractors[0].name, "Asha Rao");
    }

    #[test]
    fn service_filter_matches_id_or_record_references() {
        let raw: Vec<RawContractor> = serde_json::from_value(json!([
            { "id": 1, "service": 4 },
            { "id": 2, "service": { "id": 5, "name": "Painting" } },
            { "id": 3, "service": { "id": 4, "name": "Carpentry" } },
            { "id": 4 }
        ]))
        .expect("roster parses");
        let catalog: ServiceCatalog = serde_json::from_value(json!([
            { "id": 4, "name": "Carpentry" },
            { "id": 5, "name": "Painting" }
        ]))
        .expect("catalog parses");
        let query: ContractorQuery =
            serde_json::from_value(json!({ "service": "Carpentry" })).expect("query parses");

        let listing = ContractorListing::build(&raw, &query.resolve_service(&catalog));
        let ids: Vec<i64> = listing.contractors.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn regions_are_distinct_in_first_seen_order() {
        let listing = ContractorListing::build(&raw_roster(), &ContractorQuery::default());
        assert_eq!(listing.regions, vec!["Delhi".to_string(), "Mumbai".to_string()]);
    }

    #[test]
    fn default_query_keeps_payload_order() {
        let listing = ContractorListing::build(&raw_roster(), &ContractorQuery::default());
        let ids: Vec<i64> = listing.contractors.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn empty_payload_renders_empty_listing() {
        let listing = ContractorListing::build(&[], &ContractorQuery::default());
        assert_eq!(listing.total, 0);
        assert!(listing.contractors.is_empty());
        assert!(listing.regions.is_empty());
    }
}
