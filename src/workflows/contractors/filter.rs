use super::domain::{Contractor, ServiceCatalog, ServiceId};
use serde::{Deserialize, Serialize};

/// Filter selections coming from the listing sidebar or the tender picker.
///
/// Every field is optional; an empty spec lets every contractor through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub region: Option<String>,
    /// Service name picked from the dropdown; see [`FilterSpec::resolve_service`].
    pub service: Option<String>,
    pub service_id: Option<ServiceId>,
    pub min_rating: Option<f64>,
    /// Ceiling: contractors with at most this many years pass.
    pub max_experience: Option<i64>,
    /// Floor used by the tender picker: at least this many years.
    pub min_experience: Option<i64>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.region_key().is_none()
            && self.service_id.is_none()
            && self.min_rating.is_none()
            && self.max_experience.is_none()
            && self.min_experience.is_none()
    }

    /// Look the picked service name up in `catalog`. A name the catalog does
    /// not know clears the service filter, so every contractor shows.
    #[must_use]
    pub fn resolve_service(mut self, catalog: &ServiceCatalog) -> Self {
        if let Some(name) = self.service.as_deref() {
            self.service_id = catalog.find_by_name(name).map(|service| service.id);
        }
        self
    }

    fn region_key(&self) -> Option<String> {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|region| !region.is_empty())
            .map(str::to_lowercase)
    }
}

type Predicate = Box<dyn Fn(&Contractor) -> bool + Send + Sync>;

/// Build the AND-combination of every active predicate in `spec`.
pub fn build_filter(spec: &FilterSpec) -> impl Fn(&Contractor) -> bool + Send + Sync {
    let mut predicates: Vec<Predicate> = Vec::new();

    if let Some(region) = spec.region_key() {
        predicates.push(Box::new(move |contractor: &Contractor| {
            contractor
                .state
                .as_deref()
                .map(|state| state.to_lowercase() == region)
                .unwrap_or(false)
        }));
    }

    if let Some(service_id) = spec.service_id {
        predicates.push(Box::new(move |contractor: &Contractor| {
            contractor.service_id == Some(service_id)
        }));
    }

    if let Some(min_rating) = spec.min_rating {
        predicates.push(Box::new(move |contractor: &Contractor| {
            contractor.rating_or_zero() >= min_rating
        }));
    }

    if let Some(max_experience) = spec.max_experience {
        predicates.push(Box::new(move |contractor: &Contractor| {
            contractor.experience <= max_experience
        }));
    }

    if let Some(min_experience) = spec.min_experience {
        predicates.push(Box::new(move |contractor: &Contractor| {
            contractor.experience >= min_experience
        }));
    }

    move |contractor: &Contractor| predicates.iter().all(|predicate| predicate(contractor))
}

/// Keep the contractors matching `spec`, preserving their input order.
pub fn apply_filter(contractors: &[Contractor], spec: &FilterSpec) -> Vec<Contractor> {
    let predicate = build_filter(spec);
    contractors
        .iter()
        .filter(|contractor| predicate(*contractor))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::contractors::domain::{ContractorId, Service};

    fn contractor(id: i64, rating: Option<f64>, experience: i64, state: Option<&str>) -> Contractor {
        Contractor {
            id: ContractorId(id),
            name: format!("Contractor {id}"),
            rating,
            experience,
            city: None,
            state: state.map(str::to_string),
            service_id: None,
        }
    }

    fn roster() -> Vec<Contractor> {
        vec![
            contractor(1, Some(4.5), 10, Some("Delhi")),
            contractor(2, None, 2, Some("Mumbai")),
            contractor(3, Some(3.0), 30, Some("Delhi")),
            contractor(4, Some(1.5), 25, None),
        ]
    }

    fn ids(contractors: &[Contractor]) -> Vec<i64> {
        contractors.iter().map(|c| c.id.0).collect()
    }

    #[test]
    fn empty_spec_accepts_everything() {
        let spec = FilterSpec::default();
        assert!(spec.is_empty());
        assert_eq!(ids(&apply_filter(&roster(), &spec)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn blank_region_is_ignored() {
        let spec = FilterSpec {
            region: Some(String::new()),
            ..FilterSpec::default()
        };
        assert!(spec.is_empty());
        assert_eq!(apply_filter(&roster(), &spec).len(), 4);
    }

    #[test]
    fn region_matches_case_insensitively() {
        let spec = FilterSpec {
            region: Some("delhi".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply_filter(&roster(), &spec)), vec![1, 3]);
    }

    #[test]
    fn padded_region_still_matches() {
        let spec = FilterSpec {
            region: Some(" Delhi ".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply_filter(&roster(), &spec)), vec![1, 3]);

        let blank = FilterSpec {
            region: Some("   ".to_string()),
            ..FilterSpec::default()
        };
        assert!(blank.is_empty());
    }

    #[test]
    fn service_name_resolves_through_the_catalog() {
        let catalog = ServiceCatalog::new(vec![
            Service {
                id: ServiceId(1),
                name: "Plumbing".to_string(),
                description: String::new(),
            },
            Service {
                id: ServiceId(2),
                name: "Electrical Work".to_string(),
                description: String::new(),
            },
        ]);
        let mut roster = roster();
        roster[0].service_id = Some(ServiceId(1));
        roster[1].service_id = Some(ServiceId(2));
        roster[2].service_id = Some(ServiceId(1));

        let plumbing = FilterSpec {
            service: Some("plumbing".to_string()),
            ..FilterSpec::default()
        }
        .resolve_service(&catalog);
        assert_eq!(plumbing.service_id, Some(ServiceId(1)));
        assert_eq!(ids(&apply_filter(&roster, &plumbing)), vec![1, 3]);

        let unknown = FilterSpec {
            service: Some("Roofing".to_string()),
            service_id: Some(ServiceId(2)),
            ..FilterSpec::default()
        }
        .resolve_service(&catalog);
        assert!(unknown.is_empty());
        assert_eq!(apply_filter(&roster, &unknown).len(), 4);
    }

    #[test]
    fn unrated_contractors_only_pass_a_zero_threshold() {
        let zero = FilterSpec {
            min_rating: Some(0.0),
            ..FilterSpec::default()
        };
        assert!(ids(&apply_filter(&roster(), &zero)).contains(&2));

        let three = FilterSpec {
            min_rating: Some(3.0),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply_filter(&roster(), &three)), vec![1, 3]);
    }

    #[test]
    fn experience_is_a_ceiling() {
        let veteran = contractor(5, Some(4.0), 25, None);
        let within = FilterSpec {
            max_experience: Some(30),
            ..FilterSpec::default()
        };
        let below = FilterSpec {
            max_experience: Some(20),
            ..FilterSpec::default()
        };
        assert!(build_filter(&within)(&veteran));
        assert!(!build_filter(&below)(&veteran));

        let unknown = contractor(6, None, 0, None);
        for ceiling in [0, 1, 30] {
            let spec = FilterSpec {
                max_experience: Some(ceiling),
                ..FilterSpec::default()
            };
            assert!(build_filter(&spec)(&unknown));
        }
    }

    #[test]
    fn experience_floor_and_ceiling_combine() {
        let spec = FilterSpec {
            min_experience: Some(5),
            max_experience: Some(26),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply_filter(&roster(), &spec)), vec![1, 4]);
    }

    #[test]
    fn filtering_twice_changes_nothing() {
        let spec = FilterSpec {
            region: Some("Delhi".to_string()),
            min_rating: Some(2.0),
            max_experience: Some(40),
            ..FilterSpec::default()
        };
        let once = apply_filter(&roster(), &spec);
        let twice = apply_filter(&once, &spec);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_roster_yields_empty_result() {
        let spec = FilterSpec {
            min_rating: Some(4.0),
            ..FilterSpec::default()
        };
        assert!(apply_filter(&[], &spec).is_empty());
    }
}
