use serde::{Deserialize, Serialize};

/// Identifier wrapper for contractors as issued by the backend.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContractorId(pub i64);

/// Identifier wrapper for catalog services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub i64);

/// Canonical contractor record every downstream view operates on.
///
/// `rating` stays `None` for unrated contractors; filters and comparators read
/// it as `0.0`. `experience` is already defaulted to zero years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contractor {
    pub id: ContractorId,
    pub name: String,
    pub rating: Option<f64>,
    pub experience: i64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub service_id: Option<ServiceId>,
}

impl Contractor {
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }
}

/// Contractor details attached to another record (a bid, an interest, a tender).
///
/// Callers must branch on `Unavailable` and render a fallback instead of
/// dropping the parent record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "availability", rename_all = "snake_case")]
pub enum ContractorRef {
    Available(Contractor),
    Unavailable,
}

impl ContractorRef {
    pub fn as_available(&self) -> Option<&Contractor> {
        match self {
            ContractorRef::Available(contractor) => Some(contractor),
            ContractorRef::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ContractorRef::Available(_))
    }

    /// Name to render, or the fallback message for missing details.
    pub fn display_name(&self) -> &str {
        match self {
            ContractorRef::Available(contractor) if !contractor.name.is_empty() => {
                &contractor.name
            }
            ContractorRef::Available(_) => "Unnamed contractor",
            ContractorRef::Unavailable => "Contractor details not available",
        }
    }
}

/// Contractor payload as returned by the various backend endpoints.
///
/// Older endpoints nest the name under `user`, newer ones flatten it. Numeric
/// fields arrive as numbers, numeric strings (decimal columns) or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawContractor {
    #[serde(default, deserialize_with = "super::normalizer::lenient_integer")]
    pub id: Option<i64>,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "super::normalizer::lenient_float")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "super::normalizer::lenient_integer")]
    pub experience: Option<i64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub service: Option<RawServiceField>,
}

/// Nested account details carried by the `user` key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// A contractor reference that is either a bare id or an expanded record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawContractorField {
    Id(i64),
    Record(Box<RawContractor>),
}

impl RawContractorField {
    pub fn id(&self) -> Option<i64> {
        match self {
            RawContractorField::Id(id) => Some(*id),
            RawContractorField::Record(record) => record.id,
        }
    }
}

/// A service reference that is either a bare id or an expanded catalog entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawServiceField {
    Id(i64),
    Record(Service),
}

impl RawServiceField {
    pub fn id(&self) -> ServiceId {
        match self {
            RawServiceField::Id(id) => ServiceId(*id),
            RawServiceField::Record(service) => service.id,
        }
    }
}

/// Static catalog entry used for dropdowns and association lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Read-only snapshot of the service catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    services: Vec<Service>,
}

impl ServiceCatalog {
    pub fn new(services: Vec<Service>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn find(&self, id: ServiceId) -> Option<&Service> {
        self.services.iter().find(|service| service.id == id)
    }

    /// The listing page keys its service dropdown by name rather than id.
    pub fn find_by_name(&self, name: &str) -> Option<&Service> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.services
            .iter()
            .find(|service| service.name.trim().to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::new(vec![
            Service {
                id: ServiceId(1),
                name: "Plumbing".to_string(),
                description: "Pipes and fittings".to_string(),
            },
            Service {
                id: ServiceId(2),
                name: "Electrical Work".to_string(),
                description: String::new(),
            },
        ])
    }

    #[test]
    fn catalog_resolves_by_id_and_name() {
        let catalog = catalog();
        assert_eq!(
            catalog.find(ServiceId(2)).map(|s| s.name.as_str()),
            Some("Electrical Work")
        );
        assert!(catalog.find(ServiceId(9)).is_none());
        assert_eq!(
            catalog.find_by_name("  plumbing ").map(|s| s.id),
            Some(ServiceId(1))
        );
        assert!(catalog.find_by_name("").is_none());
    }

    #[test]
    fn contractor_ref_display_name_falls_back() {
        assert_eq!(
            ContractorRef::Unavailable.display_name(),
            "Contractor details not available"
        );
        let unnamed = ContractorRef::Available(Contractor {
            id: ContractorId(4),
            name: String::new(),
            rating: None,
            experience: 0,
            city: None,
            state: None,
            service_id: None,
        });
        assert_eq!(unnamed.display_name(), "Unnamed contractor");
        assert!(unnamed.is_available());
    }

    #[test]
    fn contractor_field_accepts_id_or_record() {
        let by_id: RawContractorField = serde_json::from_str("17").expect("id parses");
        assert_eq!(by_id.id(), Some(17));

        let record: RawContractorField =
            serde_json::from_str(r#"{"id": 18, "user": {"first_name": "Asha"}}"#)
                .expect("record parses");
        assert_eq!(record.id(), Some(18));
    }
}
