use crate::workflows::contractors::normalizer::{
    integer_from_value, lenient_float, lenient_integer,
};
use crate::workflows::contractors::{
    normalize, normalize_field, ContractorId, ContractorRef, RawContractor, RawContractorField,
    ServiceId,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TenderId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementId(pub i64);

/// Backend-reported tender status.
///
/// The workflow runs draft → published → bidding → contractor_selection →
/// in_progress → completed; `cancelled` can follow any non-terminal state.
/// Values outside that vocabulary land on `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderStatus {
    Draft,
    Published,
    Bidding,
    ContractorSelection,
    InProgress,
    Completed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TenderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Bidding => "bidding",
            Self::ContractorSelection => "contractor_selection",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// Badge text shown to customers.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Published => "Open for Bids",
            Self::Bidding => "Receiving Bids",
            Self::ContractorSelection => "Select Contractor",
            Self::InProgress => "Work in Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    const fn workflow_rank(self) -> Option<u8> {
        match self {
            Self::Draft => Some(0),
            Self::Published => Some(1),
            Self::Bidding => Some(2),
            Self::ContractorSelection => Some(3),
            Self::InProgress => Some(4),
            Self::Completed => Some(5),
            Self::Cancelled | Self::Unknown => None,
        }
    }

    /// Whether a backend report moving from `self` to `next` is a forward step.
    pub fn can_transition_to(self, next: TenderStatus) -> bool {
        if self.is_terminal() || self == Self::Unknown {
            return false;
        }
        if next == Self::Cancelled {
            return true;
        }
        match (self.workflow_rank(), next.workflow_rank()) {
            (Some(current), Some(next)) => next > current,
            _ => false,
        }
    }
}

/// One line item of a tender as sent by the backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRequirement {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub id: Option<i64>,
    #[serde(default, alias = "name")]
    pub description: Option<String>,
    /// Kept raw so bid pricing can tell an absent quantity from a garbled one.
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub is_critical: bool,
}

/// A requirement reference on a bid: a bare id or the expanded line item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawRequirementField {
    Id(i64),
    Record(RawRequirement),
}

impl RawRequirementField {
    pub fn id(&self) -> Option<i64> {
        match self {
            RawRequirementField::Id(id) => Some(*id),
            RawRequirementField::Record(record) => record.id,
        }
    }

    pub fn quantity(&self) -> Option<&Value> {
        match self {
            RawRequirementField::Id(_) => None,
            RawRequirementField::Record(record) => record.quantity.as_ref(),
        }
    }

    pub fn units(&self) -> Option<&str> {
        match self {
            RawRequirementField::Id(_) => None,
            RawRequirementField::Record(record) => record.units.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirement {
    pub id: Option<RequirementId>,
    pub description: String,
    pub quantity: Option<i64>,
    pub units: Option<String>,
    pub is_critical: bool,
}

impl From<&RawRequirement> for Requirement {
    fn from(raw: &RawRequirement) -> Self {
        Self {
            id: raw.id.map(RequirementId),
            description: raw.description.as_deref().unwrap_or_default().trim().to_string(),
            quantity: raw.quantity.as_ref().and_then(integer_from_value),
            units: raw.units.clone(),
            is_critical: raw.is_critical,
        }
    }
}

/// Tender payload as returned by the tender list and detail endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTender {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: TenderStatus,
    #[serde(default, deserialize_with = "lenient_float")]
    pub budget: Option<f64>,
    #[serde(default)]
    pub service: Option<Value>,
    #[serde(default)]
    pub supervisor: Option<Value>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub selected_contractor: Option<RawContractorField>,
    #[serde(default, alias = "requirements")]
    pub tender_requirements: Vec<RawRequirement>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub bid_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Canonical tender consumed by the board and the bid summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tender {
    pub id: TenderId,
    pub title: String,
    pub status: TenderStatus,
    pub budget: Option<f64>,
    pub service_id: Option<ServiceId>,
    pub supervisor_id: Option<i64>,
    pub location: Option<String>,
    pub selected_contractor_id: Option<ContractorId>,
    pub selected_contractor: Option<ContractorRef>,
    pub requirements: Vec<Requirement>,
    pub bid_count: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Tender {
    pub fn from_raw(raw: &RawTender) -> Self {
        let selected = raw.selected_contractor.as_ref();
        Self {
            id: TenderId(raw.id.unwrap_or_default()),
            title: raw.title.as_deref().unwrap_or_default().trim().to_string(),
            status: raw.status,
            budget: raw.budget,
            service_id: raw.service.as_ref().and_then(reference_id).map(ServiceId),
            supervisor_id: raw.supervisor.as_ref().and_then(reference_id),
            location: raw.location.clone(),
            selected_contractor_id: selected.and_then(RawContractorField::id).map(ContractorId),
            selected_contractor: selected.map(|field| normalize_field(Some(field))),
            requirements: raw.tender_requirements.iter().map(Requirement::from).collect(),
            bid_count: raw.bid_count,
            start_time: raw.start_time,
            end_time: raw.end_time,
        }
    }

    pub fn has_selected_contractor(&self) -> bool {
        self.selected_contractor.is_some()
    }

    /// The "select this contractor" button only shows on open tenders that
    /// have not picked anyone yet.
    pub fn can_select_contractor(&self) -> bool {
        self.status == TenderStatus::Published && !self.has_selected_contractor()
    }

    pub fn critical_requirement_count(&self) -> usize {
        self.requirements
            .iter()
            .filter(|requirement| requirement.is_critical)
            .count()
    }
}

/// One per-requirement bid row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawBid {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub id: Option<i64>,
    #[serde(default)]
    pub contractor: Option<RawContractorField>,
    #[serde(default)]
    pub contractor_details: Option<RawContractor>,
    #[serde(default, alias = "requirement")]
    pub tender_requirement: Option<RawRequirementField>,
    #[serde(default, alias = "amount")]
    pub bid_amount: Option<Value>,
    #[serde(default)]
    pub proposal: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawBid {
    /// Contractor id from the reference, falling back to the expanded details.
    pub fn contractor_id(&self) -> Option<ContractorId> {
        self.contractor
            .as_ref()
            .and_then(RawContractorField::id)
            .or_else(|| self.contractor_details.as_ref().and_then(|details| details.id))
            .map(ContractorId)
    }

    /// Expanded details win over an expanded reference; a bare id has none.
    pub fn contractor_ref(&self) -> ContractorRef {
        match &self.contractor_details {
            Some(details) => ContractorRef::Available(normalize(details)),
            None => normalize_field(self.contractor.as_ref()),
        }
    }
}

/// Id of a reference that may be a number, a numeric string, or an object
/// carrying `id`.
fn reference_id(value: &Value) -> Option<i64> {
    match value {
        Value::Object(map) => map.get("id").and_then(reference_id),
        Value::Number(number) => number.as_i64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_datetime))
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
