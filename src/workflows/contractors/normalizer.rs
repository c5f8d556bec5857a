use super::domain::{Contractor, ContractorId, ContractorRef, RawContractor, RawContractorField};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Map either backend shape onto the canonical contractor record.
///
/// Nested `user` names win over flat ones; missing parts become empty strings
/// and the joined name is trimmed. `region` is folded into `state`.
pub fn normalize(raw: &RawContractor) -> Contractor {
    let user = raw.user.as_ref();
    let first = user
        .and_then(|user| user.first_name.as_deref())
        .or(raw.first_name.as_deref())
        .unwrap_or_default();
    let last = user
        .and_then(|user| user.last_name.as_deref())
        .or(raw.last_name.as_deref())
        .unwrap_or_default();

    let state = non_blank(raw.state.as_deref())
        .or_else(|| non_blank(raw.region.as_deref()))
        .or_else(|| non_blank(user.and_then(|user| user.state.as_deref())));
    let city = non_blank(raw.city.as_deref())
        .or_else(|| non_blank(user.and_then(|user| user.city.as_deref())));

    Contractor {
        id: ContractorId(raw.id.unwrap_or_default()),
        name: display_name(first, last),
        rating: raw.rating,
        experience: raw.experience.unwrap_or(0),
        city,
        state,
        service_id: raw.service.as_ref().map(|service| service.id()),
    }
}

pub fn normalize_all(raw: &[RawContractor]) -> Vec<Contractor> {
    raw.iter().map(normalize).collect()
}

/// Resolve a possibly missing nested contractor object.
///
/// A bare id carries no details, so it resolves to `Unavailable` just like an
/// absent object; grouping code reads the id separately.
pub fn normalize_field(field: Option<&RawContractorField>) -> ContractorRef {
    match field {
        Some(RawContractorField::Record(record)) => ContractorRef::Available(normalize(record)),
        Some(RawContractorField::Id(_)) | None => ContractorRef::Unavailable,
    }
}

fn display_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Accepts a JSON number, a numeric string, or null. Anything unparseable or
/// non-finite is treated as absent.
pub(crate) fn lenient_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(float_from_value))
}

/// Integer counterpart of [`lenient_float`]; fractional input is truncated.
pub(crate) fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(integer_from_value))
}

pub(crate) fn float_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|value| value.is_finite())
}

pub(crate) fn integer_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64)),
        Value::String(raw) => {
            let raw = raw.trim();
            raw.parse::<i64>().ok().or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(|v| v.trunc() as i64)
            })
        }
        _ => None,
    }
}
