use super::domain::Contractor;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordering options offered by the listing and picker dropdowns.
///
/// Parsing never fails: unknown or empty keys become `Unsorted`, which keeps
/// the input order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    #[default]
    Unsorted,
    RatingDesc,
    RatingAsc,
    ExperienceDesc,
    ExperienceAsc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rating-desc" => Self::RatingDesc,
            "rating-asc" => Self::RatingAsc,
            "exp-desc" => Self::ExperienceDesc,
            "exp-asc" => Self::ExperienceAsc,
            "name" | "name-asc" => Self::NameAsc,
            "name-desc" => Self::NameDesc,
            _ => Self::Unsorted,
        }
    }

    /// The tender picker sends a field name and a direction separately.
    pub fn from_parts(sort_by: &str, order: &str) -> Self {
        let descending = !order.trim().eq_ignore_ascii_case("asc");
        match (sort_by.trim().to_ascii_lowercase().as_str(), descending) {
            ("rating", true) => Self::RatingDesc,
            ("rating", false) => Self::RatingAsc,
            ("experience" | "exp", true) => Self::ExperienceDesc,
            ("experience" | "exp", false) => Self::ExperienceAsc,
            ("name", true) => Self::NameDesc,
            ("name", false) => Self::NameAsc,
            _ => Self::Unsorted,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unsorted => "",
            Self::RatingDesc => "rating-desc",
            Self::RatingAsc => "rating-asc",
            Self::ExperienceDesc => "exp-desc",
            Self::ExperienceAsc => "exp-asc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SortKey> for String {
    fn from(value: SortKey) -> Self {
        value.as_str().to_string()
    }
}

/// Comparator for `key`. Missing ratings compare as `0.0`; `Unsorted` reports
/// every pair as equal so a stable sort leaves the order untouched.
pub fn build_comparator(key: SortKey) -> impl Fn(&Contractor, &Contractor) -> Ordering {
    move |a: &Contractor, b: &Contractor| match key {
        SortKey::Unsorted => Ordering::Equal,
        SortKey::RatingDesc => compare_rating(b, a),
        SortKey::RatingAsc => compare_rating(a, b),
        SortKey::ExperienceDesc => b.experience.cmp(&a.experience),
        SortKey::ExperienceAsc => a.experience.cmp(&b.experience),
        SortKey::NameAsc => compare_names(&a.name, &b.name),
        SortKey::NameDesc => compare_names(&b.name, &a.name),
    }
}

/// Stable in-place sort; equal keys keep their relative order.
pub fn sort_contractors(contractors: &mut [Contractor], key: SortKey) {
    if key == SortKey::Unsorted {
        return;
    }
    contractors.sort_by(build_comparator(key));
}

fn compare_rating(a: &Contractor, b: &Contractor) -> Ordering {
    a.rating_or_zero()
        .partial_cmp(&b.rating_or_zero())
        .unwrap_or(Ordering::Equal)
}

/// Case- and accent-folded first so "anil", "Anil" and "Ánil" sit together,
/// then by raw text.
///
/// This is not locale collation: only precomposed Latin-1 letters are folded,
/// and other scripts compare by code point.
fn compare_names(a: &str, b: &str) -> Ordering {
    name_key(a).cmp(&name_key(b)).then_with(|| a.cmp(b))
}

fn name_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}
