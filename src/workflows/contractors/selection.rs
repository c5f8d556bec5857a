use super::domain::{Contractor, ContractorId};
use crate::config::ShortlistConfig;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Contractor ids currently ticked in a multi-pick widget.
///
/// Every operation returns a fresh selection; nothing mutates in place.
/// Candidate slices are expected to be the currently filtered list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ids: BTreeSet<ContractorId>,
}

/// Ranking key for the "top N" shortcut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKey {
    #[default]
    Rating,
    Experience,
}

/// Selection commands as sent by the picker buttons. Shortcut counts left
/// out fall back to the configured shortlist defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SelectionAction {
    Toggle {
        id: ContractorId,
    },
    SelectAll,
    SelectTopN {
        #[serde(default)]
        n: Option<usize>,
        #[serde(default)]
        key: SelectionKey,
    },
    SelectByThreshold {
        #[serde(default)]
        min_experience: Option<i64>,
    },
    Clear,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = ContractorId>,
    {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, id: ContractorId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ContractorId> + '_ {
        self.ids.iter().copied()
    }

    /// Flip membership of `id`, leaving every other id untouched.
    #[must_use]
    pub fn toggle(&self, id: ContractorId) -> Self {
        let mut ids = self.ids.clone();
        if !ids.remove(&id) {
            ids.insert(id);
        }
        Self { ids }
    }

    /// Exactly the visible candidates; hidden contractors are never picked.
    pub fn select_all(candidates: &[Contractor]) -> Self {
        Self::from_ids(candidates.iter().map(|contractor| contractor.id))
    }

    /// The first `n` candidates by `key`, descending; ties keep list order.
    pub fn select_top_n(candidates: &[Contractor], n: usize, key: SelectionKey) -> Self {
        let mut ranked: Vec<&Contractor> = candidates.iter().collect();
        ranked.sort_by(|a, b| match key {
            SelectionKey::Rating => b
                .rating_or_zero()
                .partial_cmp(&a.rating_or_zero())
                .unwrap_or(Ordering::Equal),
            SelectionKey::Experience => b.experience.cmp(&a.experience),
        });
        Self::from_ids(ranked.into_iter().take(n).map(|contractor| contractor.id))
    }

    /// Candidates with at least `min_experience` years.
    pub fn select_by_threshold(candidates: &[Contractor], min_experience: i64) -> Self {
        Self::from_ids(
            candidates
                .iter()
                .filter(|contractor| contractor.experience >= min_experience)
                .map(|contractor| contractor.id),
        )
    }

    pub fn clear() -> Self {
        Self::default()
    }

    /// Dispatch a picker command against the visible candidates.
    #[must_use]
    pub fn apply(
        &self,
        action: &SelectionAction,
        candidates: &[Contractor],
        shortlist: &ShortlistConfig,
    ) -> Self {
        match action {
            SelectionAction::Toggle { id } => self.toggle(*id),
            SelectionAction::SelectAll => Self::select_all(candidates),
            SelectionAction::SelectTopN { n, key } => {
                Self::select_top_n(candidates, n.unwrap_or(shortlist.top_n), *key)
            }
            SelectionAction::SelectByThreshold { min_experience } => Self::select_by_threshold(
                candidates,
                min_experience.unwrap_or(shortlist.min_experience),
            ),
            SelectionAction::Clear => Self::clear(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::contractors::filter::{apply_filter, FilterSpec};

    fn contractor(id: i64, rating: Option<f64>, experience: i64, state: &str) -> Contractor {
        Contractor {
            id: ContractorId(id),
            name: format!("Contractor {id}"),
            rating,
            experience,
            city: None,
            state: Some(state.to_string()),
            service_id: None,
        }
    }

    fn roster() -> Vec<Contractor> {
        vec![
            contractor(1, Some(4.5), 10, "Delhi"),
            contractor(2, None, 2, "Mumbai"),
            contractor(3, Some(3.0), 30, "Delhi"),
            contractor(4, Some(4.5), 1, "Delhi"),
            contractor(5, Some(2.0), 6, "Mumbai"),
        ]
    }

    fn ids(selection: &Selection) -> Vec<i64> {
        selection.ids().map(|id| id.0).collect()
    }

    #[test]
    fn toggle_twice_restores_the_previous_state() {
        let start = Selection::from_ids([ContractorId(1), ContractorId(3)]);
        let once = start.toggle(ContractorId(2));
        assert!(once.contains(ContractorId(2)));
        assert!(once.contains(ContractorId(1)));
        assert_eq!(once.toggle(ContractorId(2)), start);

        let removed = start.toggle(ContractorId(1));
        assert_eq!(ids(&removed), vec![3]);
        assert_eq!(removed.toggle(ContractorId(1)), start);
    }

    #[test]
    fn select_all_only_covers_the_filtered_list() {
        let spec = FilterSpec {
            region: Some("Delhi".to_string()),
            ..FilterSpec::default()
        };
        let visible = apply_filter(&roster(), &spec);
        let selection = Selection::select_all(&visible);
        assert_eq!(ids(&selection), vec![1, 3, 4]);
        assert!(!selection.contains(ContractorId(2)));
    }

    #[test]
    fn top_n_breaks_ties_by_list_order() {
        let selection = Selection::select_top_n(&roster(), 2, SelectionKey::Rating);
        assert_eq!(ids(&selection), vec![1, 4]);

        let reordered: Vec<Contractor> = roster().into_iter().rev().collect();
        let selection = Selection::select_top_n(&reordered, 1, SelectionKey::Rating);
        assert_eq!(ids(&selection), vec![4]);

        let by_experience = Selection::select_top_n(&roster(), 2, SelectionKey::Experience);
        assert_eq!(ids(&by_experience), vec![1, 3]);
    }

    #[test]
    fn top_n_larger_than_list_selects_everything() {
        let selection = Selection::select_top_n(&roster(), 50, SelectionKey::Rating);
        assert_eq!(selection.len(), 5);
    }

    #[test]
    fn threshold_selects_experienced_contractors() {
        let selection = Selection::select_by_threshold(&roster(), 3);
        assert_eq!(ids(&selection), vec![1, 3, 5]);
    }

    #[test]
    fn empty_candidates_degrade_to_empty_selection() {
        assert!(Selection::select_all(&[]).is_empty());
        assert!(Selection::select_top_n(&[], 5, SelectionKey::Rating).is_empty());
        assert!(Selection::select_by_threshold(&[], 0).is_empty());
        assert!(Selection::clear().is_empty());
    }

    #[test]
    fn apply_dispatches_actions() {
        let candidates = roster();
        let shortlist = ShortlistConfig::default();
        let start = Selection::new();

        let toggled = start.apply(
            &SelectionAction::Toggle { id: ContractorId(5) },
            &candidates,
            &shortlist,
        );
        assert_eq!(ids(&toggled), vec![5]);

        let all = toggled.apply(&SelectionAction::SelectAll, &candidates, &shortlist);
        assert_eq!(all.len(), 5);

        let cleared = all.apply(&SelectionAction::Clear, &candidates, &shortlist);
        assert!(cleared.is_empty());
    }

    #[test]
    fn shortcut_counts_default_to_the_shortlist_config() {
        let candidates = roster();
        let shortlist = ShortlistConfig {
            top_n: 2,
            min_experience: 10,
        };
        let top = Selection::new().apply(
            &SelectionAction::SelectTopN {
                n: None,
                key: SelectionKey::Rating,
            },
            &candidates,
            &shortlist,
        );
        assert_eq!(ids(&top), vec![1, 4]);

        let seasoned = Selection::new().apply(
            &SelectionAction::SelectByThreshold {
                min_experience: None,
            },
            &candidates,
            &shortlist,
        );
        assert_eq!(ids(&seasoned), vec![1, 3]);
    }

    #[test]
    fn actions_parse_from_tagged_json() {
        let action: SelectionAction =
            serde_json::from_str(r#"{"action": "select_top_n", "n": 3}"#).expect("parses");
        assert_eq!(
            action,
            SelectionAction::SelectTopN {
                n: Some(3),
                key: SelectionKey::Rating
            }
        );
    }
}
