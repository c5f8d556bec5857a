use super::domain::{RawTender, Tender, TenderId, TenderStatus};
use crate::workflows::contractors::ServiceId;
use serde::{Deserialize, Serialize};

/// Phase shown on a tender card.
///
/// The backend leaves a tender `published` while bids trickle in and
/// `bidding` until a contractor is chosen, so the board refines both using
/// the bid count and the selection.
pub fn tender_phase(tender: &Tender) -> TenderStatus {
    match tender.status {
        TenderStatus::Published if tender.bid_count.is_some_and(|count| count > 0) => {
            TenderStatus::Bidding
        }
        TenderStatus::Bidding if !tender.has_selected_contractor() => {
            TenderStatus::ContractorSelection
        }
        status => status,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderTab {
    #[default]
    All,
    Active,
    Bidding,
    InProgress,
    Completed,
}

impl TenderTab {
    pub const ALL: [TenderTab; 5] = [
        TenderTab::All,
        TenderTab::Active,
        TenderTab::Bidding,
        TenderTab::InProgress,
        TenderTab::Completed,
    ];

    /// Unknown tab names fall back to `All`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "bidding" => Self::Bidding,
            "in_progress" | "in-progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::All,
        }
    }

    pub fn includes(self, phase: TenderStatus) -> bool {
        use TenderStatus::*;
        match self {
            TenderTab::All => true,
            TenderTab::Active => {
                matches!(phase, Published | Bidding | ContractorSelection | InProgress)
            }
            TenderTab::Bidding => matches!(phase, Published | Bidding | ContractorSelection),
            TenderTab::InProgress => phase == InProgress,
            TenderTab::Completed => matches!(phase, Completed | Cancelled),
        }
    }
}

/// Header counters on the tender list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TenderStats {
    pub published: usize,
    pub bidding: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl TenderStats {
    pub fn from_phases<I>(phases: I) -> Self
    where
        I: IntoIterator<Item = TenderStatus>,
    {
        phases
            .into_iter()
            .fold(Self::default(), |mut stats, phase| {
                match phase {
                    TenderStatus::Published => stats.published += 1,
                    TenderStatus::Bidding => stats.bidding += 1,
                    TenderStatus::InProgress => stats.in_progress += 1,
                    TenderStatus::Completed => stats.completed += 1,
                    _ => {}
                }
                stats
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TabCounts {
    pub all: usize,
    pub active: usize,
    pub bidding: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl TabCounts {
    fn count(&mut self, tab: TenderTab) -> &mut usize {
        match tab {
            TenderTab::All => &mut self.all,
            TenderTab::Active => &mut self.active,
            TenderTab::Bidding => &mut self.bidding,
            TenderTab::InProgress => &mut self.in_progress,
            TenderTab::Completed => &mut self.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenderCard {
    pub id: TenderId,
    pub title: String,
    pub status: TenderStatus,
    pub phase: TenderStatus,
    pub label: &'static str,
    pub service_id: Option<ServiceId>,
    pub budget: Option<f64>,
    pub bid_count: i64,
    pub critical_requirements: usize,
    pub can_select_contractor: bool,
}

impl From<&Tender> for TenderCard {
    fn from(tender: &Tender) -> Self {
        let phase = tender_phase(tender);
        Self {
            id: tender.id,
            title: tender.title.clone(),
            status: tender.status,
            phase,
            label: phase.label(),
            service_id: tender.service_id,
            budget: tender.budget,
            bid_count: tender.bid_count.unwrap_or(0),
            critical_requirements: tender.critical_requirement_count(),
            can_select_contractor: tender.can_select_contractor(),
        }
    }
}

/// The customer's tender list for one tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenderBoard {
    pub tab: TenderTab,
    pub stats: TenderStats,
    pub tab_counts: TabCounts,
    pub tenders: Vec<TenderCard>,
}

impl TenderBoard {
    pub fn build(raw: &[RawTender], tab: TenderTab) -> Self {
        let tenders: Vec<Tender> = raw.iter().map(Tender::from_raw).collect();
        Self::from_tenders(&tenders, tab)
    }

    pub fn from_tenders(tenders: &[Tender], tab: TenderTab) -> Self {
        let cards: Vec<TenderCard> = tenders.iter().map(TenderCard::from).collect();

        let mut tab_counts = TabCounts::default();
        for card in &cards {
            for candidate in TenderTab::ALL {
                if candidate.includes(card.phase) {
                    *tab_counts.count(candidate) += 1;
                }
            }
        }

        Self {
            tab,
            stats: TenderStats::from_phases(cards.iter().map(|card| card.phase)),
            tab_counts,
            tenders: cards
                .into_iter()
                .filter(|card| tab.includes(card.phase))
                .collect(),
        }
    }
}
