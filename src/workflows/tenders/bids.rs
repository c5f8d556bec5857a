use super::domain::{RawBid, RequirementId, Tender};
use crate::workflows::contractors::normalizer::integer_from_value;
use crate::workflows::contractors::{ContractorId, ContractorRef};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a bid row could not be priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BidAmountError {
    #[error("bid amount is missing")]
    Missing,
    #[error("bid amount `{raw}` is not a number")]
    NotNumeric { raw: String },
    #[error("requirement quantity `{raw}` is not a number")]
    BadQuantity { raw: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineAmount {
    Priced { unit_amount: f64, subtotal: f64 },
    Invalid { error: BidAmountError },
}

impl LineAmount {
    pub fn subtotal(&self) -> Option<f64> {
        match self {
            LineAmount::Priced { subtotal, .. } => Some(*subtotal),
            LineAmount::Invalid { .. } => None,
        }
    }
}

/// One itemized bid row, kept for the per-requirement breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidLine {
    pub bid_id: Option<i64>,
    pub requirement_id: Option<RequirementId>,
    /// `None` when the requirement carried a quantity that could not be read.
    pub quantity: Option<i64>,
    pub units: Option<String>,
    pub amount: LineAmount,
    pub proposal: Option<String>,
    pub attachment_count: usize,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A contractor's total. Any unpriceable line poisons the whole total rather
/// than being counted as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BidTotal {
    Priced { total_cost: f64 },
    Invalid { invalid_lines: usize },
}

impl BidTotal {
    pub fn amount(&self) -> Option<f64> {
        match self {
            BidTotal::Priced { total_cost } => Some(*total_cost),
            BidTotal::Invalid { .. } => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, BidTotal::Priced { .. })
    }
}

/// Every bid one contractor placed on a tender, with the derived total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidAggregate {
    pub contractor_id: ContractorId,
    pub contractor: ContractorRef,
    pub bids: Vec<BidLine>,
    pub total: BidTotal,
}

impl BidAggregate {
    fn new(contractor_id: ContractorId, contractor: ContractorRef) -> Self {
        Self {
            contractor_id,
            contractor,
            bids: Vec::new(),
            total: BidTotal::Priced { total_cost: 0.0 },
        }
    }

    fn recompute_total(&mut self) {
        let invalid_lines = self
            .bids
            .iter()
            .filter(|line| line.amount.subtotal().is_none())
            .count();
        self.total = if invalid_lines > 0 {
            BidTotal::Invalid { invalid_lines }
        } else {
            BidTotal::Priced {
                total_cost: self.bids.iter().filter_map(|line| line.amount.subtotal()).sum(),
            }
        };
    }
}

/// Bids grouped by contractor id. Rows without any contractor id are kept in
/// `unattributed` so nothing silently disappears.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BidAggregation {
    pub contractors: BTreeMap<ContractorId, BidAggregate>,
    pub unattributed: Vec<BidLine>,
}

impl BidAggregation {
    pub fn get(&self, id: ContractorId) -> Option<&BidAggregate> {
        self.contractors.get(&id)
    }

    pub fn len(&self) -> usize {
        self.contractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contractors.is_empty()
    }

    pub fn total_for(&self, id: ContractorId) -> Option<f64> {
        self.get(id).and_then(|aggregate| aggregate.total.amount())
    }

    /// Cheapest priced total first; invalid totals go last. Ties keep
    /// contractor id order.
    pub fn ranked(&self) -> Vec<&BidAggregate> {
        let mut ranked: Vec<&BidAggregate> = self.contractors.values().collect();
        ranked.sort_by(|a, b| match (a.total.amount(), b.total.amount()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        ranked
    }

    pub fn lowest_valid(&self) -> Option<&BidAggregate> {
        self.ranked()
            .into_iter()
            .find(|aggregate| aggregate.total.is_valid())
    }

    /// Final contract cost for the contractor the tender settled on.
    pub fn selected_total(&self, tender: &Tender) -> Option<f64> {
        tender
            .selected_contractor_id
            .and_then(|id| self.total_for(id))
    }
}

/// Group per-requirement bid rows by contractor and total them as
/// `Σ unit amount × requirement quantity`.
///
/// A missing, zero or negative quantity counts as one. Amounts and quantities
/// may be numbers or numeric strings; anything else marks the line invalid and
/// is logged.
pub fn aggregate_bids(bids: &[RawBid]) -> BidAggregation {
    let mut aggregation = BidAggregation::default();

    for bid in bids {
        let line = bid_line(bid);
        let Some(contractor_id) = bid.contractor_id() else {
            debug!(bid_id = ?bid.id, "bid has no contractor reference");
            aggregation.unattributed.push(line);
            continue;
        };

        if let LineAmount::Invalid { error } = &line.amount {
            warn!(
                contractor_id = contractor_id.0,
                bid_id = ?bid.id,
                %error,
                "bid amount could not be priced"
            );
        }

        let contractor = bid.contractor_ref();
        let aggregate = aggregation
            .contractors
            .entry(contractor_id)
            .or_insert_with(|| BidAggregate::new(contractor_id, ContractorRef::Unavailable));
        if !aggregate.contractor.is_available() && contractor.is_available() {
            aggregate.contractor = contractor;
        }
        aggregate.bids.push(line);
    }

    for aggregate in aggregation.contractors.values_mut() {
        aggregate.recompute_total();
    }

    debug!(
        rows = bids.len(),
        contractors = aggregation.len(),
        unattributed = aggregation.unattributed.len(),
        "bids aggregated"
    );
    aggregation
}

/// Money as rendered in the tender header; `N/A` when there is nothing to show.
pub fn cost_label(amount: Option<f64>) -> String {
    match amount {
        Some(amount) => format!("{amount:.2}"),
        None => "N/A".to_string(),
    }
}

/// What the bids tab renders for one tender.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidSummary {
    pub ranked: Vec<BidAggregate>,
    pub unattributed: Vec<BidLine>,
    pub lowest_valid: Option<ContractorId>,
    pub selected_contractor: Option<ContractorId>,
    pub final_contract_cost: String,
    pub can_select_contractor: bool,
}

impl BidSummary {
    pub fn build(tender: Option<&Tender>, bids: &[RawBid]) -> Self {
        let aggregation = aggregate_bids(bids);
        let selected_total = tender.and_then(|tender| aggregation.selected_total(tender));
        Self {
            ranked: aggregation.ranked().into_iter().cloned().collect(),
            lowest_valid: aggregation
                .lowest_valid()
                .map(|aggregate| aggregate.contractor_id),
            selected_contractor: tender.and_then(|tender| tender.selected_contractor_id),
            final_contract_cost: cost_label(selected_total),
            can_select_contractor: tender
                .map(Tender::can_select_contractor)
                .unwrap_or(false),
            unattributed: aggregation.unattributed,
        }
    }
}

fn bid_line(bid: &RawBid) -> BidLine {
    let requirement = bid.tender_requirement.as_ref();
    let quantity = parse_quantity(requirement.and_then(|requirement| requirement.quantity()));
    let priced = parse_amount(bid.bid_amount.as_ref())
        .and_then(|unit_amount| quantity.clone().map(|quantity| (unit_amount, quantity)));
    let amount = match priced {
        Ok((unit_amount, quantity)) => LineAmount::Priced {
            unit_amount,
            subtotal: unit_amount * quantity as f64,
        },
        Err(error) => LineAmount::Invalid { error },
    };

    BidLine {
        bid_id: bid.id,
        requirement_id: requirement
            .and_then(|requirement| requirement.id())
            .map(RequirementId),
        quantity: quantity.ok(),
        units: requirement
            .and_then(|requirement| requirement.units())
            .map(str::to_string),
        amount,
        proposal: bid.proposal.clone(),
        attachment_count: bid.attachments.len(),
        submitted_at: bid.timestamp,
    }
}

// Absent, zero and negative quantities all count as one.
fn parse_quantity(value: Option<&Value>) -> Result<i64, BidAmountError> {
    match value {
        None | Some(Value::Null) => Ok(1),
        Some(value) => match integer_from_value(value) {
            Some(quantity) if quantity > 0 => Ok(quantity),
            Some(_) => Ok(1),
            None => Err(BidAmountError::BadQuantity {
                raw: match value {
                    Value::String(raw) => raw.clone(),
                    other => other.to_string(),
                },
            }),
        },
    }
}

fn parse_amount(value: Option<&Value>) -> Result<f64, BidAmountError> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(BidAmountError::Missing),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    parsed
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| BidAmountError::NotNumeric {
            raw: match value {
                Some(Value::String(raw)) => raw.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            },
        })
}
