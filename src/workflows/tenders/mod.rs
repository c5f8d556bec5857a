//! Tender views: normalized tenders, per-contractor bid totals and the tender board.

pub mod bids;
pub mod board;
pub mod domain;

pub use bids::{
    aggregate_bids, cost_label, BidAggregate, BidAggregation, BidAmountError, BidLine, BidSummary,
    BidTotal, LineAmount,
};
pub use board::{tender_phase, TabCounts, TenderBoard, TenderCard, TenderStats, TenderTab};
pub use domain::{
    RawBid, RawRequirement, RawRequirementField, RawTender, Requirement, RequirementId, Tender,
    TenderId, TenderStatus,
};
