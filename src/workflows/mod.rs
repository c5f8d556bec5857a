pub mod contractors;
pub mod tenders;
