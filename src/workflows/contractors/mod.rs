//! Contractor listing pipeline: normalize raw API records, filter, sort, and
//! track the multi-select shortlist used by the tender picker.

pub mod domain;
pub mod filter;
pub mod listing;
pub(crate) mod normalizer;
pub mod selection;
pub mod sort;

pub use domain::{
    Contractor, ContractorId, ContractorRef, RawContractor, RawContractorField, RawUser, Service,
    ServiceCatalog, ServiceId,
};
pub use filter::{apply_filter, build_filter, FilterSpec};
pub use listing::{list_contractors, region_options, ContractorListing, ContractorQuery};
pub use normalizer::{normalize, normalize_all, normalize_field};
pub use selection::{Selection, SelectionAction, SelectionKey};
pub use sort::{build_comparator, sort_contractors, SortKey};
