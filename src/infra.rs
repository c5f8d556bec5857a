use crate::config::ShortlistConfig;
use crate::error::InputError;
use crate::workflows::tenders::{RawBid, RawTender};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) shortlist: ShortlistConfig,
}

/// List endpoints answer either with a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListPayload<T> {
    Bare(Vec<T>),
    Page { results: Vec<T> },
}

impl<T> ListPayload<T> {
    pub(crate) fn into_items(self) -> Vec<T> {
        match self {
            ListPayload::Bare(items) | ListPayload::Page { results: items } => items,
        }
    }
}

/// Bid export: the bare bid list, or the bids next to their tender.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum BidSnapshot {
    Bare(Vec<RawBid>),
    WithTender {
        #[serde(default)]
        tender: Option<RawTender>,
        bids: Vec<RawBid>,
    },
}

impl BidSnapshot {
    pub(crate) fn into_parts(self) -> (Option<RawTender>, Vec<RawBid>) {
        match self {
            BidSnapshot::Bare(bids) => (None, bids),
            BidSnapshot::WithTender { tender, bids } => (tender, bids),
        }
    }
}

pub(crate) fn read_json<T>(path: &Path) -> Result<T, InputError>
where
    T: DeserializeOwned,
{
    let raw = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&raw, &path.display().to_string())
}

pub(crate) fn parse_json<T>(raw: &str, origin: &str) -> Result<T, InputError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(raw).map_err(|source| InputError::Json {
        origin: origin.to_string(),
        source,
    })
}
