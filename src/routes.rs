use crate::error::{AppError, InputError};
use crate::infra::AppState;
use crate::workflows::contractors::{
    list_contractors, normalize_all, ContractorListing, ContractorQuery, RawContractor, Selection,
    SelectionAction, ServiceCatalog,
};
use crate::workflows::tenders::{BidSummary, RawBid, RawTender, Tender, TenderBoard, TenderTab};
use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct ContractorSearchRequest {
    pub(crate) contractors: Vec<RawContractor>,
    #[serde(default)]
    pub(crate) query: ContractorQuery,
    #[serde(default)]
    pub(crate) services: ServiceCatalog,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectionRequest {
    pub(crate) contractors: Vec<RawContractor>,
    #[serde(default)]
    pub(crate) query: ContractorQuery,
    #[serde(default)]
    pub(crate) services: ServiceCatalog,
    #[serde(default)]
    pub(crate) selection: Selection,
    pub(crate) action: SelectionAction,
}

#[derive(Debug, Serialize)]
pub(crate) struct SelectionResponse {
    pub(crate) visible: usize,
    pub(crate) count: usize,
    pub(crate) selection: Selection,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BidSummaryRequest {
    #[serde(default)]
    pub(crate) tender: Option<RawTender>,
    pub(crate) bids: Vec<RawBid>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenderBoardRequest {
    pub(crate) tenders: Vec<RawTender>,
    #[serde(default)]
    pub(crate) tab: TenderTab,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/contractors/search", post(contractor_search_endpoint))
        .route("/api/v1/contractors/selection", post(selection_endpoint))
        .route("/api/v1/tenders/bids/summary", post(bid_summary_endpoint))
        .route("/api/v1/tenders/board", post(tender_board_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn contractor_search_endpoint(
    payload: Result<Json<ContractorSearchRequest>, JsonRejection>,
) -> Result<Json<ContractorListing>, AppError> {
    let ContractorSearchRequest {
        contractors,
        query,
        services,
    } = request_body(payload)?;

    let query = query.resolve_service(&services);
    Ok(Json(ContractorListing::build(&contractors, &query)))
}

pub(crate) async fn selection_endpoint(
    Extension(state): Extension<AppState>,
    payload: Result<Json<SelectionRequest>, JsonRejection>,
) -> Result<Json<SelectionResponse>, AppError> {
    let SelectionRequest {
        contractors,
        query,
        services,
        selection,
        action,
    } = request_body(payload)?;

    let roster = normalize_all(&contractors);
    let visible = list_contractors(&roster, &query.resolve_service(&services));
    let selection = selection.apply(&action, &visible, &state.shortlist);

    Ok(Json(SelectionResponse {
        visible: visible.len(),
        count: selection.len(),
        selection,
    }))
}

pub(crate) async fn bid_summary_endpoint(
    payload: Result<Json<BidSummaryRequest>, JsonRejection>,
) -> Result<Json<BidSummary>, AppError> {
    let BidSummaryRequest { tender, bids } = request_body(payload)?;
    let tender = tender.as_ref().map(Tender::from_raw);
    Ok(Json(BidSummary::build(tender.as_ref(), &bids)))
}

pub(crate) async fn tender_board_endpoint(
    payload: Result<Json<TenderBoardRequest>, JsonRejection>,
) -> Result<Json<TenderBoard>, AppError> {
    let TenderBoardRequest { tenders, tab } = request_body(payload)?;
    Ok(Json(TenderBoard::build(&tenders, tab)))
}

fn request_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        AppError::from(InputError::Body {
            message: rejection.body_text(),
        })
    })
}
