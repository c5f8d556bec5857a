use crate::config::{AppConfig, ShortlistConfig};
use crate::error::{AppError, InputError};
use crate::infra::{read_json, BidSnapshot, ListPayload};
use crate::telemetry::{self, LogSink};
use crate::workflows::contractors::{
    ContractorId, ContractorListing, ContractorQuery, FilterSpec, RawContractor, Selection,
    SelectionKey, Service, ServiceCatalog, SortKey,
};
use crate::workflows::tenders::{
    aggregate_bids, cost_label, BidAggregation, BidTotal, LineAmount, RawBid, RawTender, Tender,
    TenderBoard, TenderTab,
};
use clap::Args;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ContractorsArgs {
    /// JSON export of contractors (bare array or paginated `results`)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Only keep contractors in this state or region
    #[arg(long)]
    pub(crate) region: Option<String>,
    /// Only keep contractors offering this service (name from the catalog)
    #[arg(long, requires = "services")]
    pub(crate) service: Option<String>,
    /// JSON export of the service catalog, used to resolve `--service`
    #[arg(long)]
    pub(crate) services: Option<PathBuf>,
    /// Minimum rating; unrated contractors count as 0
    #[arg(long)]
    pub(crate) min_rating: Option<f64>,
    /// Keep contractors with at most this many years of experience
    #[arg(long)]
    pub(crate) max_experience: Option<i64>,
    /// Keep contractors with at least this many years of experience
    #[arg(long)]
    pub(crate) min_experience: Option<i64>,
    /// rating-desc, rating-asc, exp-desc, exp-asc, name-asc or name-desc
    #[arg(long)]
    pub(crate) sort: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct BidsArgs {
    /// JSON bid export, optionally wrapped as `{ "tender": ..., "bids": [...] }`
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Contractor whose total is reported as the final contract cost
    #[arg(long)]
    pub(crate) selected: Option<i64>,
}

#[derive(Args, Debug)]
pub(crate) struct TendersArgs {
    /// JSON export of tenders (bare array or paginated `results`)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// all, active, bidding, in_progress or completed
    #[arg(long, default_value = "all")]
    pub(crate) tab: String,
}

pub(crate) fn run_contractors_report(args: ContractorsArgs) -> Result<(), AppError> {
    let config = init_cli()?;
    let ContractorsArgs {
        input,
        region,
        service,
        services,
        min_rating,
        max_experience,
        min_experience,
        sort,
    } = args;

    let raw = read_json::<ListPayload<RawContractor>>(&input)?.into_items();
    let catalog = match services {
        Some(path) => ServiceCatalog::new(read_json::<ListPayload<Service>>(&path)?.into_items()),
        None => ServiceCatalog::default(),
    };
    let query = ContractorQuery {
        filter: FilterSpec {
            region,
            service,
            min_rating,
            max_experience,
            min_experience,
            ..FilterSpec::default()
        },
        sort: sort.as_deref().map(SortKey::parse).unwrap_or_default(),
    }
    .resolve_service(&catalog);

    render_contractors(&raw, &query, &config.shortlist);
    Ok(())
}

pub(crate) fn run_bids_report(args: BidsArgs) -> Result<(), AppError> {
    init_cli()?;
    let (raw_tender, bids) = read_json::<BidSnapshot>(&args.input)?.into_parts();
    let tender = raw_tender.as_ref().map(Tender::from_raw);
    render_bids(tender.as_ref(), &bids, args.selected.map(ContractorId));
    Ok(())
}

pub(crate) fn run_tenders_report(args: TendersArgs) -> Result<(), AppError> {
    init_cli()?;
    let raw = read_json::<ListPayload<RawTender>>(&args.input)?.into_items();
    render_tenders(&raw, TenderTab::parse(&args.tab));
    Ok(())
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    let config = init_cli()?;

    println!("Local Konnect walkthrough (sample marketplace)");

    let contractors: Vec<RawContractor> = sample("contractors", sample_contractors())?;
    println!("\n== Contractor picker: Delhi, rated 3+, best first ==");
    let query = ContractorQuery {
        filter: FilterSpec {
            region: Some("Delhi".to_string()),
            min_rating: Some(3.0),
            ..FilterSpec::default()
        },
        sort: SortKey::RatingDesc,
    };
    render_contractors(&contractors, &query, &config.shortlist);

    let catalog: ServiceCatalog = sample("services", sample_services())?;
    println!("\n== Contractor picker: carpentry, most experienced first ==");
    let query = ContractorQuery {
        filter: FilterSpec {
            service: Some("Carpentry".to_string()),
            ..FilterSpec::default()
        },
        sort: SortKey::ExperienceDesc,
    }
    .resolve_service(&catalog);
    render_contractors(&contractors, &query, &config.shortlist);

    let snapshot: BidSnapshot = sample("bids", sample_bids())?;
    let (raw_tender, bids) = snapshot.into_parts();
    let tender = raw_tender.as_ref().map(Tender::from_raw);
    println!("\n== Bids on the kitchen remodel ==");
    render_bids(tender.as_ref(), &bids, None);

    let tenders: Vec<RawTender> = sample("tenders", sample_tenders())?;
    println!("\n== Tender board: active ==");
    render_tenders(&tenders, TenderTab::Active);

    Ok(())
}

fn init_cli() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;
    Ok(config)
}

fn sample<T>(name: &str, value: serde_json::Value) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value).map_err(|source| {
        AppError::from(InputError::Json {
            origin: format!("sample {name}"),
            source,
        })
    })
}

fn render_contractors(
    raw: &[RawContractor],
    query: &ContractorQuery,
    shortlist: &ShortlistConfig,
) {
    let listing = ContractorListing::build(raw, query);
    println!(
        "{} of {} contractors match{}",
        listing.matched,
        listing.total,
        match query.sort {
            SortKey::Unsorted => String::new(),
            key => format!(" (sorted {})", key.as_str()),
        }
    );
    if !listing.regions.is_empty() {
        println!("Regions on file: {}", listing.regions.join(", "));
    }

    for contractor in &listing.contractors {
        let rating = contractor
            .rating
            .map(|rating| format!("{rating:.1}"))
            .unwrap_or_else(|| "unrated".to_string());
        let name = if contractor.name.is_empty() {
            "Unnamed contractor"
        } else {
            contractor.name.as_str()
        };
        println!(
            "- #{} {} | rating {} | {} yrs | {}",
            contractor.id.0,
            name,
            rating,
            contractor.experience,
            contractor.state.as_deref().unwrap_or("location unknown")
        );
    }

    let top = Selection::select_top_n(&listing.contractors, shortlist.top_n, SelectionKey::Rating);
    let experienced =
        Selection::select_by_threshold(&listing.contractors, shortlist.min_experience);
    println!(
        "Quick picks: top {} rated -> {} | {}+ yrs -> {}",
        shortlist.top_n,
        format_ids(&top),
        shortlist.min_experience,
        format_ids(&experienced)
    );
}

fn render_bids(tender: Option<&Tender>, bids: &[RawBid], selected: Option<ContractorId>) {
    let aggregation = aggregate_bids(bids);

    if let Some(tender) = tender {
        println!(
            "Tender #{} {} [{}] | {} critical requirement(s)",
            tender.id.0,
            tender.title,
            tender.status.label(),
            tender.critical_requirement_count()
        );
    }

    if aggregation.is_empty() {
        println!("No bids received yet");
    }
    for aggregate in aggregation.ranked() {
        let total = match &aggregate.total {
            BidTotal::Priced { total_cost } => format!("total {total_cost:.2}"),
            BidTotal::Invalid { invalid_lines } => {
                format!("total unavailable ({invalid_lines} unpriceable line(s))")
            }
        };
        println!(
            "- #{} {} | {} bid(s) | {}",
            aggregate.contractor_id.0,
            aggregate.contractor.display_name(),
            aggregate.bids.len(),
            total
        );
        for line in &aggregate.bids {
            match &line.amount {
                LineAmount::Priced {
                    unit_amount,
                    subtotal,
                } => println!(
                    "    {:.2} x {} {} = {:.2}",
                    unit_amount,
                    line.quantity.unwrap_or(1),
                    line.units.as_deref().unwrap_or("unit(s)"),
                    subtotal
                ),
                LineAmount::Invalid { error } => println!("    {error}"),
            }
        }
    }

    if !aggregation.unattributed.is_empty() {
        println!(
            "{} bid(s) without contractor details were kept aside",
            aggregation.unattributed.len()
        );
    }

    render_bid_footer(&aggregation, tender, selected);
}

fn render_bid_footer(
    aggregation: &BidAggregation,
    tender: Option<&Tender>,
    selected: Option<ContractorId>,
) {
    if let Some(lowest) = aggregation.lowest_valid() {
        println!(
            "Lowest valid bid: #{} {} ({})",
            lowest.contractor_id.0,
            lowest.contractor.display_name(),
            cost_label(lowest.total.amount())
        );
    }

    let selected = selected.or_else(|| tender.and_then(|tender| tender.selected_contractor_id));
    if let Some(id) = selected {
        println!(
            "Final contract cost for #{}: {}",
            id.0,
            cost_label(aggregation.total_for(id))
        );
    } else if tender.is_some_and(Tender::can_select_contractor) {
        println!("Awaiting contractor selection");
    }
}

fn render_tenders(raw: &[RawTender], tab: TenderTab) {
    let board = TenderBoard::build(raw, tab);
    let counts = board.tab_counts;
    println!(
        "Tabs: all {} | active {} | bidding {} | in progress {} | completed {}",
        counts.all, counts.active, counts.bidding, counts.in_progress, counts.completed
    );
    println!(
        "Open for bids {} | receiving bids {} | in progress {} | completed {}",
        board.stats.published, board.stats.bidding, board.stats.in_progress, board.stats.completed
    );

    if board.tenders.is_empty() {
        println!("No tenders on this tab");
    }
    for card in &board.tenders {
        let budget = card
            .budget
            .map(|budget| format!("budget {budget:.2}"))
            .unwrap_or_else(|| "no budget".to_string());
        println!(
            "- #{} {} [{}] | {} | {} bid(s) | {} critical{}",
            card.id.0,
            card.title,
            card.label,
            budget,
            card.bid_count,
            card.critical_requirements,
            if card.can_select_contractor {
                " | contractor can be selected"
            } else {
                ""
            }
        );
    }
}

fn format_ids(selection: &Selection) -> String {
    if selection.is_empty() {
        return "none".to_string();
    }
    selection
        .ids()
        .map(|id| format!("#{}", id.0))
        .collect::<Vec<_>>()
        .join(", ")
}

fn sample_contractors() -> serde_json::Value {
    json!([
        { "id": 1, "user": { "first_name": "Asha", "last_name": "Rao" }, "rating": 4.5, "experience": 10, "state": "Delhi", "service": 1 },
        { "id": 2, "first_name": "Vikram", "last_name": "Singh", "rating": null, "experience": 2, "state": "Mumbai", "service": { "id": 2, "name": "Plumbing" } },
        { "id": 3, "user": { "first_name": "Kiran", "last_name": "Das" }, "rating": "3.0", "experience": 30, "state": "Delhi", "service": 1 },
        { "id": 4, "first_name": "Meera", "last_name": "Iyer", "rating": "4.8", "experience": "6", "region": "Delhi", "service": 2 }
    ])
}

fn sample_services() -> serde_json::Value {
    json!([
        { "id": 1, "name": "Carpentry", "description": "Cabinets, doors and fittings" },
        { "id": 2, "name": "Plumbing" }
    ])
}

fn sample_bids() -> serde_json::Value {
    json!({
        "tender": {
            "id": 21,
            "title": "Kitchen remodel",
            "status": "published",
            "budget": "125000.00",
            "tender_requirements": [
                { "id": 10, "description": "Cabinets", "quantity": 3, "units": "pcs", "is_critical": true },
                { "id": 11, "description": "Tiling", "quantity": 2, "units": "rooms" }
            ]
        },
        "bids": [
            { "id": 1, "contractor": { "id": 1, "user": { "first_name": "Asha", "last_name": "Rao" } }, "tender_requirement": { "id": 10, "quantity": 3, "units": "pcs" }, "bid_amount": "100.00" },
            { "id": 2, "contractor": 1, "tender_requirement": { "id": 11, "quantity": 2, "units": "rooms" }, "bid_amount": 50 },
            { "id": 3, "contractor": 4, "contractor_details": { "id": 4, "first_name": "Meera", "last_name": "Iyer" }, "tender_requirement": { "id": 10, "quantity": 3, "units": "pcs" }, "bid_amount": 90 },
            { "id": 4, "contractor": 4, "tender_requirement": { "id": 11, "quantity": 2, "units": "rooms" }, "bid_amount": "quote on visit" }
        ]
    })
}

fn sample_tenders() -> serde_json::Value {
    json!([
        { "id": 21, "title": "Kitchen remodel", "status": "published", "bid_count": 4, "budget": 125000 },
        { "id": 22, "title": "Roof repair", "status": "published", "bid_count": 0 },
        { "id": 23, "title": "Garden landscaping", "status": "bidding" },
        { "id": 24, "title": "Bathroom refit", "status": "in_progress", "selected_contractor": 3 },
        { "id": 25, "title": "Fence painting", "status": "completed", "selected_contractor": 1 }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::contractors::normalize_all;

    #[test]
    fn sample_marketplace_parses() {
        let contractors: Vec<RawContractor> =
            sample("contractors", sample_contractors()).expect("contractors parse");
        assert_eq!(normalize_all(&contractors)[3].state.as_deref(), Some("Delhi"));

        let catalog: ServiceCatalog =
            sample("services", sample_services()).expect("services parse");
        let query = ContractorQuery {
            filter: FilterSpec {
                service: Some("Carpentry".to_string()),
                ..FilterSpec::default()
            },
            sort: SortKey::ExperienceDesc,
        }
        .resolve_service(&catalog);
        let listing = ContractorListing::build(&contractors, &query);
        let ids: Vec<i64> = listing.contractors.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![3, 1]);

        let (tender, bids) = sample::<BidSnapshot>("bids", sample_bids())
            .expect("bids parse")
            .into_parts();
        assert!(tender.is_some());
        let aggregation = aggregate_bids(&bids);
        assert_eq!(aggregation.total_for(ContractorId(1)), Some(400.0));
        assert_eq!(aggregation.total_for(ContractorId(4)), None);

        let tenders: Vec<RawTender> = sample("tenders", sample_tenders()).expect("tenders parse");
        assert_eq!(TenderBoard::build(&tenders, TenderTab::Active).tenders.len(), 4);
    }
}
