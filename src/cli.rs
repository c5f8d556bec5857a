use crate::demo::{
    run_bids_report, run_contractors_report, run_demo, run_tenders_report, BidsArgs,
    ContractorsArgs, TendersArgs,
};
use crate::error::AppError;
use crate::server;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Local Konnect",
    about = "Contractor shortlists, bid totals and tender boards for the Local Konnect marketplace",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Filter and sort a contractor export
    Contractors(ContractorsArgs),
    /// Total a tender's bids per contractor
    Bids(BidsArgs),
    /// Show the tender board for one tab
    Tenders(TendersArgs),
    /// Walk through every view using a built-in sample marketplace
    Demo,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Contractors(args) => run_contractors_report(args),
        Command::Bids(args) => run_bids_report(args),
        Command::Tenders(args) => run_tenders_report(args),
        Command::Demo => run_demo(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn contractor_flags_parse() {
        let cli = Cli::try_parse_from([
            "konnect",
            "contractors",
            "--input",
            "roster.json",
            "--region",
            "Delhi",
            "--min-rating",
            "3.5",
            "--sort",
            "rating-desc",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Contractors(args)) => {
                assert_eq!(args.region.as_deref(), Some("Delhi"));
                assert_eq!(args.min_rating, Some(3.5));
                assert_eq!(args.sort.as_deref(), Some("rating-desc"));
            }
            other => panic!("expected contractors command, got {other:?}"),
        }
    }

    #[test]
    fn service_flag_needs_a_catalog() {
        let missing = Cli::try_parse_from([
            "konnect",
            "contractors",
            "--input",
            "roster.json",
            "--service",
            "Plumbing",
        ]);
        assert!(missing.is_err());

        let cli = Cli::try_parse_from([
            "konnect",
            "contractors",
            "--input",
            "roster.json",
            "--service",
            "Plumbing",
            "--services",
            "services.json",
        ])
        .expect("arguments parse");
        match cli.command {
            Some(Command::Contractors(args)) => {
                assert_eq!(args.service.as_deref(), Some("Plumbing"));
                assert!(args.services.is_some());
            }
            other => panic!("expected contractors command, got {other:?}"),
        }
    }

    #[test]
    fn missing_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["konnect"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
