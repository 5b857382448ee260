// Entry point and high-level CLI flow.
//
// - `calendar` and `period` only consult the fiscal calendar.
// - `sales`, `period-sales` and `finance` sign a token, fetch the reports,
//   keep the raw bytes in the download directory, and print a summary.
mod cli;
mod logging;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;
use tracing::info;

use appstore_report::client::AppStoreClient;
use appstore_report::config::AppConfig;
use appstore_report::output::{preview_table_rows, write_summary};
use appstore_report::service::{ReportOutcome, ReportService};
use appstore_report::sink::DirSink;
use appstore_report::types::{PeriodRow, SummaryPreviewRow, SummaryRow};
use appstore_report::util::{format_date, format_int, pst_today};
use appstore_report::PeriodCache;

use crate::cli::{Cli, Command};

type Service = ReportService<AppStoreClient, DirSink>;

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config;
    match cli.command {
        Command::Calendar(args) => handle_calendar(args.year),
        Command::Period(args) => handle_period(args.date),
        Command::Sales(args) => {
            let svc = build_service(config.as_deref())?;
            // yesterday in the vendor zone is the latest complete daily report
            let date = args.date.unwrap_or_else(|| pst_today() - Duration::days(1));
            let outcome = svc
                .daily_sales(date)
                .with_context(|| format!("daily sales for {}", format_date(date)))?;
            handle_outcome(&svc, &outcome, "Daily Sales Summary", args.rows)
        }
        Command::PeriodSales(args) => {
            let svc = build_service(config.as_deref())?;
            let outcome = svc
                .period_sales(args.year, args.period)
                .with_context(|| format!("sales for FY{} P{}", args.year, args.period))?;
            handle_outcome(&svc, &outcome, "Fiscal Period Sales Summary", args.rows)
        }
        Command::Finance(args) => {
            let svc = build_service(config.as_deref())?;
            let outcome = svc
                .finance(args.year, args.period)
                .with_context(|| format!("finance for FY{} P{}", args.year, args.period))?;
            handle_outcome(&svc, &outcome, "Fiscal Period Finance Summary", args.rows)
        }
    }
}

/// Load configuration, sign a token and wire the HTTP client to the
/// download directory.
fn build_service(config_path: Option<&Path>) -> Result<Service> {
    let config = AppConfig::load(config_path).context("failed to load configuration")?;
    let creds = &config.credentials;

    let token = creds
        .signer(config.api.token_ttl_secs)?
        .sign()
        .context("failed to sign API token")?;
    let client = AppStoreClient::with_base_url(
        creds.vendor_number.as_str(),
        token,
        config.api.timeout(),
        config.api.base_url.as_str(),
    )?;
    info!(vendor = %creds.vendor_number, dir = %config.download.dir.display(), "report client ready");

    let sink = DirSink::new(config.download.dir.clone());
    Ok(ReportService::new(client, sink, creds.vendor_number.as_str()))
}

fn handle_calendar(year: i32) -> Result<()> {
    let cache = PeriodCache::new();
    let fy = cache.fiscal_year(year)?;
    let rows: Vec<PeriodRow> = fy.periods().iter().map(PeriodRow::from).collect();

    println!("Fiscal Year {} ({} weeks)\n", fy.year(), fy.total_weeks());
    preview_table_rows(&rows, rows.len());
    Ok(())
}

fn handle_period(date: NaiveDate) -> Result<()> {
    let cache = PeriodCache::new();
    match cache.period_containing(date)? {
        Some(period) => println!("{period}\n"),
        None => println!("{} falls between fiscal years.\n", format_date(date)),
    }
    Ok(())
}

/// Print a preview of the aggregated report and save the summary files next
/// to the raw download.
fn handle_outcome(svc: &Service, outcome: &ReportOutcome, title: &str, max_rows: usize) -> Result<()> {
    let rows = SummaryRow::from_result(&outcome.result);
    let preview: Vec<SummaryPreviewRow> = rows.iter().map(SummaryPreviewRow::from).collect();

    println!("{title}");
    println!("({})\n", outcome.name);
    preview_table_rows(&preview, max_rows);

    let total = outcome.result.grand_total();
    println!(
        "{} keys, sales {}, refund {}, net {}\n",
        format_int(outcome.result.len()),
        format_int(total.sales),
        format_int(total.refund),
        format_int(total.net())
    );

    write_summary(svc.sink(), &outcome.name, outcome.kind.as_str(), &outcome.result)?;
    println!("(Raw report and summary saved under {})\n", svc.sink().dir().display());
    Ok(())
}
