use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use appstore_report::util::parse_date_safe;

/// Vendor fiscal calendar and sales/finance report summaries.
#[derive(Parser)]
#[command(
    name = "appstore-report",
    version,
    about = "Vendor fiscal calendar and sales/finance report summaries"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file [default: appstore.toml, optional].
    #[arg(short, long, global = true, env = "APPSTORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the twelve periods of a fiscal year.
    Calendar(CalendarArgs),
    /// Print the fiscal period containing a date.
    Period(PeriodArgs),
    /// Summarise the daily sales report for one day.
    Sales(SalesArgs),
    /// Summarise sales over a whole fiscal period.
    PeriodSales(FiscalArgs),
    /// Summarise the financial report of a fiscal period.
    Finance(FiscalArgs),
}

#[derive(clap::Args)]
pub struct CalendarArgs {
    /// Fiscal year, e.g. 2019.
    pub year: i32,
}

#[derive(clap::Args)]
pub struct PeriodArgs {
    /// Calendar date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub date: NaiveDate,
}

#[derive(clap::Args)]
pub struct SalesArgs {
    /// Report day in the vendor time zone (YYYY-MM-DD) [default: yesterday].
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Rows shown in the console preview.
    #[arg(long, default_value_t = 20)]
    pub rows: usize,
}

#[derive(clap::Args)]
pub struct FiscalArgs {
    /// Fiscal year, e.g. 2019.
    pub year: i32,

    /// Fiscal period, 1-12.
    #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
    pub period: u32,

    /// Rows shown in the console preview.
    #[arg(long, default_value_t = 20)]
    pub rows: usize,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_date_safe(Some(s)).ok_or_else(|| format!("`{s}` is not a YYYY-MM-DD date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_period_sales() {
        let cli = Cli::try_parse_from(["appstore-report", "-vv", "period-sales", "2019", "5"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::PeriodSales(args) => assert_eq!((args.year, args.period, args.rows), (2019, 5, 20)),
            _ => panic!("expected period-sales"),
        }
    }

    #[test]
    fn rejects_period_thirteen() {
        assert!(Cli::try_parse_from(["appstore-report", "finance", "2019", "13"]).is_err());
    }

    #[test]
    fn parses_dates() {
        let cli = Cli::try_parse_from(["appstore-report", "sales", "--date", "2019-06-22"]).unwrap();
        match cli.command {
            Command::Sales(args) => assert_eq!(args.date, NaiveDate::from_ymd_opt(2019, 6, 22)),
            _ => panic!("expected sales"),
        }
        assert!(Cli::try_parse_from(["appstore-report", "period", "--date", "20190622"]).is_err());
    }
}
