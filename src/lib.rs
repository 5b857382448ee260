// Vendor fiscal calendar and sales/finance report aggregation.
//
// - `calendar` / `cache` - 52/53-week fiscal years and memoised lookups
// - `planner` - daily/weekly request plan covering a fiscal period
// - `loader` / `reports` - titled TSV parsing and per-key sales/refund totals
// - `client` / `token` / `sink` - report retrieval, API tokens, persistence
// - `service` - ties the pieces together for daily, period and finance reports

pub mod cache;
pub mod calendar;
pub mod client;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod planner;
pub mod reports;
pub mod service;
pub mod sink;
pub mod token;
pub mod types;
pub mod util;

pub use cache::PeriodCache;
pub use calendar::{
    days_in_month, fiscal_year_start, generate_fiscal_year, is_leap_year, FiscalPeriod, FiscalYear,
};
pub use error::{CalendarError, ParseError, PersistenceError, ReportError, RetrievalError};
pub use loader::{parse_rows, ReportRow};
pub use planner::{plan_period_requests, Frequency, PlannedRequest};
pub use reports::{aggregate, AggregationResult, ReportKind, SkuTotals};
