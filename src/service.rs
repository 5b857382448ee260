// Report assembly: decide which reports to fetch, keep the raw bytes, and
// summarise them.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::PeriodCache;
use crate::calendar::{check_period, check_year};
use crate::client::{ReportQuery, ReportSource};
use crate::error::ReportError;
use crate::planner::{plan_for_period, Frequency};
use crate::reports::{summarize, AggregationResult, ReportKind};
use crate::sink::ReportSink;
use crate::util::format_date;

/// A fetched, stored and aggregated report.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    /// File name stem the raw report was stored under.
    pub name: String,
    pub kind: ReportKind,
    pub result: AggregationResult,
}

/// Fetches reports from `S`, stores them in `K` and aggregates them.
///
/// Requests are issued one at a time; the first failure aborts the call.
pub struct ReportService<S, K> {
    source: S,
    sink: K,
    vendor_number: String,
    cache: Arc<PeriodCache>,
}

impl<S: ReportSource, K: ReportSink> ReportService<S, K> {
    pub fn new(source: S, sink: K, vendor_number: impl Into<String>) -> Self {
        Self::with_cache(source, sink, vendor_number, Arc::new(PeriodCache::new()))
    }

    /// Shares a calendar cache with other callers.
    pub fn with_cache(
        source: S,
        sink: K,
        vendor_number: impl Into<String>,
        cache: Arc<PeriodCache>,
    ) -> Self {
        Self {
            source,
            sink,
            vendor_number: vendor_number.into(),
            cache,
        }
    }

    pub fn cache(&self) -> &PeriodCache {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Sales for one vendor-zone calendar day.
    pub fn daily_sales(&self, date: NaiveDate) -> Result<ReportOutcome, ReportError> {
        let raw = self.source.fetch(&ReportQuery::Sales {
            date,
            frequency: Frequency::Daily,
        })?;
        let name = format!("S_D_{}_{}", self.vendor_number, format_date(date));
        self.finish(name, ReportKind::Sales, &raw)
    }

    /// Sales for a whole fiscal period, stitched together from one daily
    /// report, the weekly reports, and the trailing daily reports.
    pub fn period_sales(&self, year: i32, period: u32) -> Result<ReportOutcome, ReportError> {
        let fp = self.cache.lookup_period(year, period)?;
        let plan = plan_for_period(&fp);
        info!(
            year,
            period,
            begin = %fp.begin_date,
            end = %fp.end_date,
            requests = plan.len(),
            "fetching fiscal period sales"
        );

        let mut combined = Vec::new();
        for req in plan {
            debug!(date = %req.date, frequency = %req.frequency, "planned request");
            let raw = self.source.fetch(&ReportQuery::from(req))?;
            combined.extend_from_slice(&raw);
            if !combined.is_empty() && !combined.ends_with(b"\n") {
                combined.push(b'\n');
            }
        }

        let name = format!("S_FY_{}_{},{:02}", self.vendor_number, year, period);
        self.finish(name, ReportKind::Sales, &combined)
    }

    /// Financial report for a fiscal period.
    pub fn finance(&self, year: i32, period: u32) -> Result<ReportOutcome, ReportError> {
        check_year(year)?;
        check_period(period)?;
        let query = ReportQuery::Finance { year, period };
        let raw = self.source.fetch(&query)?;
        let name = format!("F_D_{}_{}", self.vendor_number, query.report_date());
        self.finish(name, ReportKind::Finance, &raw)
    }

    fn finish(&self, name: String, kind: ReportKind, raw: &[u8]) -> Result<ReportOutcome, ReportError> {
        self.sink.store(&format!("{name}.txt"), raw)?;
        let result = summarize(raw, kind)?;
        info!(report = %name, keys = result.len(), "aggregated report");
        Ok(ReportOutcome { name, kind, result })
    }
}
