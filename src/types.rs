use serde::Serialize;
use tabled::Tabled;

use crate::calendar::FiscalPeriod;
use crate::reports::{AggregationResult, SkuTotals};
use crate::util::format_int;

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SummaryRow {
    #[serde(rename = "Key")]
    #[tabled(rename = "Key")]
    pub key: String,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales")]
    pub sales: i64,
    #[serde(rename = "Refund")]
    #[tabled(rename = "Refund")]
    pub refund: i64,
    #[serde(rename = "Net")]
    #[tabled(rename = "Net")]
    pub net: i64,
}

impl SummaryRow {
    fn new(key: &str, totals: SkuTotals) -> Self {
        Self {
            key: key.to_string(),
            sales: totals.sales,
            refund: totals.refund,
            net: totals.net(),
        }
    }

    /// One row per key, ordered by key.
    pub fn from_result(result: &AggregationResult) -> Vec<SummaryRow> {
        result
            .sorted()
            .into_iter()
            .map(|(key, totals)| SummaryRow::new(key, totals))
            .collect()
    }
}

/// Console rendering of [`SummaryRow`] with thousands separators.
#[derive(Debug, Tabled, Clone)]
pub struct SummaryPreviewRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Sales")]
    pub sales: String,
    #[tabled(rename = "Refund")]
    pub refund: String,
    #[tabled(rename = "Net")]
    pub net: String,
}

impl From<&SummaryRow> for SummaryPreviewRow {
    fn from(row: &SummaryRow) -> Self {
        Self {
            key: row.key.clone(),
            sales: format_int(row.sales),
            refund: format_int(row.refund),
            net: format_int(row.net),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PeriodRow {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: u32,
    #[serde(rename = "Weeks")]
    #[tabled(rename = "Weeks")]
    pub weeks: u32,
    #[serde(rename = "StartDate")]
    #[tabled(rename = "StartDate")]
    pub start_date: String,
    #[serde(rename = "EndDate")]
    #[tabled(rename = "EndDate")]
    pub end_date: String,
}

impl From<&FiscalPeriod> for PeriodRow {
    fn from(p: &FiscalPeriod) -> Self {
        Self {
            period: p.period,
            weeks: p.week_count,
            start_date: p.begin_date.format("%Y-%m-%d").to_string(),
            end_date: p.end_date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub kind: String,
    pub source: String,
    pub total_keys: usize,
    pub total_sales: i64,
    pub total_refund: i64,
    pub net: i64,
}

impl SummaryStats {
    pub fn new(kind: &str, source: &str, result: &AggregationResult) -> Self {
        let total = result.grand_total();
        Self {
            kind: kind.to_string(),
            source: source.to_string(),
            total_keys: result.len(),
            total_sales: total.sales,
            total_refund: total.refund,
            net: total.net(),
        }
    }
}
