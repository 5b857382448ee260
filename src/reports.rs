use serde::Serialize;
use std::collections::hash_map::{self, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::loader::{parse_rows, ReportRow};

/// Which report schema a stream follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Sales,
    Finance,
}

/// Titles of the grouping key and the signed count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key_column: &'static str,
    pub count_column: &'static str,
}

impl ReportKind {
    pub fn columns(self) -> ColumnSpec {
        match self {
            ReportKind::Sales => ColumnSpec {
                key_column: "SKU",
                count_column: "Units",
            },
            ReportKind::Finance => ColumnSpec {
                key_column: "Vendor Identifier",
                count_column: "Quantity",
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Sales => "sales",
            ReportKind::Finance => "finance",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sales" => Ok(ReportKind::Sales),
            "finance" => Ok(ReportKind::Finance),
            other => Err(format!("unknown report kind `{other}`")),
        }
    }
}

/// Per-key totals. `sales` sums positive counts; `refund` sums zero and
/// negative counts, so it is never positive and `net` cannot overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkuTotals {
    pub sales: i64,
    pub refund: i64,
}

impl SkuTotals {
    pub fn net(&self) -> i64 {
        self.sales + self.refund
    }

    /// Adds `count` to its bucket, or returns `None` if the bucket would
    /// overflow.
    fn checked_add(self, count: i64) -> Option<Self> {
        if count > 0 {
            Some(Self {
                sales: self.sales.checked_add(count)?,
                ..self
            })
        } else {
            Some(Self {
                refund: self.refund.checked_add(count)?,
                ..self
            })
        }
    }
}

/// Totals keyed by SKU or vendor identifier. Iteration order is unspecified;
/// use [`AggregationResult::sorted`] for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AggregationResult {
    totals: HashMap<String, SkuTotals>,
}

impl AggregationResult {
    pub fn get(&self, key: &str) -> Option<&SkuTotals> {
        self.totals.get(key)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, SkuTotals> {
        self.totals.iter()
    }

    /// Entries ordered by key.
    pub fn sorted(&self) -> Vec<(&str, SkuTotals)> {
        let mut out: Vec<(&str, SkuTotals)> =
            self.totals.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// Sum over every key. [`aggregate`] rejects inputs whose grand total
    /// overflows, so this cannot either.
    pub fn grand_total(&self) -> SkuTotals {
        self.totals
            .values()
            .fold(SkuTotals::default(), |acc, t| SkuTotals {
                sales: acc.sales + t.sales,
                refund: acc.refund + t.refund,
            })
    }

    pub fn into_inner(self) -> HashMap<String, SkuTotals> {
        self.totals
    }
}

/// Reduce rows into per-key sales/refund totals.
///
/// A count that is not a signed integer, or one that would overflow a
/// per-key or grand total, fails the whole aggregation.
pub fn aggregate(rows: &[ReportRow], kind: ReportKind) -> Result<AggregationResult, ParseError> {
    let cols = kind.columns();
    let mut totals: HashMap<String, SkuTotals> = HashMap::new();
    let mut grand = SkuTotals::default();
    for row in rows {
        let key = row.get(cols.key_column).ok_or(ParseError::MissingColumn {
            column: cols.key_column,
            line: row.line(),
        })?;
        let raw = row.get(cols.count_column).ok_or(ParseError::MissingColumn {
            column: cols.count_column,
            line: row.line(),
        })?;
        let count: i64 = raw.parse().map_err(|_| ParseError::InvalidCount {
            value: raw.to_string(),
            line: row.line(),
        })?;
        let overflow = || ParseError::CountOverflow {
            value: raw.to_string(),
            line: row.line(),
        };
        grand = grand.checked_add(count).ok_or_else(overflow)?;
        let entry = totals.entry(key.to_string()).or_default();
        *entry = entry.checked_add(count).ok_or_else(overflow)?;
    }
    Ok(AggregationResult { totals })
}

/// [`parse_rows`] followed by [`aggregate`].
pub fn summarize(raw: &[u8], kind: ReportKind) -> Result<AggregationResult, ParseError> {
    let rows = parse_rows(raw)?;
    aggregate(&rows, kind)
}
