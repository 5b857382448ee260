// Tab-delimited report parsing.
//
// Reports are titled TSV: the first row names the columns and each later row
// holds one cell per title. Finance reports end with a summary block that
// starts at a row whose first cell is `Total_Rows`; everything from there on
// is not data.
use csv::ReaderBuilder;
use std::sync::Arc;
use tracing::debug;

use crate::error::ParseError;

/// First cell of the row that opens the trailing summary block.
pub const TOTAL_ROWS_SENTINEL: &str = "Total_Rows";

/// One data row, cells keyed by the header titles in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    titles: Arc<[String]>,
    cells: Vec<String>,
    line: u64,
}

impl ReportRow {
    /// Builds a row from `(title, cell)` pairs. The line number is 0.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (titles, cells): (Vec<String>, Vec<String>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).unzip();
        Self {
            titles: titles.into(),
            cells,
            line: 0,
        }
    }

    /// Cell under `title`, if the header has that column.
    pub fn get(&self, title: &str) -> Option<&str> {
        self.titles
            .iter()
            .position(|t| t == title)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// 1-based line in the source stream; 0 for rows built in memory.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// `(title, cell)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.titles
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(String::as_str))
    }
}

/// Parse a titled tab-delimited report into data rows.
///
/// - The first row is the header.
/// - Parsing stops at the first row whose first cell is `Total_Rows`.
/// - A row equal to the header is skipped; concatenated reports repeat it.
/// - Any other row must have exactly one cell per title.
pub fn parse_rows(raw: &[u8]) -> Result<Vec<ReportRow>, ParseError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(raw);
    let mut records = rdr.records();

    let header = records.next().ok_or(ParseError::MissingHeader)??;
    let titles: Arc<[String]> = header.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        if record.get(0) == Some(TOTAL_ROWS_SENTINEL) {
            debug!(line, "summary block reached");
            break;
        }
        if record.iter().eq(titles.iter().map(String::as_str)) {
            continue;
        }
        if record.len() != titles.len() {
            return Err(ParseError::RowWidth {
                line,
                expected: titles.len(),
                found: record.len(),
            });
        }

        rows.push(ReportRow {
            titles: Arc::clone(&titles),
            cells: record.iter().map(str::to_string).collect(),
            line,
        });
    }
    Ok(rows)
}
