use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::error::PersistenceError;
use crate::reports::AggregationResult;
use crate::sink::ReportSink;
use crate::types::{SummaryRow, SummaryStats};

pub fn csv_bytes<T: Serialize>(name: &str, rows: &[T]) -> Result<Vec<u8>, PersistenceError> {
    let encode = |message: String| PersistenceError::Encode {
        name: name.to_string(),
        message,
    };
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for r in rows {
        wtr.serialize(r).map_err(|e| encode(e.to_string()))?;
    }
    wtr.into_inner().map_err(|e| encode(e.to_string()))
}

pub fn json_bytes<T: Serialize>(name: &str, value: &T) -> Result<Vec<u8>, PersistenceError> {
    serde_json::to_vec_pretty(value).map_err(|e| PersistenceError::Encode {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Stores `<base>.summary.csv` and `<base>.summary.json` through `sink`.
pub fn write_summary<K: ReportSink>(
    sink: &K,
    base: &str,
    kind: &str,
    result: &AggregationResult,
) -> Result<(), PersistenceError> {
    let rows = SummaryRow::from_result(result);
    let csv_name = format!("{base}.summary.csv");
    sink.store(&csv_name, &csv_bytes(&csv_name, &rows)?)?;

    let json_name = format!("{base}.summary.json");
    let stats = SummaryStats::new(kind, base, result);
    sink.store(&json_name, &json_bytes(&json_name, &stats)?)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
