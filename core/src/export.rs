//! CSV sinks and source for the two output tables.
//!
//! RULE: a file is either fully written or not touched. Content goes to a
//! sibling `.tmp` file first and is renamed into place once flushed.

use crate::{
    error::{CohortError, CohortResult},
    order::{Order, FACT_ORDERS_COLUMNS},
    retention::{RetentionRow, RETENTION_COLUMNS},
    schema,
};
use serde::Serialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub const FACT_ORDERS_FILE: &str = "fact_orders.csv";
pub const RETENTION_FILE: &str = "metrics_cohort_retention_monthly.csv";

/// Encode rows as CSV bytes. The header is always written, even for an
/// empty table.
pub fn encode_table<T: Serialize>(header: &[&str], rows: &[T]) -> CohortResult<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.into_inner().map_err(|e| CohortError::Io(e.into_error()))
}

pub fn encode_fact_orders(orders: &[Order]) -> CohortResult<Vec<u8>> {
    encode_table(&FACT_ORDERS_COLUMNS, orders)
}

pub fn encode_retention(rows: &[RetentionRow]) -> CohortResult<Vec<u8>> {
    encode_table(&RETENTION_COLUMNS, rows)
}

pub fn write_fact_orders(out_dir: &Path, orders: &[Order]) -> CohortResult<PathBuf> {
    let path = out_dir.join(FACT_ORDERS_FILE);
    write_atomically(&path, &encode_fact_orders(orders)?)?;
    log::info!("export: wrote {} orders to {}", orders.len(), path.display());
    Ok(path)
}

pub fn write_retention(out_dir: &Path, rows: &[RetentionRow]) -> CohortResult<PathBuf> {
    let path = out_dir.join(RETENTION_FILE);
    write_atomically(&path, &encode_retention(rows)?)?;
    log::info!("export: wrote {} retention rows to {}", rows.len(), path.display());
    Ok(path)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> CohortResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Read a previously written `fact_orders.csv`, validating the header
/// and every row.
pub fn read_fact_orders(path: &Path) -> CohortResult<Vec<Order>> {
    let file = fs::File::open(path)?;
    let orders = read_fact_orders_from(file)?;
    log::info!("export: read {} orders from {}", orders.len(), path.display());
    Ok(orders)
}

pub fn read_fact_orders_from<R: io::Read>(rdr: R) -> CohortResult<Vec<Order>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(rdr);
    schema::validate_header(rdr.headers()?)?;

    let mut orders = Vec::new();
    for (idx, record) in rdr.deserialize::<Order>().enumerate() {
        let row = idx as u64 + 1;
        let order = record.map_err(|e| CohortError::Schema {
            row,
            message: e.to_string(),
        })?;
        schema::validate_order(row, &order)?;
        orders.push(order);
    }
    Ok(orders)
}
