//! Flat CSV export of the assembled table, and read-back for offline statistics.

use crate::dataset::{Row, Table};
use crate::error::Result;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Column order of the exported file.
pub const HEADER: [&str; 9] =
    ["title", "year", "rating", "director", "runtime", "genres", "cast", "votes", "decade"];

/// Writes the table as CSV with a header row.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    // serialize() only emits the header alongside the first record
    if table.is_empty() {
        writer.write_record(HEADER)?;
    }

    for row in table {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Renders the table as a CSV string.
pub fn to_csv_string(table: &Table) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes the table to `path`. The file is only created once the whole
/// table has been serialized.
pub fn save(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let csv = to_csv_string(table)?;
    std::fs::write(path, csv)?;

    info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Reads a previously exported table.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(reader);
    let rows = reader.deserialize::<Row>().collect::<Result<Vec<_>, _>>()?;
    Ok(Table::from_rows(rows))
}

/// Loads a previously exported table from `path`.
pub fn load(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    debug!("Loading table from {}", path.display());

    let file = std::fs::File::open(path)?;
    read_csv(file)
}
