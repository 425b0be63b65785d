use csv::WriterBuilder;
use rater_core::TableDump;

use crate::IngestError;

/// Attachment name for a table dump.
pub fn export_file_name(table: &str) -> String {
    format!("{}.csv", table)
}

/// Render a table dump as a comma-separated document with a header row.
pub fn render_table(table: &TableDump) -> Result<Vec<u8>, IngestError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.into_inner().map_err(|e| IngestError::Io(e.into_error()))
}
