use crate::export::ExportError;
use crate::reports::Table;

/// Render a report table as CSV bytes: one header record, one record per
/// row, RFC-style quoting handled by the writer.
pub fn table_to_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}
