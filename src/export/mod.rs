pub mod csv;
pub mod pdf;
pub mod workbook;

pub use self::csv::table_to_csv;
pub use self::pdf::{appointment_confirmation_pdf, table_to_pdf};
pub use self::workbook::tables_to_workbook;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Archive error: {0}")]
    Io(#[from] std::io::Error),
}
