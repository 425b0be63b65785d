//! Delimited-text formats at the edge of the store.
//!
//! - `upload`: tab-separated sample uploads (`Class` / `Text` columns)
//! - `export`: comma-separated table dumps, one document per table

pub mod export;
pub mod upload;

pub use export::{export_file_name, render_table};
pub use upload::{is_upload_file_name, parse_samples};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Missing column '{0}' in upload header")]
    MissingColumn(&'static str),

    #[error("Malformed record {record}: {message}")]
    MalformedRecord { record: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
