use csv::{ErrorKind, ReaderBuilder, StringRecord};
use rater_core::NewSample;

use crate::IngestError;

/// Header column carrying the sample label.
pub const LABEL_COLUMN: &str = "Class";
/// Header column carrying the sample text.
pub const CONTENT_COLUMN: &str = "Text";

/// Uploads are only recognised by their `.tsv` extension.
pub fn is_upload_file_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".tsv")
}

/// Parse a tab-separated upload into samples.
///
/// Invalid UTF-8 is replaced rather than rejected. A record whose field count
/// differs from the header fails the whole upload.
pub fn parse_samples(bytes: &[u8]) -> Result<Vec<NewSample>, IngestError> {
    let decoded = String::from_utf8_lossy(bytes);
    let text = decoded.strip_prefix('\u{feff}').unwrap_or(decoded.as_ref());

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let label_idx = column_index(&headers, LABEL_COLUMN)?;
    let content_idx = column_index(&headers, CONTENT_COLUMN)?;

    let mut samples = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            if matches!(e.kind(), ErrorKind::UnequalLengths { .. }) {
                IngestError::MalformedRecord {
                    record: i + 1,
                    message: e.to_string(),
                }
            } else {
                IngestError::Csv(e)
            }
        })?;

        let field = |idx: usize| {
            record.get(idx).ok_or_else(|| IngestError::MalformedRecord {
                record: i + 1,
                message: format!("missing field {}", idx),
            })
        };
        samples.push(NewSample::new(field(label_idx)?, field(content_idx)?));
    }

    tracing::debug!(count = samples.len(), "Parsed upload");
    Ok(samples)
}

fn column_index(headers: &StringRecord, name: &'static str) -> Result<usize, IngestError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or(IngestError::MissingColumn(name))
}
