use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::model::ReferenceRow;
use crate::domain::ports::ReferenceSource;
use crate::utils::error::{Result, ScrubError};

/// Reference dataset backed by a CSV export with headers
/// `contact,tcpa,dnc_complainers,federal_dnc`. Any read or parse failure
/// maps to `ReferenceUnavailable` so the run aborts before producing output.
#[derive(Debug, Clone)]
pub struct CsvReferenceSource {
    path: PathBuf,
}

impl CsvReferenceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReferenceSource for CsvReferenceSource {
    async fn fetch_all(&self) -> Result<Vec<ReferenceRow>> {
        let data = tokio::fs::read(&self.path).await.map_err(|e| {
            ScrubError::reference_unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let mut reader = csv::Reader::from_reader(data.as_slice());
        let headers = reader
            .headers()
            .map_err(|e| ScrubError::reference_unavailable(format!("bad header: {}", e)))?
            .clone();

        let column = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                ScrubError::reference_unavailable(format!(
                    "reference dataset missing '{}' column",
                    name
                ))
            })
        };

        let contact_idx = column("contact")?;
        let tcpa_idx = column("tcpa")?;
        let dnc_idx = column("dnc_complainers")?;
        let fed_idx = column("federal_dnc")?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|e| ScrubError::reference_unavailable(format!("bad row: {}", e)))?;

            rows.push(ReferenceRow {
                contact: record.get(contact_idx).unwrap_or_default().to_string(),
                tcpa: parse_flag(record.get(tcpa_idx))?,
                dnc_complainers: parse_flag(record.get(dnc_idx))?,
                federal_dnc: parse_flag(record.get(fed_idx))?,
            });
        }

        tracing::debug!(rows = rows.len(), path = %self.path.display(), "reference dataset loaded");
        Ok(rows)
    }
}

fn parse_flag(cell: Option<&str>) -> Result<bool> {
    match cell.map(|c| c.trim().to_ascii_lowercase()).as_deref() {
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") | Some("") | None => Ok(false),
        Some(other) => Err(ScrubError::reference_unavailable(format!(
            "unparseable category flag '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_reference(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn loads_rows_with_mixed_flag_spellings() {
        let file = write_reference(
            "contact,tcpa,dnc_complainers,federal_dnc\n5551234567,1,false,YES\n5559876543,0,true,no\n",
        );
        let source = CsvReferenceSource::new(file.path());

        let rows = source.fetch_all().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].tcpa);
        assert!(!rows[0].dnc_complainers);
        assert!(rows[0].federal_dnc);
        assert!(rows[1].dnc_complainers);
    }

    #[tokio::test]
    async fn missing_file_is_reference_unavailable() {
        let source = CsvReferenceSource::new("/nonexistent/reference.csv");
        let err = source.fetch_all().await.unwrap_err();
        assert_eq!(err.kind(), "ReferenceUnavailable");
    }

    #[tokio::test]
    async fn missing_column_is_reference_unavailable() {
        let file = write_reference("contact,tcpa\n5551234567,1\n");
        let source = CsvReferenceSource::new(file.path());
        let err = source.fetch_all().await.unwrap_err();
        assert_eq!(err.kind(), "ReferenceUnavailable");
    }

    #[tokio::test]
    async fn garbage_flag_is_reference_unavailable() {
        let file =
            write_reference("contact,tcpa,dnc_complainers,federal_dnc\n5551234567,maybe,0,0\n");
        let source = CsvReferenceSource::new(file.path());
        let err = source.fetch_all().await.unwrap_err();
        assert_eq!(err.kind(), "ReferenceUnavailable");
    }
}
