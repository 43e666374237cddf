use crate::domain::model::{status_text, ClassifiedRecord};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ScrubError};

/// Output artifact names for one run, derived from the run id and the
/// original upload name so download consumers can address them.
#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub matching_file: String,
    pub non_matching_file: String,
}

/// Writes the two result artifacts through the storage port.
///
/// Output format follows the legacy scrub files: rows are plain
/// comma-joined with a trailing `status` column, with no quoting or escaping
/// of embedded delimiters. Consumers must not expect RFC 4180 output.
pub struct OutputWriter<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> OutputWriter<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Writes the matching file (only when at least one match exists) and
    /// the non-matching file (always; zero rows gives an empty file with no
    /// header). On any write failure, files already written for this run are
    /// removed before the error surfaces.
    pub async fn write_outputs(
        &self,
        run_id: &str,
        uploaded_file: &str,
        headers: &[String],
        records: &[ClassifiedRecord],
    ) -> Result<OutputFiles> {
        let matching: Vec<&ClassifiedRecord> = records.iter().filter(|r| r.is_match()).collect();
        let non_matching: Vec<&ClassifiedRecord> =
            records.iter().filter(|r| !r.is_match()).collect();

        let files = OutputFiles {
            matching_file: if matching.is_empty() {
                String::new()
            } else {
                format!("{}_matching_numbers_{}", run_id, uploaded_file)
            },
            non_matching_file: format!("{}_non_matching_numbers_{}", run_id, uploaded_file),
        };

        let mut written: Vec<&str> = Vec::new();

        if !matching.is_empty() {
            let body = render_rows(headers, &matching);
            self.write_or_cleanup(&files.matching_file, body.as_bytes(), &written)
                .await?;
            written.push(&files.matching_file);
        }

        let body = render_rows(headers, &non_matching);
        self.write_or_cleanup(&files.non_matching_file, body.as_bytes(), &written)
            .await?;

        Ok(files)
    }

    async fn write_or_cleanup(&self, path: &str, data: &[u8], written: &[&str]) -> Result<()> {
        if let Err(err) = self.storage.write_file(path, data).await {
            self.cleanup(path, written).await;
            return Err(ScrubError::output_write(format!("{}: {}", path, err)));
        }
        Ok(())
    }

    /// Best-effort removal of the failed file and everything already written
    /// this run, so a failed run leaves no partial artifacts behind.
    async fn cleanup(&self, failed: &str, written: &[&str]) {
        for path in written.iter().copied().chain(std::iter::once(failed)) {
            if let Err(err) = self.storage.remove_file(path).await {
                tracing::warn!(path, %err, "failed to clean up partial output file");
            }
        }
    }
}

fn render_rows(headers: &[String], records: &[&ClassifiedRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(format!("{},status", headers.join(",")));

    for record in records {
        lines.push(format!(
            "{},{}",
            record.values.join(","),
            status_text(&record.status)
        ));
    }

    let mut body = lines.join("\n");
    body.push('\n');
    body
}
