use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::core::classify::classify_rows;
use crate::core::index::ReferenceCache;
use crate::core::ledger::CreditLedger;
use crate::core::writer::OutputWriter;
use crate::domain::model::{status_text, ScrubRequest, ScrubRun, UploadData};
use crate::domain::ports::{AuditStore, CreditStore, ReferenceSource, Storage};
use crate::utils::error::{Result, ScrubError};
use crate::utils::format::format_execution_time;

/// Runs the scrub pipeline end to end:
/// ingest → index → classify → credit check → write → persist.
///
/// Each invocation is one independent unit of work. Concurrent runs share
/// only the reference cache (read-only snapshots) and the credit ledger
/// (which serializes per user). Nothing before the write phase has side
/// effects, so an admission or ingest failure leaves no files, no debit,
/// and no audit row.
pub struct ScrubOrchestrator<S, R, C, A>
where
    S: Storage,
    R: ReferenceSource,
    C: CreditStore,
    A: AuditStore,
{
    storage: S,
    reference: ReferenceCache<R>,
    ledger: CreditLedger<C>,
    audit: A,
}

impl<S, R, C, A> ScrubOrchestrator<S, R, C, A>
where
    S: Storage,
    R: ReferenceSource,
    C: CreditStore,
    A: AuditStore,
{
    pub fn new(storage: S, reference: ReferenceCache<R>, ledger: CreditLedger<C>, audit: A) -> Self {
        Self {
            storage,
            reference,
            ledger,
            audit,
        }
    }

    pub fn ledger(&self) -> &CreditLedger<C> {
        &self.ledger
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    pub async fn run(&self, request: ScrubRequest) -> Result<ScrubRun> {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();

        tracing::info!(
            run_id,
            user_id = request.user_id,
            file = request.file_name,
            column = request.column,
            "scrub run started"
        );

        // Ingesting
        let upload = parse_upload(&request)?;
        let column_index = upload
            .column_index(&request.column)
            .ok_or_else(|| ScrubError::ColumnNotFound {
                column: request.column.clone(),
            })?;
        let total_count = upload.rows.len() as u64;
        tracing::debug!(run_id, total_count, "upload ingested");

        // Indexed: one snapshot for the whole run.
        let index = self.reference.snapshot().await?;

        // Classifying: never fails per record.
        let classified = classify_rows(&upload, column_index, &index, &request.categories);
        let matched_count = classified.iter().filter(|r| r.is_match()).count() as u64;
        let unmatched_count = total_count - matched_count;
        tracing::debug!(run_id, matched_count, unmatched_count, "rows classified");

        // CreditChecked: admission gates on total volume, before any file I/O.
        let reservation = self.ledger.reserve(request.user_id, total_count).await?;
        tracing::debug!(
            run_id,
            required = total_count,
            available = reservation.available(),
            "credit admitted"
        );

        // Writing: cleanup of partial files happens inside the writer;
        // dropping the reservation on the error path leaves the balance alone.
        let writer = OutputWriter::new(&self.storage);
        let files = writer
            .write_outputs(&run_id, &request.file_name, &upload.headers, &classified)
            .await?;

        // Billing policy: pay only for hits, even though admission reserved
        // the full total. Preserved for compatibility with the legacy ledger.
        let cost = matched_count;
        let remaining = reservation.debit(cost).await?;

        // Persisted: the files and the debit stand even if this fails; the
        // caller gets an explicit AuditPersistError to reconcile from.
        let run = ScrubRun {
            user_id: request.user_id,
            date: Utc::now(),
            uploaded_file: request.file_name.clone(),
            scrubbed_against_states: request.states.join(", "),
            scrubbed_against_options: status_text(&request.categories),
            total_count,
            matched_count,
            unmatched_count,
            cost,
            matching_file: files.matching_file,
            non_matching_file: files.non_matching_file,
            execution_time: format_execution_time(started.elapsed()),
        };
        self.audit.insert_run(&run).await?;

        tracing::info!(
            run_id,
            total = run.total_count,
            matched = run.matched_count,
            cost = run.cost,
            remaining_balance = remaining,
            execution_time = run.execution_time,
            "scrub run completed"
        );

        Ok(run)
    }
}

fn parse_upload(request: &ScrubRequest) -> Result<UploadData> {
    if request.data.is_empty() {
        return Err(ScrubError::input("no file uploaded"));
    }

    let mut reader = csv::Reader::from_reader(request.data.as_slice());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ScrubError::input(format!("unreadable upload header: {}", e)))?
        .iter()
        .map(String::from)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ScrubError::input(format!("unreadable upload row: {}", e)))?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(UploadData { headers, rows })
}
