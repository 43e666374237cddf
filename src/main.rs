use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use dnc_scrub::config::{CliConfig, FileConfig};
use dnc_scrub::domain::model::{Category, ScrubRequest};
use dnc_scrub::utils::validation::Validate;
use dnc_scrub::utils::{error::ScrubError, logger};
use dnc_scrub::{
    CreditLedger, CsvReferenceSource, JsonStateStore, LocalStorage, ReferenceCache,
    ScrubOrchestrator,
};

#[tokio::main]
async fn main() {
    let mut config = CliConfig::parse();
    logger::init_cli_logger(config.verbose);

    if let Some(path) = config.config.clone() {
        match FileConfig::from_file(&path) {
            Ok(file) => config = config.with_file_defaults(&file),
            Err(e) => fail(&e),
        }
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    if let Err(e) = run(config).await {
        fail(&e);
    }
}

fn fail(err: &ScrubError) -> ! {
    tracing::error!(kind = err.kind(), "{}", err);
    eprintln!("[{}] {}", err.kind(), err);
    std::process::exit(1);
}

async fn run(config: CliConfig) -> dnc_scrub::Result<()> {
    let storage = LocalStorage::new(config.output_path.clone());
    let reference = ReferenceCache::new(
        CsvReferenceSource::new(&config.reference_file),
        Duration::from_secs(config.reference_refresh_secs),
    );
    let store = Arc::new(JsonStateStore::new(&config.state_file));
    let ledger = CreditLedger::new(Arc::clone(&store));

    let orchestrator = ScrubOrchestrator::new(storage, reference, ledger, store);

    if let Some(amount) = config.grant {
        let balance = orchestrator.ledger().grant(config.user, amount).await?;
        println!("Granted {} credits; balance is now {}", amount, balance);
    }

    if config.history {
        use dnc_scrub::domain::ports::AuditStore;
        use dnc_scrub::utils::format::format_audit_date;
        let runs = orchestrator.audit().list_runs(config.user).await?;
        if runs.is_empty() {
            println!("No scrub runs recorded for user {}", config.user);
        }
        for run in runs {
            println!(
                "{} | {} | total {} | matched {} | cost {} | {}",
                format_audit_date(run.date),
                run.uploaded_file,
                run.total_count,
                run.matched_count,
                run.cost,
                run.execution_time,
            );
        }
        return Ok(());
    }

    let input = match &config.input {
        Some(input) => input.clone(),
        None => {
            if config.grant.is_some() {
                return Ok(());
            }
            return Err(ScrubError::input("no file uploaded (--input is required)"));
        }
    };

    let data = tokio::fs::read(&input)
        .await
        .map_err(|e| ScrubError::input(format!("{}: {}", input, e)))?;
    let file_name = Path::new(&input)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(input.as_str())
        .to_string();

    let mut categories = BTreeSet::new();
    for raw in &config.categories {
        categories.insert(raw.parse::<Category>()?);
    }

    let request = ScrubRequest {
        user_id: config.user,
        file_name,
        data,
        column: config.column.clone(),
        categories,
        states: config.states.clone(),
    };

    let run = orchestrator.run(request).await?;

    println!("Scrub completed in {}", run.execution_time);
    println!(
        "  total: {}  matched: {}  clean: {}  cost: {}",
        run.total_count, run.matched_count, run.unmatched_count, run.cost
    );
    if run.matching_file.is_empty() {
        println!("  matching file: (none, no matches)");
    } else {
        println!("  matching file: {}", run.matching_file);
    }
    println!("  non-matching file: {}", run.non_matching_file);

    Ok(())
}
