use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::model::ScrubRun;
use crate::domain::ports::{AuditStore, CreditStore};
use crate::utils::error::{Result, ScrubError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct State {
    balances: HashMap<i64, u64>,
    runs: Vec<ScrubRun>,
}

/// Credit balances and the scrub audit log in a single JSON file.
///
/// Stands in for the relational store behind the CreditStore/AuditStore
/// ports. The whole file is rewritten on each mutation under one mutex; the
/// credit ledger provides the per-user serialization on top.
pub struct JsonStateStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<State> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(State::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, state: &State) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(state)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl CreditStore for JsonStateStore {
    async fn get_balance(&self, user_id: i64) -> Result<u64> {
        let _guard = self.lock.lock().await;
        let state = self.load().await?;
        Ok(*state.balances.get(&user_id).unwrap_or(&0))
    }

    async fn set_balance(&self, user_id: i64, balance: u64) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut state = self.load().await?;
        state.balances.insert(user_id, balance);
        self.save(&state).await
    }
}

#[async_trait]
impl AuditStore for JsonStateStore {
    async fn insert_run(&self, run: &ScrubRun) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut state = self
            .load()
            .await
            .map_err(|e| ScrubError::audit_persist(e.to_string()))?;
        state.runs.push(run.clone());
        self.save(&state)
            .await
            .map_err(|e| ScrubError::audit_persist(e.to_string()))
    }

    async fn list_runs(&self, user_id: i64) -> Result<Vec<ScrubRun>> {
        let _guard = self.lock.lock().await;
        let state = self.load().await?;
        let mut runs: Vec<ScrubRun> = state
            .runs
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        runs.reverse();
        Ok(runs)
    }
}
