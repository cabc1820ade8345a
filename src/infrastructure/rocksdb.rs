use crate::domain::ports::{RunLedger, RunStatus};
use crate::error::{BatchError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing batch run claims.
pub const CF_RUNS: &str = "runs";

/// A persistent run ledger using RocksDB.
///
/// Keeps batch run claims across process restarts, so re-running the CLI with
/// the same run identifier is rejected even after the first run exited.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBRunLedger {
    db: Arc<DB>,
    claim_lock: Arc<Mutex<()>>,
}

impl RocksDBRunLedger {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "runs" column family exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_runs = ColumnFamilyDescriptor::new(CF_RUNS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_runs])?;

        Ok(Self {
            db: Arc::new(db),
            claim_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf_missing() -> BatchError {
        BatchError::Io(std::io::Error::other("Runs column family not found"))
    }

    fn read(&self, run_id: &str) -> Result<Option<RunStatus>> {
        let cf = self.db.cf_handle(CF_RUNS).ok_or_else(Self::cf_missing)?;
        match self.db.get_cf(&cf, run_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, run_id: &str, status: RunStatus) -> Result<()> {
        let cf = self.db.cf_handle(CF_RUNS).ok_or_else(Self::cf_missing)?;
        let value = serde_json::to_vec(&status)?;
        self.db.put_cf(&cf, run_id.as_bytes(), value)?;
        Ok(())
    }
}

#[async_trait]
impl RunLedger for RocksDBRunLedger {
    async fn claim(&self, run_id: &str) -> Result<bool> {
        let _guard = self.claim_lock.lock().await;
        if self.read(run_id)?.is_some() {
            return Ok(false);
        }
        self.write(run_id, RunStatus::Claimed)?;
        Ok(true)
    }

    async fn release(&self, run_id: &str) -> Result<()> {
        let _guard = self.claim_lock.lock().await;
        let cf = self.db.cf_handle(CF_RUNS).ok_or_else(Self::cf_missing)?;
        self.db.delete_cf(&cf, run_id.as_bytes())?;
        Ok(())
    }

    async fn complete(&self, run_id: &str) -> Result<()> {
        self.write(run_id, RunStatus::Completed)
    }

    async fn fail(&self, run_id: &str) -> Result<()> {
        self.write(run_id, RunStatus::Failed)
    }

    async fn status(&self, run_id: &str) -> Result<Option<RunStatus>> {
        self.read(run_id)
    }
}
