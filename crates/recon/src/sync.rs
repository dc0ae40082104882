//! File-backed synchronization run: load both inventories, reconcile, keep
//! the outcome for later inspection.

use std::path::PathBuf;

use crate::engine;
use crate::error::ReconError;
use crate::loader::{load_inventory, LoadOptions};
use crate::model::{Inventory, ReconMeta, ReconResult, RunDiagnostics, VarianceEntry};

pub struct Synchronizer {
    primary_path: PathBuf,
    authoritative_path: PathBuf,
    options: LoadOptions,
    result: Option<ReconResult>,
}

impl Synchronizer {
    pub fn new(primary_path: impl Into<PathBuf>, authoritative_path: impl Into<PathBuf>) -> Self {
        Self {
            primary_path: primary_path.into(),
            authoritative_path: authoritative_path.into(),
            options: LoadOptions::default(),
            result: None,
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Run and report success as a boolean. Errors are logged, not returned.
    pub fn synchronize(&mut self) -> bool {
        match self.try_synchronize() {
            Ok(_) => true,
            Err(e) => {
                log::error!("synchronization failed: {e}");
                false
            }
        }
    }

    /// Run and return the error on failure. Any previous result is discarded
    /// first, so a failed run never leaves stale data behind.
    pub fn try_synchronize(&mut self) -> Result<&ReconResult, ReconError> {
        self.result = None;

        // Both loads finish before the engine runs.
        let primary = load_inventory(&self.primary_path, &self.options)?;
        let authoritative = load_inventory(&self.authoritative_path, &self.options)?;

        let meta = ReconMeta::new(
            self.primary_path.display().to_string(),
            self.authoritative_path.display().to_string(),
        );
        let diagnostics = RunDiagnostics {
            primary: primary.diagnostics,
            authoritative: authoritative.diagnostics,
        };

        let result = engine::run(&primary.inventory, &authoritative.inventory, meta, diagnostics);
        Ok(self.result.insert(result))
    }

    /// Variance entries of the last successful run; empty otherwise.
    pub fn report(&self) -> &[VarianceEntry] {
        self.result.as_ref().map(|r| r.report.as_slice()).unwrap_or(&[])
    }

    /// Merged inventory of the last successful run; empty otherwise.
    pub fn synchronized_inventory(&self) -> Inventory {
        self.result
            .as_ref()
            .map(|r| r.synchronized_inventory.clone())
            .unwrap_or_default()
    }

    pub fn diagnostics(&self) -> RunDiagnostics {
        self.result.as_ref().map(|r| r.diagnostics.clone()).unwrap_or_default()
    }

    pub fn result(&self) -> Option<&ReconResult> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<ReconResult> {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VarianceStatus;

    #[test]
    fn synchronize_success() {
        let dir = tempfile::tempdir().unwrap();
        let web = dir.path().join("inv1.csv");
        let warehouse = dir.path().join("inv2.csv");
        std::fs::write(&web, "SKU-1,Laptop,1200.50,0\nSKU-6,Old Keyboard,30.00,30\n").unwrap();
        std::fs::write(&warehouse, "SKU-1,Laptop X,1250.00,60\n").unwrap();

        let mut sync = Synchronizer::new(&web, &warehouse);
        assert!(sync.synchronize());

        let report = sync.report();
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].status, VarianceStatus::StockDepleted);
        assert_eq!(report[1].status, VarianceStatus::Removed);
        assert_eq!(sync.synchronized_inventory().len(), 1);
        assert!(sync.result().is_some());
    }

    #[test]
    fn failed_run_yields_empty_results() {
        let dir = tempfile::tempdir().unwrap();
        let web = dir.path().join("inv1.csv");
        std::fs::write(&web, "SKU-1,Laptop,1200.50,0\n").unwrap();

        let mut sync = Synchronizer::new(&web, dir.path().join("missing.csv"));
        assert!(!sync.synchronize());
        assert!(sync.report().is_empty());
        assert!(sync.synchronized_inventory().is_empty());
        assert!(sync.result().is_none());

        let err = sync.try_synchronize().unwrap_err();
        assert!(err.is_resource());
    }

    #[test]
    fn report_before_run_is_empty() {
        let sync = Synchronizer::new("a.csv", "b.csv");
        assert!(sync.report().is_empty());
        assert!(sync.synchronized_inventory().is_empty());
        assert_eq!(sync.diagnostics(), RunDiagnostics::default());
    }
}
