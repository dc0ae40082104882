//! `stocksync-recon`: keyed inventory reconciliation engine.
//!
//! The engine itself is pure: two pre-loaded inventories in, a variance
//! report and merged inventory out. Loading and the file-backed
//! [`Synchronizer`] sit alongside it; no CLI or presentation code here.

pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod model;
pub mod summary;
pub mod sync;

pub use config::SyncConfig;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use loader::{load_inventory, parse_inventory, LoadOptions, LoadedInventory};
pub use model::{Inventory, ReconResult, Record, VarianceEntry, VarianceStatus};
pub use sync::Synchronizer;
