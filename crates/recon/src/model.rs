use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::loader::LoadDiagnostics;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One inventory line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub stock: i64,
}

impl Record {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price: f64, stock: i64) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            price,
            stock,
        }
    }
}

/// Records keyed by SKU, iterated in first-insertion order.
///
/// Re-inserting an existing SKU replaces the record but keeps its original
/// position, the same way an associative array overwrite behaves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    records: IndexMap<String, Record>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns the replaced record, if any.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.sku.clone(), record)
    }

    pub fn get(&self, sku: &str) -> Option<&Record> {
        self.records.get(sku)
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.records.contains_key(sku)
    }

    /// Remove a SKU, shifting later entries up so iteration order is kept.
    pub fn remove(&mut self, sku: &str) -> Option<Record> {
        self.records.shift_remove(sku)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.records.iter().map(|(sku, r)| (sku.as_str(), r))
    }

    pub fn skus(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(|k| k.as_str())
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }
}

impl FromIterator<Record> for Inventory {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut inventory = Inventory::new();
        for record in iter {
            inventory.insert(record);
        }
        inventory
    }
}

impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.records.values())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    NewlyAdded,
    Updated,
    Removed,
    /// Primary held zero stock and the authoritative source holds some.
    /// The name is kept for compatibility with existing report consumers
    /// even though the stock is being replenished.
    StockDepleted,
}

impl VarianceStatus {
    pub const ALL: [VarianceStatus; 4] = [
        Self::NewlyAdded,
        Self::Updated,
        Self::Removed,
        Self::StockDepleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewlyAdded => "newly_added",
            Self::Updated => "updated",
            Self::Removed => "removed",
            Self::StockDepleted => "stock_depleted",
        }
    }
}

impl std::fmt::Display for VarianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VarianceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown variance status: {s:?}"))
    }
}

/// One row of the variance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarianceEntry {
    pub sku: String,
    pub name: String,
    pub status: VarianceStatus,
    pub old_stock: i64,
    pub new_stock: i64,
    pub variation: i64,
}

impl VarianceEntry {
    pub fn is_increase(&self) -> bool {
        self.variation > 0
    }

    pub fn is_decrease(&self) -> bool {
        self.variation < 0
    }
}

/// Output of the pure reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub report: Vec<VarianceEntry>,
    pub merged: Inventory,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub primary_records: usize,
    pub authoritative_records: usize,
    pub total_entries: usize,
    pub newly_added: usize,
    pub updated: usize,
    pub removed: usize,
    pub stock_depleted: usize,
    pub net_variation: i64,
    pub status_counts: IndexMap<String, usize>,
}

impl ReconSummary {
    /// No variance entries: both datasets already agree on stock.
    pub fn is_reconciled(&self) -> bool {
        self.total_entries == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconMeta {
    pub primary_source: String,
    pub authoritative_source: String,
    pub engine_version: String,
    pub run_at: String,
}

impl ReconMeta {
    pub fn new(primary_source: impl Into<String>, authoritative_source: impl Into<String>) -> Self {
        Self {
            primary_source: primary_source.into(),
            authoritative_source: authoritative_source.into(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunDiagnostics {
    pub primary: LoadDiagnostics,
    pub authoritative: LoadDiagnostics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub report: Vec<VarianceEntry>,
    pub synchronized_inventory: Inventory,
    pub diagnostics: RunDiagnostics,
}
