use std::path::PathBuf;

use stocksync_recon::config::SyncConfig;
use stocksync_recon::loader::{load_inventory, DuplicatePolicy, LoadMode, LoadOptions};
use stocksync_recon::model::VarianceStatus;
use stocksync_recon::{ReconError, Synchronizer};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn sync_fixtures(primary: &str, authoritative: &str) -> Synchronizer {
    let dir = fixtures_dir();
    let mut sync = Synchronizer::new(dir.join(primary), dir.join(authoritative));
    assert!(sync.synchronize(), "fixture run should succeed");
    sync
}

// -------------------------------------------------------------------------
// Website vs warehouse
// -------------------------------------------------------------------------

#[test]
fn web_vs_warehouse_report() {
    let sync = sync_fixtures("web.csv", "warehouse.csv");
    let rows: Vec<(&str, VarianceStatus, i64, i64, i64)> = sync
        .report()
        .iter()
        .map(|e| (e.sku.as_str(), e.status, e.old_stock, e.new_stock, e.variation))
        .collect();

    assert_eq!(
        rows,
        vec![
            ("SKU-001", VarianceStatus::StockDepleted, 0, 60, 60),
            ("SKU-002", VarianceStatus::StockDepleted, 0, 200, 200),
            ("SKU-003", VarianceStatus::StockDepleted, 0, 180, 180),
            ("SKU-005", VarianceStatus::NewlyAdded, 0, 100, 100),
            ("SKU-004", VarianceStatus::Removed, 0, 0, 0),
        ]
    );
    assert_eq!(sync.report()[0].name, "Laptop Pro X");
    assert_eq!(sync.report()[4].name, "4K Monitor");
}

#[test]
fn web_vs_warehouse_merged_is_warehouse() {
    let dir = fixtures_dir();
    let sync = sync_fixtures("web.csv", "warehouse.csv");
    let warehouse = load_inventory(&dir.join("warehouse.csv"), &LoadOptions::default()).unwrap();

    let merged = sync.synchronized_inventory();
    assert_eq!(merged, warehouse.inventory);
    assert_eq!(
        merged.skus().collect::<Vec<_>>(),
        vec!["SKU-001", "SKU-002", "SKU-003", "SKU-005", "SKU-006"]
    );
    assert!(!merged.contains("SKU-004"));
}

#[test]
fn web_vs_warehouse_summary() {
    let sync = sync_fixtures("web.csv", "warehouse.csv");
    let result = sync.result().unwrap();
    let s = &result.summary;
    assert_eq!(s.primary_records, 5);
    assert_eq!(s.authoritative_records, 5);
    assert_eq!(s.total_entries, 5);
    assert_eq!(s.stock_depleted, 3);
    assert_eq!(s.newly_added, 1);
    assert_eq!(s.removed, 1);
    assert_eq!(s.updated, 0);
    assert_eq!(s.net_variation, 540);
}

#[test]
fn identical_inputs_reconcile_cleanly() {
    let sync = sync_fixtures("warehouse.csv", "warehouse.csv");
    assert!(sync.report().is_empty());
    assert!(sync.result().unwrap().summary.is_reconciled());
}

#[test]
fn json_contract_fields() {
    let sync = sync_fixtures("web.csv", "warehouse.csv");
    let json = serde_json::to_value(sync.result().unwrap()).unwrap();

    let first = &json["report"][0];
    for key in ["sku", "name", "status", "old_stock", "new_stock", "variation"] {
        assert!(first.get(key).is_some(), "report entry missing '{key}'");
    }
    assert_eq!(first["status"], "stock_depleted");

    let product = &json["synchronized_inventory"][0];
    for key in ["sku", "name", "price", "stock"] {
        assert!(product.get(key).is_some(), "inventory record missing '{key}'");
    }
    assert_eq!(json["meta"]["engine_version"], env!("CARGO_PKG_VERSION"));
}

// -------------------------------------------------------------------------
// Lenient vs strict loading
// -------------------------------------------------------------------------

#[test]
fn messy_file_lenient_diagnostics() {
    let loaded = load_inventory(&fixtures_dir().join("messy.csv"), &LoadOptions::default()).unwrap();

    assert_eq!(
        loaded.inventory.skus().collect::<Vec<_>>(),
        vec!["SKU-010", "SKU-012", "SKU-013"]
    );
    assert_eq!(loaded.inventory.get("SKU-010").unwrap().name, "Desk Lamp v2");
    assert_eq!(loaded.inventory.get("SKU-012").unwrap().price, 0.0);
    assert!(!loaded.inventory.contains("SKU-011"));

    let d = &loaded.diagnostics;
    assert_eq!(d.skipped_rows.len(), 1);
    assert_eq!(d.skipped_rows[0].line, 2);
    assert_eq!(d.coerced_fields.len(), 1);
    assert_eq!(d.duplicates.len(), 1);
    assert_eq!(d.duplicates[0].first_line, 1);
    assert_eq!(d.duplicates[0].line, 4);
}

#[test]
fn messy_file_strict_fails() {
    let options = LoadOptions {
        mode: LoadMode::Strict,
        ..LoadOptions::default()
    };
    let err = load_inventory(&fixtures_dir().join("messy.csv"), &options).unwrap_err();
    assert!(matches!(err, ReconError::MalformedRow { line: 2, field_count: 3, .. }));
}

#[test]
fn strict_synchronize_reports_failure() {
    let dir = fixtures_dir();
    let options = LoadOptions {
        on_duplicate: DuplicatePolicy::Error,
        ..LoadOptions::default()
    };
    let mut sync = Synchronizer::new(dir.join("messy.csv"), dir.join("warehouse.csv")).with_options(options);
    assert!(!sync.synchronize());
    assert!(sync.report().is_empty());
}

#[test]
fn missing_primary_aborts_run() {
    let dir = fixtures_dir();
    let mut sync = Synchronizer::new(dir.join("does-not-exist.csv"), dir.join("warehouse.csv"));
    let err = sync.try_synchronize().unwrap_err();
    assert!(err.is_resource());
    assert!(err.to_string().contains("does-not-exist.csv"));
    assert!(sync.synchronized_inventory().is_empty());
}

// -------------------------------------------------------------------------
// Config-driven run
// -------------------------------------------------------------------------

#[test]
fn config_driven_run() {
    let dir = fixtures_dir();
    let toml = std::fs::read_to_string(dir.join("web-warehouse.sync.toml")).unwrap();
    let config = SyncConfig::from_toml(&toml).unwrap();

    let mut sync = Synchronizer::new(config.primary.resolve(&dir), config.authoritative.resolve(&dir))
        .with_options(config.load_options().unwrap());
    let result = sync.try_synchronize().unwrap();

    assert_eq!(config.primary.display_label(), "Website");
    assert_eq!(result.report.len(), 5);
}
