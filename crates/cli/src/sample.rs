// Sample website/warehouse datasets for trying the tool out.

use std::path::{Path, PathBuf};

/// Stock as published on the website: everything shows zero.
pub const SAMPLE_PRIMARY_CSV: &str = "\
SKU-001,Laptop Pro,1200.50,0
SKU-002,Wireless Mouse,25.00,0
SKU-003,USB-C Hub,45.99,0
SKU-004,4K Monitor,350.00,0
SKU-006,Old Keyboard,30.00,0
";

/// Physical stock in the warehouse, the source of truth.
pub const SAMPLE_AUTHORITATIVE_CSV: &str = "\
SKU-001,Laptop Pro X,1250.00,60
SKU-002,Wireless Mouse,25.00,200
SKU-003,USB-C Hub Advanced,45.99,180
SKU-005,Webcam HD,55.00,100
SKU-006,Old Keyboard,30.00,0
";

pub const SAMPLE_PRIMARY_FILE: &str = "inv1.csv";
pub const SAMPLE_AUTHORITATIVE_FILE: &str = "inv2.csv";
pub const SAMPLE_CONFIG_FILE: &str = "sync.toml";

pub fn sample_config() -> String {
    format!(
        r#"name = "Website vs Warehouse"

[primary]
file = "{SAMPLE_PRIMARY_FILE}"
label = "Web"

[authoritative]
file = "{SAMPLE_AUTHORITATIVE_FILE}"
label = "Warehouse"

[load]
mode = "lenient"
on_duplicate = "keep_last"

[output]
format = "html"
path = "report.html"
"#
    )
}

/// Write the sample datasets and job config into `dir`.
///
/// Refuses to overwrite existing files unless `force` is set.
pub fn write_sample(dir: &Path, force: bool) -> Result<Vec<PathBuf>, String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("{}: {e}", dir.display()))?;

    let files = [
        (SAMPLE_PRIMARY_FILE, SAMPLE_PRIMARY_CSV.to_string()),
        (SAMPLE_AUTHORITATIVE_FILE, SAMPLE_AUTHORITATIVE_CSV.to_string()),
        (SAMPLE_CONFIG_FILE, sample_config()),
    ];

    if !force {
        if let Some((name, _)) = files.iter().find(|(name, _)| dir.join(name).exists()) {
            return Err(format!("{} already exists", dir.join(name).display()));
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in &files {
        let path = dir.join(name);
        std::fs::write(&path, contents).map_err(|e| format!("{}: {e}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocksync_recon::loader::{parse_inventory, LoadOptions};
    use stocksync_recon::model::VarianceStatus;
    use stocksync_recon::SyncConfig;

    #[test]
    fn sample_reconciles_as_documented() {
        let opts = LoadOptions::default();
        let web = parse_inventory(SAMPLE_PRIMARY_CSV.as_bytes(), "inv1.csv", &opts).unwrap();
        let warehouse = parse_inventory(SAMPLE_AUTHORITATIVE_CSV.as_bytes(), "inv2.csv", &opts).unwrap();
        let result = stocksync_recon::reconcile(&web.inventory, &warehouse.inventory);

        let statuses: Vec<(&str, VarianceStatus)> =
            result.report.iter().map(|e| (e.sku.as_str(), e.status)).collect();
        assert_eq!(
            statuses,
            vec![
                ("SKU-001", VarianceStatus::StockDepleted),
                ("SKU-002", VarianceStatus::StockDepleted),
                ("SKU-003", VarianceStatus::StockDepleted),
                ("SKU-005", VarianceStatus::NewlyAdded),
                ("SKU-004", VarianceStatus::Removed),
            ]
        );
    }

    #[test]
    fn sample_config_is_valid() {
        let config = SyncConfig::from_toml(&sample_config()).unwrap();
        assert_eq!(config.primary.file, SAMPLE_PRIMARY_FILE);
        assert_eq!(config.authoritative.display_label(), "Warehouse");
    }

    #[test]
    fn write_sample_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_sample(dir.path(), false).unwrap();
        assert_eq!(written.len(), 3);
        assert!(write_sample(dir.path(), false).unwrap_err().contains("already exists"));
        assert!(write_sample(dir.path(), true).is_ok());
    }
}
