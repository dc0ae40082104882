use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ReconError;
use crate::loader::{DuplicatePolicy, LoadMode, LoadOptions};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A reconciliation job, usually read from a `*.sync.toml` file.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub primary: SourceConfig,
    pub authoritative: SourceConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    /// Display label for reports. Defaults to the file name.
    #[serde(default)]
    pub label: Option<String>,
}

impl SourceConfig {
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => Path::new(&self.file)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.file.clone()),
        }
    }

    /// Resolve `file` relative to `base_dir`. Absolute paths are kept.
    pub fn resolve(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.file)
    }
}

// ---------------------------------------------------------------------------
// Load + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LoadConfig {
    #[serde(default)]
    pub mode: LoadMode,
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub has_headers: bool,
}

fn default_delimiter() -> String {
    ",".into()
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            mode: LoadMode::default(),
            on_duplicate: DuplicatePolicy::default(),
            delimiter: default_delimiter(),
            has_headers: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Html,
    Text,
    Json,
    Csv,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: Option<ReportFormat>,
    #[serde(default)]
    pub path: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SyncConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: SyncConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (role, source) in [("primary", &self.primary), ("authoritative", &self.authoritative)] {
            if source.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{role}.file must not be empty")));
            }
        }

        if self.primary.file == self.authoritative.file {
            return Err(ReconError::ConfigValidation(format!(
                "primary and authoritative both point at '{}'",
                self.primary.file
            )));
        }

        delimiter_byte(&self.load.delimiter)?;
        Ok(())
    }

    pub fn load_options(&self) -> Result<LoadOptions, ReconError> {
        Ok(LoadOptions {
            mode: self.load.mode,
            on_duplicate: self.load.on_duplicate,
            delimiter: delimiter_byte(&self.load.delimiter)?,
            has_headers: self.load.has_headers,
        })
    }
}

/// A delimiter must be a single ASCII character other than a quote or line break.
pub fn delimiter_byte(delimiter: &str) -> Result<u8, ReconError> {
    let bytes = delimiter.as_bytes();
    match bytes {
        &[b] if b.is_ascii() && !matches!(b, b'"' | b'\n' | b'\r') => Ok(b),
        _ => Err(ReconError::ConfigValidation(format!(
            "delimiter must be a single ASCII character, got {delimiter:?}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[primary]
file = "inv1.csv"

[authoritative]
file = "inv2.csv"
"#;

    #[test]
    fn parse_minimal_uses_defaults() {
        let config = SyncConfig::from_toml(MINIMAL).unwrap();
        assert!(config.name.is_none());
        assert_eq!(config.primary.display_label(), "inv1.csv");
        assert_eq!(config.load.mode, LoadMode::Lenient);
        assert_eq!(config.load.on_duplicate, DuplicatePolicy::KeepLast);
        assert_eq!(config.load_options().unwrap(), LoadOptions::default());
        assert!(config.output.format.is_none());
    }

    #[test]
    fn parse_full() {
        let input = r#"
name = "Web vs Warehouse"

[primary]
file = "data/inv1.csv"
label = "Website"

[authoritative]
file = "data/inv2.csv"
label = "Warehouse"

[load]
mode = "strict"
on_duplicate = "error"
delimiter = ";"
has_headers = true

[output]
format = "json"
path = "report.json"
"#;
        let config = SyncConfig::from_toml(input).unwrap();
        assert_eq!(config.name.as_deref(), Some("Web vs Warehouse"));
        assert_eq!(config.primary.display_label(), "Website");
        assert_eq!(config.output.format, Some(ReportFormat::Json));
        assert_eq!(config.output.path.as_deref(), Some("report.json"));

        let opts = config.load_options().unwrap();
        assert_eq!(opts.mode, LoadMode::Strict);
        assert_eq!(opts.on_duplicate, DuplicatePolicy::Error);
        assert_eq!(opts.delimiter, b';');
        assert!(opts.has_headers);

        let base = Path::new("/jobs");
        assert_eq!(config.primary.resolve(base), PathBuf::from("/jobs/data/inv1.csv"));
    }

    #[test]
    fn label_defaults_to_file_name() {
        let source = SourceConfig {
            file: "exports/web/inv1.csv".into(),
            label: None,
        };
        assert_eq!(source.display_label(), "inv1.csv");
    }

    #[test]
    fn reject_same_file() {
        let input = r#"
[primary]
file = "inv.csv"
[authoritative]
file = "inv.csv"
"#;
        let err = SyncConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        assert!(err.to_string().contains("inv.csv"));
    }

    #[test]
    fn reject_empty_file() {
        let input = r#"
[primary]
file = ""
[authoritative]
file = "inv.csv"
"#;
        let err = SyncConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("primary.file"));
    }

    #[test]
    fn reject_bad_delimiter() {
        let input = format!("{MINIMAL}\n[load]\ndelimiter = \"::\"\n");
        let err = SyncConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("delimiter"));
        assert!(delimiter_byte("\"").is_err());
        assert_eq!(delimiter_byte("\t").unwrap(), b'\t');
    }

    #[test]
    fn reject_unknown_mode() {
        let input = format!("{MINIMAL}\n[load]\nmode = \"paranoid\"\n");
        let err = SyncConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_missing_authoritative() {
        let err = SyncConfig::from_toml("[primary]\nfile = \"a.csv\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
