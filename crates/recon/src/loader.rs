//! Delimited-text loader: `sku,name,price,stock` rows into an [`Inventory`].
//!
//! Lenient by default. Rows with the wrong field count are skipped and
//! malformed numbers coerce to zero; both are recorded in
//! [`LoadDiagnostics`] so callers can audit what was dropped.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::{Inventory, Record};

/// Number of positional fields in an inventory row.
pub const FIELD_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// Skip malformed rows, coerce malformed numbers to zero.
    #[default]
    Lenient,
    /// Fail on the first malformed row or number.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Last occurrence of a SKU wins.
    #[default]
    KeepLast,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub mode: LoadMode,
    pub on_duplicate: DuplicatePolicy,
    pub delimiter: u8,
    pub has_headers: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            mode: LoadMode::Lenient,
            on_duplicate: DuplicatePolicy::KeepLast,
            delimiter: b',',
            has_headers: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub field_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercedField {
    pub line: u64,
    pub sku: String,
    pub field: String,
    pub raw: String,
}

/// A text field that was not valid UTF-8; invalid bytes became U+FFFD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LossyField {
    pub line: u64,
    pub field: String,
    pub decoded: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSku {
    pub sku: String,
    pub first_line: u64,
    pub line: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadDiagnostics {
    pub skipped_rows: Vec<SkippedRow>,
    pub coerced_fields: Vec<CoercedField>,
    pub lossy_fields: Vec<LossyField>,
    pub duplicates: Vec<DuplicateSku>,
}

impl LoadDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.skipped_rows.is_empty()
            && self.coerced_fields.is_empty()
            && self.lossy_fields.is_empty()
            && self.duplicates.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedInventory {
    pub inventory: Inventory,
    pub diagnostics: LoadDiagnostics,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Open and parse an inventory file.
///
/// A missing or unreadable file is a [`ReconError::Resource`]; nothing is
/// returned for a file that fails partway through.
pub fn load_inventory(path: &Path, options: &LoadOptions) -> Result<LoadedInventory, ReconError> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| ReconError::resource(&source, e))?;
    let loaded = parse_inventory(file, &source, options)?;
    log::debug!(
        "loaded {} records from {} ({} skipped rows)",
        loaded.inventory.len(),
        source,
        loaded.diagnostics.skipped_rows.len()
    );
    Ok(loaded)
}

/// Parse inventory rows from any reader. `source` names the input in errors.
pub fn parse_inventory<R: Read>(
    reader: R,
    source: &str,
    options: &LoadOptions,
) -> Result<LoadedInventory, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.has_headers)
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(reader);

    let strict = options.mode == LoadMode::Strict;
    let mut inventory = Inventory::new();
    let mut diagnostics = LoadDiagnostics::default();
    let mut first_seen: HashMap<String, u64> = HashMap::new();

    // Byte records: a stray Latin-1 byte should not sink the whole file.
    for (i, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|e| ReconError::resource(source, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(i as u64 + 1);

        if record.len() != FIELD_COUNT {
            if strict {
                return Err(ReconError::MalformedRow {
                    source: source.into(),
                    line,
                    field_count: record.len(),
                });
            }
            log::debug!("{source}, line {line}: skipping row with {} fields", record.len());
            diagnostics.skipped_rows.push(SkippedRow {
                line,
                field_count: record.len(),
            });
            continue;
        }

        let mut decode = |index: usize, field: &str| {
            decode_field(&record[index], field, source, line, strict, &mut diagnostics)
        };
        let sku = decode(0, "sku")?;
        let name = decode(1, "name")?;
        let price_raw = decode(2, "price")?;
        let stock_raw = decode(3, "stock")?;
        let (price_raw, stock_raw) = (price_raw.as_str(), stock_raw.as_str());

        let price = match parse_price(price_raw) {
            Some(v) => v,
            None if strict => return Err(invalid_number(source, line, "price", price_raw)),
            None => {
                diagnostics.coerced_fields.push(coerced(line, &sku, "price", price_raw));
                coerce_price(price_raw)
            }
        };

        let stock = match parse_stock(stock_raw) {
            Some(v) => v,
            None if strict => return Err(invalid_number(source, line, "stock", stock_raw)),
            None => {
                diagnostics.coerced_fields.push(coerced(line, &sku, "stock", stock_raw));
                coerce_stock(stock_raw)
            }
        };

        if let Some(&first_line) = first_seen.get(&sku) {
            if options.on_duplicate == DuplicatePolicy::Error {
                return Err(ReconError::DuplicateSku {
                    source: source.into(),
                    sku,
                    first_line,
                    line,
                });
            }
            log::warn!("{source}, line {line}: duplicate SKU '{sku}' overwrites line {first_line}");
            diagnostics.duplicates.push(DuplicateSku {
                sku: sku.clone(),
                first_line,
                line,
            });
        } else {
            first_seen.insert(sku.clone(), line);
        }

        inventory.insert(Record {
            sku,
            name,
            price,
            stock,
        });
    }

    Ok(LoadedInventory {
        inventory,
        diagnostics,
    })
}

/// UTF-8 decode one field. Invalid bytes become U+FFFD and are recorded,
/// or rejected in strict mode.
fn decode_field(
    bytes: &[u8],
    field: &str,
    source: &str,
    line: u64,
    strict: bool,
    diagnostics: &mut LoadDiagnostics,
) -> Result<String, ReconError> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }
    if strict {
        return Err(ReconError::InvalidEncoding {
            source: source.into(),
            line,
            field: field.into(),
        });
    }
    let decoded = String::from_utf8_lossy(bytes).into_owned();
    log::debug!("{source}, line {line}: {field} is not valid UTF-8, decoded lossily");
    diagnostics.lossy_fields.push(LossyField {
        line,
        field: field.into(),
        decoded: decoded.clone(),
    });
    Ok(decoded)
}

fn invalid_number(source: &str, line: u64, field: &str, value: &str) -> ReconError {
    ReconError::InvalidNumber {
        source: source.into(),
        line,
        field: field.into(),
        value: value.into(),
    }
}

fn coerced(line: u64, sku: &str, field: &str, raw: &str) -> CoercedField {
    log::debug!("line {line}: coercing {field} '{raw}' for SKU '{sku}'");
    CoercedField {
        line,
        sku: sku.into(),
        field: field.into(),
        raw: raw.into(),
    }
}

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

/// Parse a price that is numeric in full (surrounding whitespace allowed).
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a stock count that is numeric in full. Decimal text truncates
/// toward zero.
pub fn parse_stock(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    parse_price(trimmed).map(|v| v.trunc() as i64)
}

/// Permissive float cast: full parse, else the leading numeric prefix, else 0.
pub fn coerce_price(raw: &str) -> f64 {
    parse_price(raw)
        .or_else(|| numeric_prefix(raw.trim_start()).parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Permissive integer cast: full parse, else the leading numeric prefix, else 0.
pub fn coerce_stock(raw: &str) -> i64 {
    parse_stock(raw)
        .or_else(|| parse_stock(numeric_prefix(raw.trim_start())))
        .unwrap_or(0)
}

/// Longest prefix of the form `[+-]?digits[.digits][e[+-]digits]`, or ""
/// when there are no digits.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }

    if !has_digits {
        return "";
    }

    // Exponent only counts when digits follow it: "1e3x" -> "1e3", "2e" -> "2".
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    &s[..end]
}
