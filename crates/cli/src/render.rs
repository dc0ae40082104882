// Presentation for reconciliation results.
// Consumes a finished ReconResult only; never touches the engine or files.

use std::fmt::Write as _;

use stocksync_recon::config::ReportFormat;
use stocksync_recon::model::{ReconResult, VarianceEntry, VarianceStatus};

use crate::util::{pad_left, pad_right};

/// Display names for the two datasets.
#[derive(Debug, Clone)]
pub struct Labels {
    pub primary: String,
    pub authoritative: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            primary: "Web".into(),
            authoritative: "Warehouse".into(),
        }
    }
}

pub fn render(result: &ReconResult, format: ReportFormat, labels: &Labels) -> Result<String, String> {
    match format {
        ReportFormat::Html => Ok(render_html(result, labels)),
        ReportFormat::Text => Ok(render_text(result, labels)),
        ReportFormat::Json => render_json(result),
        ReportFormat::Csv => render_csv(&result.report),
    }
}

// ---------------------------------------------------------------------------
// Shared formatting
// ---------------------------------------------------------------------------

/// Human label for a status, as shown to whoever updates the primary side.
pub fn status_label(status: VarianceStatus) -> &'static str {
    match status {
        VarianceStatus::Updated => "Needs Update",
        VarianceStatus::NewlyAdded => "Add to Web, New Stock in Warehouse",
        VarianceStatus::Removed => "Out of stock in Warehouse (Remove from Web)",
        VarianceStatus::StockDepleted => "Out of stock in web, check stock in Warehouse",
    }
}

/// Signed variation with an explicit `+` for increases.
pub fn format_variation(variation: i64) -> String {
    if variation > 0 {
        format!("+{variation}")
    } else {
        variation.to_string()
    }
}

fn variation_class(entry: &VarianceEntry) -> &'static str {
    if entry.is_increase() {
        "variation-positive"
    } else if entry.is_decrease() {
        "variation-negative"
    } else {
        ""
    }
}

/// Two decimals with thousands separators: 1250 -> "1,250.00".
pub fn format_price(price: f64) -> String {
    let fixed = format!("{:.2}", price);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{frac_part}")
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

const HTML_STYLE: &str = "\
body { font-family: sans-serif; margin: 40px; background-color: #f4f7f6; color: #333; }
.container { max-width: 1000px; margin: auto; background: #fff; padding: 20px; border-radius: 8px; box-shadow: 0 2px 15px rgba(0,0,0,0.1); }
h1, h2 { color: #2c3e50; border-bottom: 2px solid #3498db; padding-bottom: 10px; }
p { line-height: 1.6; }
table { width: 100%; border-collapse: collapse; margin: 25px 0; }
th, td { padding: 12px 15px; text-align: left; border-bottom: 1px solid #ddd; }
thead th { background-color: #3498db; color: #ffffff; font-weight: bold; text-transform: uppercase; }
tbody tr:nth-of-type(even) { background-color: #f9f9f9; }
.status-updated { background-color: #f1c40f; color: #333; }
.status-newly_added { background-color: #2ecc71; color: #fff; }
.status-removed { background-color: #e74c3c; color: #fff; }
.status-stock_depleted { background-color: #d35400; color: #fff; }
.variation { font-weight: bold; }
.variation-positive { color: #27ae60; }
.variation-negative { color: #c0392b; }
";

fn html_open(out: &mut String) {
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    out.push_str("<title>Inventory Variance Report</title>\n");
    let _ = write!(out, "<style>\n{HTML_STYLE}</style>\n");
    out.push_str("</head>\n<body>\n<div class=\"container\">\n");
    out.push_str("<h1>Inventory Variance Report</h1>\n");
}

fn html_close(out: &mut String) {
    out.push_str("</div>\n</body>\n</html>\n");
}

pub fn render_html(result: &ReconResult, labels: &Labels) -> String {
    let primary = escape_html(&labels.primary);
    let authoritative = escape_html(&labels.authoritative);

    let mut out = String::new();
    html_open(&mut out);
    let _ = writeln!(
        out,
        "<p>This report compares <strong>{primary}</strong> with the source of truth \
         <strong>{authoritative}</strong>. Variances indicate actions needed to bring \
         {primary} in line.</p>"
    );

    out.push_str("<h2>Detected Variations</h2>\n");
    if result.report.is_empty() {
        let _ = writeln!(
            out,
            "<p>No variations found. {primary} matches {authoritative}.</p>"
        );
    } else {
        out.push_str("<table>\n<thead><tr>");
        let _ = write!(
            out,
            "<th>SKU</th><th>Product</th><th>Status</th><th>Stock in {primary}</th>\
             <th>Stock in {authoritative}</th><th>Variation</th>"
        );
        out.push_str("</tr></thead>\n<tbody>\n");
        for entry in &result.report {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td class=\"status-{}\">{}</td><td>{}</td><td>{}</td>\
                 <td class=\"variation {}\">{}</td></tr>",
                escape_html(&entry.sku),
                escape_html(&entry.name),
                entry.status,
                status_label(entry.status),
                entry.old_stock,
                entry.new_stock,
                variation_class(entry),
                format_variation(entry.variation),
            );
        }
        out.push_str("</tbody>\n</table>\n");
    }

    let _ = writeln!(out, "<h2>Current Inventory in {authoritative} (Source of Truth)</h2>");
    out.push_str("<table>\n<thead><tr><th>SKU</th><th>Product</th><th>Price</th><th>Current Stock</th></tr></thead>\n<tbody>\n");
    for record in result.synchronized_inventory.records() {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&record.sku),
            escape_html(&record.name),
            format_price(record.price),
            record.stock,
        );
    }
    out.push_str("</tbody>\n</table>\n");

    html_close(&mut out);
    out
}

/// Generic failure page. Shows no data: a failed run has none.
pub fn render_html_failure() -> String {
    let mut out = String::new();
    html_open(&mut out);
    out.push_str("<h2>Error</h2>\n");
    out.push_str(
        "<p>An error occurred during processing. Please check that the inventory files \
         exist and are in the correct format.</p>\n",
    );
    html_close(&mut out);
    out
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub fn render_text(result: &ReconResult, labels: &Labels) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Variations ({} vs {})", labels.primary, labels.authoritative);
    if result.report.is_empty() {
        out.push_str("  none\n");
    } else {
        let sku_w = column_width("SKU", result.report.iter().map(|e| e.sku.as_str()));
        let name_w = column_width("PRODUCT", result.report.iter().map(|e| e.name.as_str())).min(32);
        let _ = writeln!(
            out,
            "  {} {} {} {:>8} {:>8} {:>9}",
            pad_right("SKU", sku_w),
            pad_right("PRODUCT", name_w),
            pad_right("STATUS", 14),
            "OLD",
            "NEW",
            "VARIATION"
        );
        for e in &result.report {
            let _ = writeln!(
                out,
                "  {} {} {} {} {} {}",
                pad_right(&e.sku, sku_w),
                pad_right(&e.name, name_w),
                pad_right(e.status.as_str(), 14),
                pad_left(&e.old_stock.to_string(), 8),
                pad_left(&e.new_stock.to_string(), 8),
                pad_left(&format_variation(e.variation), 9),
            );
        }
    }

    out.push('\n');
    let _ = writeln!(out, "Synchronized inventory ({})", labels.authoritative);
    let inventory = &result.synchronized_inventory;
    if inventory.is_empty() {
        out.push_str("  empty\n");
    } else {
        let sku_w = column_width("SKU", inventory.skus());
        let name_w = column_width("PRODUCT", inventory.records().map(|r| r.name.as_str())).min(32);
        let _ = writeln!(
            out,
            "  {} {} {:>12} {:>8}",
            pad_right("SKU", sku_w),
            pad_right("PRODUCT", name_w),
            "PRICE",
            "STOCK"
        );
        for r in inventory.records() {
            let _ = writeln!(
                out,
                "  {} {} {} {}",
                pad_right(&r.sku, sku_w),
                pad_right(&r.name, name_w),
                pad_left(&format_price(r.price), 12),
                pad_left(&r.stock.to_string(), 8),
            );
        }
    }

    out
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(crate::util::display_width)
        .fold(crate::util::display_width(header), usize::max)
}

// ---------------------------------------------------------------------------
// JSON + CSV
// ---------------------------------------------------------------------------

pub fn render_json(result: &ReconResult) -> Result<String, String> {
    serde_json::to_string_pretty(result)
        .map(|mut s| {
            s.push('\n');
            s
        })
        .map_err(|e| format!("JSON serialization error: {e}"))
}

pub fn render_csv(report: &[VarianceEntry]) -> Result<String, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["sku", "name", "status", "old_stock", "new_stock", "variation"])
        .map_err(|e| e.to_string())?;
    for e in report {
        let old_stock = e.old_stock.to_string();
        let new_stock = e.new_stock.to_string();
        let variation = e.variation.to_string();
        writer
            .write_record([
                e.sku.as_str(),
                e.name.as_str(),
                e.status.as_str(),
                old_stock.as_str(),
                new_stock.as_str(),
                variation.as_str(),
            ])
            .map_err(|e| e.to_string())?;
    }
    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

/// One-line summary for stderr.
pub fn summary_line(result: &ReconResult) -> String {
    let s = &result.summary;
    format!(
        "{} variance entries ({} newly added, {} updated, {} stock depleted, {} removed), net variation {}",
        s.total_entries,
        s.newly_added,
        s.updated,
        s.stock_depleted,
        s.removed,
        format_variation(s.net_variation),
    )
}
