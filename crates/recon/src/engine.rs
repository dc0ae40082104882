use crate::model::{
    Inventory, ReconMeta, ReconResult, Reconciliation, RunDiagnostics, VarianceEntry, VarianceStatus,
};
use crate::summary::compute_summary;

/// Compare `primary` against `authoritative`.
///
/// Report order: every authoritative-side entry in authoritative order,
/// then every removal in primary order. The merged inventory is a copy of
/// `authoritative`. Variations saturate at the `i64` bounds.
pub fn reconcile(primary: &Inventory, authoritative: &Inventory) -> Reconciliation {
    let mut report = Vec::new();

    for (sku, current) in authoritative.iter() {
        let previous = primary.get(sku);
        let old_stock = previous.map(|r| r.stock).unwrap_or(0);

        if old_stock == current.stock {
            continue;
        }

        let status = match previous {
            None => VarianceStatus::NewlyAdded,
            Some(_) if old_stock == 0 => VarianceStatus::StockDepleted,
            Some(_) => VarianceStatus::Updated,
        };

        report.push(VarianceEntry {
            sku: sku.to_string(),
            name: current.name.clone(),
            status,
            old_stock,
            new_stock: current.stock,
            variation: current.stock.saturating_sub(old_stock),
        });
    }

    for (sku, previous) in primary.iter() {
        if authoritative.contains(sku) {
            continue;
        }
        report.push(VarianceEntry {
            sku: sku.to_string(),
            name: previous.name.clone(),
            status: VarianceStatus::Removed,
            old_stock: previous.stock,
            new_stock: 0,
            variation: previous.stock.saturating_neg(),
        });
    }

    Reconciliation {
        report,
        merged: authoritative.clone(),
    }
}

/// Reconcile and attach summary, metadata and load diagnostics.
pub fn run(
    primary: &Inventory,
    authoritative: &Inventory,
    meta: ReconMeta,
    diagnostics: RunDiagnostics,
) -> ReconResult {
    let Reconciliation { report, merged } = reconcile(primary, authoritative);
    let summary = compute_summary(&report, primary, authoritative);

    log::info!(
        "reconciled {} primary / {} authoritative records: {} variance entries",
        summary.primary_records,
        summary.authoritative_records,
        summary.total_entries
    );

    ReconResult {
        meta,
        summary,
        report,
        synchronized_inventory: merged,
        diagnostics,
    }
}
