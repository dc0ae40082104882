use indexmap::IndexMap;

use crate::model::{Inventory, ReconSummary, VarianceEntry, VarianceStatus};

/// Compute summary statistics from a variance report.
pub fn compute_summary(
    report: &[VarianceEntry],
    primary: &Inventory,
    authoritative: &Inventory,
) -> ReconSummary {
    let mut status_counts: IndexMap<String, usize> = VarianceStatus::ALL
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    let mut newly_added = 0;
    let mut updated = 0;
    let mut removed = 0;
    let mut stock_depleted = 0;
    let mut net_variation = 0i64;

    for entry in report {
        *status_counts.entry(entry.status.to_string()).or_insert(0) += 1;
        net_variation = net_variation.saturating_add(entry.variation);

        match entry.status {
            VarianceStatus::NewlyAdded => newly_added += 1,
            VarianceStatus::Updated => updated += 1,
            VarianceStatus::Removed => removed += 1,
            VarianceStatus::StockDepleted => stock_depleted += 1,
        }
    }

    ReconSummary {
        primary_records: primary.len(),
        authoritative_records: authoritative.len(),
        total_entries: report.len(),
        newly_added,
        updated,
        removed,
        stock_depleted,
        net_variation,
        status_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: VarianceStatus, variation: i64) -> VarianceEntry {
        VarianceEntry {
            sku: "k".into(),
            name: "n".into(),
            status,
            old_stock: 0,
            new_stock: variation,
            variation,
        }
    }

    #[test]
    fn summary_counts() {
        let report = vec![
            entry(VarianceStatus::StockDepleted, 60),
            entry(VarianceStatus::StockDepleted, 200),
            entry(VarianceStatus::NewlyAdded, 100),
            entry(VarianceStatus::Updated, -5),
            entry(VarianceStatus::Removed, -30),
        ];
        let summary = compute_summary(&report, &Inventory::new(), &Inventory::new());
        assert_eq!(summary.total_entries, 5);
        assert_eq!(summary.stock_depleted, 2);
        assert_eq!(summary.newly_added, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.net_variation, 325);
        assert_eq!(summary.status_counts["stock_depleted"], 2);
        assert!(!summary.is_reconciled());
    }

    #[test]
    fn empty_report_is_reconciled() {
        let summary = compute_summary(&[], &Inventory::new(), &Inventory::new());
        assert!(summary.is_reconciled());
        assert_eq!(summary.status_counts.len(), 4);
        assert!(summary.status_counts.values().all(|&c| c == 0));
    }
}
