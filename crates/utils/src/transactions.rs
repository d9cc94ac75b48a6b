use models::Transaction;
use std::collections::HashSet;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub duplicates: usize,
    pub total: usize,
}

/// Merge newly parsed transactions into the stored set with duplicate
/// detection, keyed on the content-derived `id`. Ids are stable across
/// re-parses of identical rows, so re-uploading a statement adds nothing.
pub fn merge_transactions_with_deduplication(
    mut existing: Vec<Transaction>,
    new_txns: Vec<Transaction>,
) -> (Vec<Transaction>, MergeStats) {
    let mut seen: HashSet<String> = existing.iter().map(|t| t.id.clone()).collect();
    let mut stats = MergeStats {
        total: new_txns.len(),
        ..Default::default()
    };

    for txn in new_txns {
        if seen.contains(&txn.id) {
            stats.duplicates += 1;
            continue;
        }
        seen.insert(txn.id.clone());
        existing.push(txn);
        stats.added += 1;
    }

    (existing, stats)
}

/// Sort transactions in-place by date ascending.
///
/// Sorting is stable. Transactions without a date are placed at the end,
/// preserving their relative order.
pub fn sort_transactions_by_date(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| match (a.date, b.date) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
