//! Reconciliation of available and applied migrations.
//!
//! All functions here are pure. Identifiers are matched by exact string
//! equality.

use super::id::MigrationId;
use std::collections::HashSet;

/// Available identifiers absent from `applied`, in `available` order.
pub fn compute_pending(available: &[MigrationId], applied: &[MigrationId]) -> Vec<MigrationId> {
    let applied: HashSet<&MigrationId> = applied.iter().collect();
    available
        .iter()
        .filter(|id| !applied.contains(id))
        .cloned()
        .collect()
}

/// Applied identifiers that the source no longer provides.
pub fn orphaned(available: &[MigrationId], applied: &[MigrationId]) -> Vec<MigrationId> {
    compute_pending(applied, available)
}

/// The leading `min(count, pending.len())` pending identifiers.
///
/// `None` selects every pending migration.
pub fn select_apply(pending: &[MigrationId], count: Option<usize>) -> Vec<MigrationId> {
    let take = count.map_or(pending.len(), |n| n.min(pending.len()));
    pending[..take].to_vec()
}

/// The rollback batch, most recently applied first.
///
/// `applied` is in application order; the batch comes from its newest end.
pub fn select_rollback(applied: &[MigrationId], count: usize) -> Vec<MigrationId> {
    applied.iter().rev().take(count).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<MigrationId> {
        names.iter().map(|n| MigrationId::new(*n)).collect()
    }

    #[test]
    fn test_pending_preserves_available_order() {
        let available = ids(&["m1", "m2", "m3"]);
        let applied = ids(&["m2"]);
        assert_eq!(compute_pending(&available, &applied), ids(&["m1", "m3"]));
    }

    #[test]
    fn test_pending_disjoint_and_overlapping() {
        let available = ids(&["m1", "m2", "m3", "m4"]);

        assert_eq!(compute_pending(&available, &[]), available);
        assert_eq!(compute_pending(&available, &ids(&["x", "y"])), available);
        assert_eq!(
            compute_pending(&available, &ids(&["m4", "m1", "m3"])),
            ids(&["m2"])
        );
        assert!(compute_pending(&available, &available).is_empty());
        assert!(compute_pending(&[], &available).is_empty());
    }

    #[test]
    fn test_pending_exact_match_only() {
        let available = ids(&["m1", "M2"]);
        let applied = ids(&["M1", "m2", " m1"]);
        assert_eq!(compute_pending(&available, &applied), available);
    }

    #[test]
    fn test_orphaned() {
        let available = ids(&["m1", "m3"]);
        let applied = ids(&["m1", "m2"]);
        assert_eq!(orphaned(&available, &applied), ids(&["m2"]));
    }

    #[test]
    fn test_select_apply() {
        let pending = ids(&["m1", "m2", "m3"]);
        assert_eq!(select_apply(&pending, None), pending);
        assert_eq!(select_apply(&pending, Some(2)), ids(&["m1", "m2"]));
        assert_eq!(select_apply(&pending, Some(10)), pending);
        assert!(select_apply(&pending, Some(0)).is_empty());
        assert!(select_apply(&[], None).is_empty());
    }

    #[test]
    fn test_select_rollback_takes_newest_first() {
        let applied = ids(&["m1", "m2", "m3"]);
        assert_eq!(select_rollback(&applied, 2), ids(&["m3", "m2"]));
        assert_ne!(select_rollback(&applied, 2), ids(&["m1", "m2"]));
    }

    #[test]
    fn test_select_rollback_bounds() {
        let applied = ids(&["m1", "m2", "m3"]);
        assert_eq!(select_rollback(&applied, 5), ids(&["m3", "m2", "m1"]));
        assert!(select_rollback(&applied, 0).is_empty());
        assert!(select_rollback(&[], 3).is_empty());
    }
}
