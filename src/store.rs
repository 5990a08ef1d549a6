use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};

use crate::catalog::{Catalog, UNCATEGORIZED_ID};
use crate::filters::{filter_transactions, FilterState};
use crate::models::{CategorySource, Transaction};
use crate::selection::Selection;
use crate::sorting::{sort_transactions, SortField, SortState};

/// Assign `category_id` to every selected, non-deleted transaction, mark the
/// assignment as manual and clear the selection. The sentinel id clears the
/// category. Returns the number of rows changed.
pub fn apply_bulk_category(
    transactions: &mut [Transaction],
    selection: &mut Selection,
    category_id: &str,
) -> usize {
    let now = Utc::now();
    let new_category = if category_id == UNCATEGORIZED_ID {
        None
    } else {
        Some(category_id.to_string())
    };
    let mut changed = 0;
    for txn in transactions
        .iter_mut()
        .filter(|t| !t.is_deleted && selection.contains(&t.id))
    {
        txn.category_id = new_category.clone();
        txn.category_source = CategorySource::Manual;
        txn.updated_at = now;
        changed += 1;
    }
    selection.clear();
    changed
}

/// Soft-delete every selected transaction and clear the selection.
pub fn apply_bulk_delete(transactions: &mut [Transaction], selection: &mut Selection) -> usize {
    let now = Utc::now();
    let mut changed = 0;
    for txn in transactions
        .iter_mut()
        .filter(|t| !t.is_deleted && selection.contains(&t.id))
    {
        txn.is_deleted = true;
        txn.updated_at = now;
        changed += 1;
    }
    selection.clear();
    changed
}

/// Income/expense totals over the visible, non-hidden rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewTotals {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    pub count: usize,
}

/// Sole owner of the working set of transactions. Every mutation goes through
/// here, and the filtered/sorted view is recomputed after each one.
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    catalog: Catalog,
    filter: FilterState,
    sort: SortState,
    selection: Selection,
    /// Indices into `transactions`, in display order.
    view: Vec<usize>,
}

impl TransactionStore {
    pub fn new(transactions: Vec<Transaction>, catalog: Catalog) -> Self {
        let mut store = Self {
            transactions,
            catalog,
            filter: FilterState::default(),
            sort: SortState::default(),
            selection: Selection::default(),
            view: Vec::new(),
        };
        store.recompute();
        store
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    fn recompute(&mut self) {
        let index_of: HashMap<&str, usize> = self
            .transactions
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();
        let visible = sort_transactions(
            filter_transactions(&self.transactions, &self.filter),
            self.sort,
            &self.catalog,
        );
        self.view = visible
            .iter()
            .filter_map(|t| index_of.get(t.id.as_str()).copied())
            .collect();

        let view_ids = self.view_ids();
        let dropped = self.selection.retain_view(&view_ids);
        debug!(
            rows = self.view.len(),
            dropped_from_selection = dropped,
            sort = %self.sort,
            "recomputed transaction view"
        );
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
        self.selection.reset_anchor();
        self.recompute();
    }

    pub fn update_filter(&mut self, f: impl FnOnce(&mut FilterState)) {
        f(&mut self.filter);
        self.selection.reset_anchor();
        self.recompute();
    }

    pub fn reset_filters(&mut self) {
        self.set_filter(FilterState::default());
    }

    /// Column-header click: same field flips direction, new field sorts descending.
    pub fn sort_by(&mut self, field: SortField) {
        self.sort.toggle(field);
        self.selection.reset_anchor();
        self.recompute();
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
        self.selection.reset_anchor();
        self.recompute();
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    pub fn view(&self) -> Vec<&Transaction> {
        self.view.iter().map(|&i| &self.transactions[i]).collect()
    }

    pub fn view_row(&self, view_index: usize) -> Option<&Transaction> {
        self.view.get(view_index).map(|&i| &self.transactions[i])
    }

    pub fn view_ids(&self) -> Vec<String> {
        self.view
            .iter()
            .map(|&i| self.transactions[i].id.clone())
            .collect()
    }

    pub fn toggle_selection(&mut self, view_index: usize, shift_held: bool) {
        let Some(id) = self.view_row(view_index).map(|t| t.id.clone()) else {
            return;
        };
        let view_ids = self.view_ids();
        self.selection.toggle(&id, view_index, shift_held, &view_ids);
    }

    pub fn select_all(&mut self) {
        let view_ids = self.view_ids();
        self.selection.select_all(&view_ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn all_selected(&self) -> bool {
        self.selection.all_selected(&self.view_ids())
    }

    pub fn bulk_set_category(&mut self, category_id: &str) -> usize {
        let changed = apply_bulk_category(&mut self.transactions, &mut self.selection, category_id);
        info!(changed, category_id, "bulk category change");
        self.recompute();
        changed
    }

    pub fn bulk_delete(&mut self) -> usize {
        let changed = apply_bulk_delete(&mut self.transactions, &mut self.selection);
        info!(changed, "bulk soft delete");
        self.recompute();
        changed
    }

    /// Returns false if `id` is unknown or deleted.
    pub fn set_notes(&mut self, id: &str, notes: &str) -> bool {
        let Some(txn) = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id && !t.is_deleted)
        else {
            return false;
        };
        txn.notes = notes.trim().to_string();
        txn.updated_at = Utc::now();
        self.recompute();
        true
    }

    /// Flip the hidden-from-reports flag. Returns the new state.
    pub fn toggle_hidden(&mut self, id: &str) -> Option<bool> {
        let txn = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id && !t.is_deleted)?;
        txn.is_hidden = !txn.is_hidden;
        txn.updated_at = Utc::now();
        let hidden = txn.is_hidden;
        debug!(id, hidden, "toggled hidden flag");
        Some(hidden)
    }

    pub fn totals(&self) -> ViewTotals {
        let mut totals = ViewTotals::default();
        for t in self.view().into_iter().filter(|t| !t.is_hidden) {
            if t.amount >= 0.0 {
                totals.income += t.amount;
            } else {
                totals.expenses += t.amount;
            }
            totals.count += 1;
        }
        totals.net = totals.income + totals.expenses;
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionStatus;
    use crate::sorting::SortDirection;
    use crate::test_utils::{txn, txns};

    fn store(n: usize) -> TransactionStore {
        TransactionStore::new(txns(n), Catalog::standard())
    }

    #[test]
    fn test_default_view_is_date_descending() {
        let s = store(4);
        let ids: Vec<&str> = s.view().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t2", "t1", "t0"]);
    }

    #[test]
    fn test_bulk_category_sets_manual_and_clears_selection() {
        let mut all = txns(5);
        for t in &mut all {
            t.category_id = Some("cat_5".to_string());
        }
        let before = all[0].updated_at;
        let mut sel = Selection::default();
        let ids: Vec<String> = all.iter().map(|t| t.id.clone()).collect();
        sel.toggle("t0", 0, false, &ids);
        sel.toggle("t2", 2, true, &ids);
        assert_eq!(sel.len(), 3);

        let changed = apply_bulk_category(&mut all, &mut sel, "cat_2");
        assert_eq!(changed, 3);
        assert_eq!(sel.len(), 0);
        for t in &all[..3] {
            assert_eq!(t.category_id.as_deref(), Some("cat_2"));
            assert_eq!(t.category_source, CategorySource::Manual);
            assert!(t.updated_at >= before);
        }
        assert_eq!(all[3].category_id.as_deref(), Some("cat_5"));
        assert_eq!(all[3].category_source, CategorySource::Automatic);
    }

    #[test]
    fn test_bulk_category_sentinel_clears() {
        let mut all = vec![txn("a", -1.0)];
        let mut sel = Selection::default();
        sel.select_all(&["a"]);
        apply_bulk_category(&mut all, &mut sel, UNCATEGORIZED_ID);
        assert_eq!(all[0].category_id, None);
    }

    #[test]
    fn test_bulk_delete_marks_exactly_selected() {
        let mut s = store(6);
        // view order: t5 t4 t3 t2 t1 t0
        s.toggle_selection(0, false);
        s.toggle_selection(1, false);
        s.toggle_selection(4, false);
        assert_eq!(s.selection().len(), 3);

        let deleted = s.bulk_delete();
        assert_eq!(deleted, 3);
        assert!(s.selection().is_empty());

        let flagged: Vec<&str> = s
            .transactions()
            .iter()
            .filter(|t| t.is_deleted)
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(flagged, vec!["t1", "t4", "t5"]);

        let visible: Vec<&str> = s.view().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(visible, vec!["t3", "t2", "t0"]);
        assert_eq!(s.transactions().len(), 6);
    }

    #[test]
    fn test_store_shift_select_uses_view_order() {
        let mut s = store(5);
        s.sort_by(SortField::Date); // now ascending: t0..t4
        s.toggle_selection(1, false);
        s.toggle_selection(3, true);
        let mut ids: Vec<&str> = s.selection().ids().collect();
        ids.sort();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_filter_change_prunes_selection() {
        let mut s = store(4);
        s.select_all();
        assert!(s.all_selected());
        s.update_filter(|f| f.search = "t2".to_string());
        assert_eq!(s.view_len(), 1);
        let ids: Vec<&str> = s.selection().ids().collect();
        assert_eq!(ids, vec!["t2"]);
        assert!(s.all_selected());
        assert_eq!(s.selection().last_index(), None);
    }

    #[test]
    fn test_bulk_category_refreshes_category_filter() {
        let mut s = store(3);
        s.update_filter(|f| {
            f.categories.insert("cat_2".to_string());
        });
        assert_eq!(s.view_len(), 3);
        s.toggle_selection(0, false);
        s.bulk_set_category("cat_4");
        assert_eq!(s.view_len(), 2);
    }

    #[test]
    fn test_sort_by_toggles() {
        let mut s = store(2);
        s.sort_by(SortField::Amount);
        assert_eq!(s.sort(), SortState::new(SortField::Amount, SortDirection::Descending));
        s.sort_by(SortField::Amount);
        assert_eq!(s.sort().direction, SortDirection::Ascending);
    }

    #[test]
    fn test_set_notes_and_search() {
        let mut s = store(3);
        assert!(s.set_notes("t1", "  reimbursable  "));
        assert_eq!(s.get("t1").unwrap().notes, "reimbursable");
        s.update_filter(|f| f.search = "REIMB".to_string());
        assert_eq!(s.view_len(), 1);
        assert!(!s.set_notes("nope", "x"));
    }

    #[test]
    fn test_hidden_excluded_from_totals_not_view() {
        let mut s = TransactionStore::new(
            vec![txn("a", -40.0), txn("b", 100.0), txn("c", -10.0)],
            Catalog::standard(),
        );
        assert_eq!(s.toggle_hidden("c"), Some(true));
        assert_eq!(s.view_len(), 3);
        let totals = s.totals();
        assert_eq!(totals.count, 2);
        assert_eq!(totals.income, 100.0);
        assert_eq!(totals.expenses, -40.0);
        assert_eq!(totals.net, 60.0);
    }

    #[test]
    fn test_deleted_rows_cannot_be_edited() {
        let mut all = txns(2);
        all[0].is_deleted = true;
        let mut s = TransactionStore::new(all, Catalog::standard());
        assert_eq!(s.toggle_hidden("t0"), None);
        assert!(!s.set_notes("t0", "x"));
    }

    #[test]
    fn test_status_filter_through_store() {
        let mut all = txns(3);
        all[0].status = TransactionStatus::Pending;
        let mut s = TransactionStore::new(all, Catalog::standard());
        s.update_filter(|f| {
            f.statuses.insert(TransactionStatus::Pending);
        });
        assert_eq!(s.view_ids(), vec!["t0".to_string()]);
        s.reset_filters();
        assert_eq!(s.view_len(), 3);
    }
}
