use std::collections::HashSet;

/// Multi-select over the current view. Indices are view-relative: they refer to
/// positions in the filtered, sorted order the user is looking at.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: HashSet<String>,
    last_index: Option<usize>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Toggle `id` at `view_index`. With `shift_held` and a previous index, every
    /// id between the two positions (inclusive) is added instead. The last index
    /// moves to `view_index` either way.
    pub fn toggle<S: AsRef<str>>(
        &mut self,
        id: &str,
        view_index: usize,
        shift_held: bool,
        view_ids: &[S],
    ) {
        match self.last_index {
            Some(last) if shift_held => {
                let (lo, hi) = if last <= view_index {
                    (last, view_index)
                } else {
                    (view_index, last)
                };
                let hi = hi.min(view_ids.len().saturating_sub(1));
                if lo <= hi {
                    for vid in &view_ids[lo..=hi] {
                        self.ids.insert(vid.as_ref().to_string());
                    }
                }
            }
            _ => {
                if !self.ids.remove(id) {
                    self.ids.insert(id.to_string());
                }
            }
        }
        self.last_index = Some(view_index);
    }

    pub fn select_all<S: AsRef<str>>(&mut self, view_ids: &[S]) {
        self.ids = view_ids.iter().map(|s| s.as_ref().to_string()).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.last_index = None;
    }

    /// True only when the view is non-empty and the selection is exactly the
    /// set of ids in it.
    pub fn all_selected<S: AsRef<str>>(&self, view_ids: &[S]) -> bool {
        !view_ids.is_empty()
            && self.ids.len() == view_ids.len()
            && view_ids.iter().all(|id| self.ids.contains(id.as_ref()))
    }

    /// Drop every selected id that is not in the view. Returns how many were dropped.
    pub fn retain_view<S: AsRef<str>>(&mut self, view_ids: &[S]) -> usize {
        let visible: HashSet<&str> = view_ids.iter().map(|s| s.as_ref()).collect();
        let before = self.ids.len();
        self.ids.retain(|id| visible.contains(id.as_str()));
        before - self.ids.len()
    }

    pub fn reset_anchor(&mut self) {
        self.last_index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("t{i}")).collect()
    }

    fn sorted(sel: &Selection) -> Vec<&str> {
        let mut v: Vec<&str> = sel.ids().collect();
        v.sort();
        v
    }

    #[test]
    fn test_toggle_single() {
        let ids = view(5);
        let mut sel = Selection::default();
        sel.toggle("t2", 2, false, &ids);
        assert!(sel.contains("t2"));
        assert_eq!(sel.last_index(), Some(2));

        sel.toggle("t2", 2, false, &ids);
        assert!(sel.is_empty());
        assert_eq!(sel.last_index(), Some(2));
    }

    #[test]
    fn test_shift_range_select() {
        let ids = view(5);
        let mut sel = Selection::default();
        sel.toggle("t1", 1, false, &ids);
        sel.toggle("t3", 3, true, &ids);
        assert_eq!(sorted(&sel), vec!["t1", "t2", "t3"]);
        assert_eq!(sel.last_index(), Some(3));
    }

    #[test]
    fn test_shift_range_backwards() {
        let ids = view(6);
        let mut sel = Selection::default();
        sel.toggle("t4", 4, false, &ids);
        sel.toggle("t1", 1, true, &ids);
        assert_eq!(sorted(&sel), vec!["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn test_shift_without_anchor_toggles() {
        let ids = view(3);
        let mut sel = Selection::default();
        sel.toggle("t2", 2, true, &ids);
        assert_eq!(sorted(&sel), vec!["t2"]);
    }

    #[test]
    fn test_shift_range_adds_even_if_anchor_was_deselected() {
        let ids = view(5);
        let mut sel = Selection::default();
        sel.toggle("t0", 0, false, &ids);
        sel.toggle("t0", 0, false, &ids);
        sel.toggle("t2", 2, true, &ids);
        assert_eq!(sorted(&sel), vec!["t0", "t1", "t2"]);
    }

    #[test]
    fn test_select_all_and_clear() {
        let ids = view(4);
        let mut sel = Selection::default();
        assert!(!sel.all_selected(&ids));
        sel.select_all(&ids);
        assert_eq!(sel.len(), 4);
        assert!(sel.all_selected(&ids));
        sel.clear();
        assert!(sel.is_empty());
        assert_eq!(sel.last_index(), None);
    }

    #[test]
    fn test_all_selected_requires_same_ids() {
        let ids = view(2);
        let mut sel = Selection::default();
        sel.select_all(&["t0", "x9"]);
        assert_eq!(sel.len(), ids.len());
        assert!(!sel.all_selected(&ids));
    }

    #[test]
    fn test_all_selected_empty_view() {
        let sel = Selection::default();
        let empty: Vec<String> = vec![];
        assert!(!sel.all_selected(&empty));
    }

    #[test]
    fn test_retain_view() {
        let ids = view(5);
        let mut sel = Selection::default();
        sel.select_all(&ids);
        let dropped = sel.retain_view(&ids[..2]);
        assert_eq!(dropped, 3);
        assert_eq!(sorted(&sel), vec!["t0", "t1"]);
    }
}
