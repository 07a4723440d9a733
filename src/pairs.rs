//! Uncombined phoneme-pair inventory.
//!
//! Two multimaps, `right → [left…]` and `left → [right…]`, describe the same
//! set of pairs from either side.  A pair is present in one map iff it is
//! present in the other; consuming from one side removes the matching entry
//! from the other side in the same call, and a key whose list empties is
//! dropped.  Keys and values keep table order, so greedy consumers make the
//! same choices on every run.

use indexmap::IndexMap;

use crate::table::SyllableIndex;

/// Which phoneme a line holds fixed while the other side varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Pivot on a right phoneme; lines vary their left phonemes.
    ByRight,
    /// Pivot on a left phoneme; lines vary their right phonemes.
    ByLeft,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::ByRight => Orientation::ByLeft,
            Orientation::ByLeft => Orientation::ByRight,
        }
    }

    /// Rebuild `(left, right)` from a pivot and one of its partners.
    pub fn pair<'a>(self, pivot: &'a str, partner: &'a str) -> (&'a str, &'a str) {
        match self {
            Orientation::ByRight => (partner, pivot),
            Orientation::ByLeft => (pivot, partner),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ordered multimap helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Key → values, keys in first-seen order.
type Multimap = IndexMap<String, Vec<String>>;

/// Remove and return up to `count` values from the front of `key`'s list.
fn take_front(map: &mut Multimap, key: &str, count: usize) -> Vec<String> {
    let Some(list) = map.get_mut(key) else {
        return Vec::new();
    };
    let take = count.min(list.len());
    let taken: Vec<String> = list.drain(..take).collect();
    if list.is_empty() {
        map.shift_remove(key);
    }
    taken
}

/// Remove one occurrence of `value` under `key`.
fn remove_one(map: &mut Multimap, key: &str, value: &str) -> bool {
    let Some(list) = map.get_mut(key) else {
        return false;
    };
    let Some(pos) = list.iter().position(|v| v == value) else {
        return false;
    };
    list.remove(pos);
    if list.is_empty() {
        map.shift_remove(key);
    }
    true
}

fn values_of(map: &Multimap, key: &str) -> Vec<String> {
    map.get(key).cloned().unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// PhonemePairIndex
// ─────────────────────────────────────────────────────────────────────────────

/// Mutable bidirectional view of the pairs not yet placed in a line.
#[derive(Debug, Clone)]
pub struct PhonemePairIndex {
    right_to_lefts: Multimap,
    left_to_rights: Multimap,
}

impl PhonemePairIndex {
    /// Build the full inventory from `table`, in table order.
    pub fn new(table: &SyllableIndex) -> Self {
        let mut right_to_lefts = Multimap::default();
        let mut left_to_rights = Multimap::default();
        for (_, pair) in table.iter() {
            right_to_lefts.entry(pair.right.clone()).or_default().push(pair.left.clone());
            left_to_rights.entry(pair.left.clone()).or_default().push(pair.right.clone());
        }
        Self { right_to_lefts, left_to_rights }
    }

    fn side(&self, orientation: Orientation) -> &Multimap {
        match orientation {
            Orientation::ByRight => &self.right_to_lefts,
            Orientation::ByLeft => &self.left_to_rights,
        }
    }

    pub fn available_lefts_for(&self, right: &str) -> Vec<String> {
        values_of(&self.right_to_lefts, right)
    }

    pub fn available_rights_for(&self, left: &str) -> Vec<String> {
        values_of(&self.left_to_rights, left)
    }

    pub fn all_rights(&self) -> Vec<String> {
        self.right_to_lefts.keys().cloned().collect()
    }

    pub fn all_lefts(&self) -> Vec<String> {
        self.left_to_rights.keys().cloned().collect()
    }

    pub fn consume_lefts_for(&mut self, right: &str, count: usize) -> Vec<String> {
        let lefts = take_front(&mut self.right_to_lefts, right, count);
        for left in &lefts {
            remove_one(&mut self.left_to_rights, left, right);
        }
        lefts
    }

    pub fn consume_rights_for(&mut self, left: &str, count: usize) -> Vec<String> {
        let rights = take_front(&mut self.left_to_rights, left, count);
        for right in &rights {
            remove_one(&mut self.right_to_lefts, right, left);
        }
        rights
    }

    // ── Orientation-generic forms ────────────────────────────────────────────

    /// Pivot keys currently holding inventory, in first-seen order.
    pub fn pivots(&self, orientation: Orientation) -> Vec<String> {
        self.side(orientation).keys().cloned().collect()
    }

    /// Number of partners still available for `pivot`.
    pub fn partner_count(&self, orientation: Orientation, pivot: &str) -> usize {
        self.side(orientation).get(pivot).map_or(0, Vec::len)
    }

    pub fn consume(&mut self, orientation: Orientation, pivot: &str, count: usize) -> Vec<String> {
        match orientation {
            Orientation::ByRight => self.consume_lefts_for(pivot, count),
            Orientation::ByLeft => self.consume_rights_for(pivot, count),
        }
    }

    /// Remove one specific pair; returns `false` if it was not present.
    pub fn remove_pair(&mut self, left: &str, right: &str) -> bool {
        let removed = remove_one(&mut self.right_to_lefts, right, left);
        if removed {
            remove_one(&mut self.left_to_rights, left, right);
        }
        removed
    }

    /// Whether `(left, right)` is still uncombined.
    pub fn contains(&self, left: &str, right: &str) -> bool {
        self.right_to_lefts
            .get(right)
            .is_some_and(|lefts| lefts.iter().any(|l| l == left))
    }

    /// Remaining pair count.
    pub fn len(&self) -> usize {
        self.right_to_lefts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.right_to_lefts.is_empty()
    }

    /// `true` when both maps describe exactly the same multiset of pairs.
    pub fn is_consistent(&self) -> bool {
        let mut forward: Vec<(&str, &str)> = self
            .right_to_lefts
            .iter()
            .flat_map(|(r, ls)| ls.iter().map(move |l| (l.as_str(), r.as_str())))
            .collect();
        let mut backward: Vec<(&str, &str)> = self
            .left_to_rights
            .iter()
            .flat_map(|(l, rs)| rs.iter().map(move |r| (l.as_str(), r.as_str())))
            .collect();
        forward.sort_unstable();
        backward.sort_unstable();
        let no_empty_lists = self
            .right_to_lefts
            .values()
            .chain(self.left_to_rights.values())
            .all(|list| !list.is_empty());
        forward == backward && no_empty_lists
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> PhonemePairIndex {
        let table = SyllableIndex::from_triples([
            ("ka", "k", "a"),
            ("ta", "t", "a"),
            ("ki", "k", "i"),
            ("sa", "s", "a"),
            ("ti", "t", "i"),
        ])
        .unwrap();
        PhonemePairIndex::new(&table)
    }

    #[test]
    fn test_views_follow_table_order() {
        let idx = index();
        assert_eq!(idx.all_rights(), vec!["a", "i"]);
        assert_eq!(idx.all_lefts(), vec!["k", "t", "s"]);
        assert_eq!(idx.available_lefts_for("a"), vec!["k", "t", "s"]);
        assert_eq!(idx.available_rights_for("t"), vec!["a", "i"]);
        assert!(idx.available_lefts_for("o").is_empty());
        assert_eq!(idx.len(), 5);
    }

    #[test]
    fn test_consume_updates_both_sides() {
        let mut idx = index();
        let taken = idx.consume_lefts_for("a", 2);
        assert_eq!(taken, vec!["k", "t"]);
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.available_rights_for("k"), vec!["i"]);
        assert_eq!(idx.available_rights_for("t"), vec!["i"]);
        assert!(idx.is_consistent());
    }

    #[test]
    fn test_partial_take_drops_key() {
        let mut idx = index();
        let taken = idx.consume_rights_for("s", 5);
        assert_eq!(taken, vec!["a"]);
        assert!(!idx.all_lefts().contains(&"s".to_string()));
        assert!(idx.consume_rights_for("s", 1).is_empty());
        assert!(idx.is_consistent());
    }

    #[test]
    fn test_last_value_removes_key_on_other_side() {
        let mut idx = index();
        idx.consume_lefts_for("i", 2);
        assert_eq!(idx.all_rights(), vec!["a"]);
        assert_eq!(idx.all_lefts(), vec!["k", "t", "s"]);
        idx.consume_lefts_for("a", 3);
        assert!(idx.is_empty());
        assert!(idx.all_lefts().is_empty());
        assert!(idx.is_consistent());
    }

    #[test]
    fn test_removing_middle_key_keeps_order() {
        let mut idx = index();
        assert_eq!(idx.consume_rights_for("t", 2), vec!["a", "i"]);
        assert_eq!(idx.all_lefts(), vec!["k", "s"]);
        assert_eq!(idx.available_lefts_for("a"), vec!["k", "s"]);
        assert_eq!(idx.all_rights(), vec!["a", "i"]);
        assert_eq!(idx.len(), 3);
        assert!(idx.is_consistent());
    }

    #[test]
    fn test_returned_copy_is_detached() {
        let mut idx = index();
        let before = idx.available_lefts_for("a");
        idx.consume_lefts_for("a", 1);
        assert_eq!(before.len(), 3);
        assert_eq!(idx.available_lefts_for("a").len(), 2);
    }

    #[test]
    fn test_remove_pair() {
        let mut idx = index();
        assert!(idx.remove_pair("t", "a"));
        assert!(!idx.remove_pair("t", "a"));
        assert!(!idx.contains("t", "a"));
        assert_eq!(idx.available_lefts_for("a"), vec!["k", "s"]);
        assert!(idx.is_consistent());
    }

    #[test]
    fn test_orientation_generic_forms() {
        let mut idx = index();
        assert_eq!(idx.pivots(Orientation::ByLeft), idx.all_lefts());
        assert_eq!(idx.partner_count(Orientation::ByRight, "a"), 3);
        assert_eq!(idx.consume(Orientation::ByLeft, "k", 1), vec!["a"]);
        assert_eq!(Orientation::ByRight.pair("a", "k"), ("k", "a"));
        assert_eq!(Orientation::ByLeft.pair("k", "a"), ("k", "a"));
    }
}
