//! Favorite and recently searched city names.

use serde::{Deserialize, Serialize};

pub const RECENTS_CAP: usize = 10;

/// Favorite city names in insertion order, deduplicated case-sensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    names: Vec<String>,
}

impl Favorites {
    pub fn from_names(names: Vec<String>) -> Self {
        let mut favorites = Self::default();
        for name in names {
            if !favorites.contains(&name) {
                favorites.names.push(name);
            }
        }
        favorites
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Flip membership of `name`. Returns whether it is a favorite afterwards.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.contains(name) {
            self.names.retain(|n| n != name);
            false
        } else {
            self.names.push(name.to_string());
            true
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Recently searched names, most recent first.
///
/// Deduplicated case-insensitively and capped at [`RECENTS_CAP`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recents {
    names: Vec<String>,
}

impl Recents {
    /// Build from stored names (most recent first), applying dedup and cap.
    pub fn from_names(names: Vec<String>) -> Self {
        let mut recents = Self::default();
        for name in names.into_iter().rev() {
            recents.push(&name);
        }
        recents
    }

    /// Move `name` to the front, dropping any differently-cased copy.
    pub fn push(&mut self, name: &str) {
        let lower = name.to_lowercase();
        self.names.retain(|n| n.to_lowercase() != lower);
        self.names.insert(0, name.to_string());
        self.names.truncate(RECENTS_CAP);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Carousel step from `index` by `step` positions, wrapping at both ends.
    pub fn cycle(&self, index: usize, step: isize) -> usize {
        let len = self.names.len();
        if len == 0 {
            return 0;
        }
        (index as isize + step).rem_euclid(len as isize) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut favorites = Favorites::from_names(names(&["Oslo"]));
        assert!(favorites.toggle("Paris"));
        assert!(!favorites.toggle("Paris"));
        assert_eq!(favorites.as_slice(), &names(&["Oslo"])[..]);
    }

    #[test]
    fn favorites_are_case_sensitive() {
        let mut favorites = Favorites::default();
        favorites.toggle("paris");
        favorites.toggle("Paris");
        assert_eq!(favorites.len(), 2);
        assert!(favorites.contains("Paris"));
        assert!(!favorites.contains("PARIS"));
    }

    #[test]
    fn favorites_keep_insertion_order_and_drop_duplicates() {
        let favorites = Favorites::from_names(names(&["Rome", "Oslo", "Rome"]));
        assert_eq!(favorites.as_slice(), &names(&["Rome", "Oslo"])[..]);
    }

    #[test]
    fn recents_move_differently_cased_entry_to_front() {
        let mut recents = Recents::from_names(names(&["London", "Paris"]));
        recents.push("paris");
        assert_eq!(recents.as_slice(), &names(&["paris", "London"])[..]);
    }

    #[test]
    fn recents_never_exceed_cap() {
        let mut recents = Recents::default();
        for i in 0..25 {
            recents.push(&format!("City{i}"));
        }
        assert_eq!(recents.len(), RECENTS_CAP);
        assert_eq!(recents.get(0), Some("City24"));
        assert_eq!(recents.get(RECENTS_CAP - 1), Some("City15"));
    }

    #[test]
    fn recents_from_stored_names_keeps_order() {
        let recents = Recents::from_names(names(&["Tokyo", "Dubai", "tokyo"]));
        assert_eq!(recents.as_slice(), &names(&["Tokyo", "Dubai"])[..]);
    }

    #[test]
    fn carousel_wraps_both_ways() {
        let recents = Recents::from_names(names(&["A", "B", "C"]));
        assert_eq!(recents.cycle(2, 1), 0);
        assert_eq!(recents.cycle(0, -1), 2);
        assert_eq!(Recents::default().cycle(0, 1), 0);
    }
}
