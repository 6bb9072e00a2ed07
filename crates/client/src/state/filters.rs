//! Home view filters.

use foody_core::{Category, SortOption};

/// Search text, selected category, and sort order of the restaurant listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub search: String,
    pub category: Category,
    pub sort: Option<SortOption>,
}

impl Filters {
    /// Apply a state transition.
    pub fn reduce(&mut self, action: FiltersAction) {
        match action {
            FiltersAction::SetSearch(search) => self.search = search,
            FiltersAction::SetCategory(category) => self.category = category,
            FiltersAction::SetSort(sort) => self.sort = sort,
            FiltersAction::Reset => *self = Self::default(),
        }
    }
}

/// Filter state transitions.
#[derive(Debug, Clone)]
pub enum FiltersAction {
    SetSearch(String),
    SetCategory(Category),
    SetSort(Option<SortOption>),
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_and_reset() {
        let mut filters = Filters::default();
        filters.reduce(FiltersAction::SetSearch("bakso".to_string()));
        filters.reduce(FiltersAction::SetCategory(Category::Lunch));
        filters.reduce(FiltersAction::SetSort(Some(SortOption::Rating)));

        assert_eq!(filters.search, "bakso");
        assert_eq!(filters.category, Category::Lunch);
        assert_eq!(filters.sort, Some(SortOption::Rating));

        filters.reduce(FiltersAction::Reset);
        assert_eq!(filters, Filters::default());
    }
}
