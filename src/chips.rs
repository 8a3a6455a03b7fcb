//! Chip field state: the live query, the selected chips and the suggestions
//! derived from both.
//!
//! Suggestions are never patched in place. Every mutation recomputes them
//! from the catalog, the query and the selected ids, so they stay disjoint
//! from the selection and keep catalog order.

use std::collections::HashSet;

use crate::config::EmptyQuery;
use crate::contact::{Catalog, Chip, Contact};
use crate::search;

#[derive(Debug, Clone)]
pub struct ChipField {
    catalog: Catalog,
    empty_query: EmptyQuery,
    query: String,
    chips: Vec<Chip>,
    suggestions: Vec<Contact>,
    highlighted: Option<usize>,
}

impl ChipField {
    pub fn new(catalog: Catalog, empty_query: EmptyQuery) -> Self {
        let mut field = Self {
            catalog,
            empty_query,
            query: String::new(),
            chips: Vec::new(),
            suggestions: Vec::new(),
            highlighted: None,
        };
        field.recompute();
        field
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    pub fn suggestions(&self) -> &[Contact] {
        &self.suggestions
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_contact(&self) -> Option<&Contact> {
        self.highlighted.and_then(|index| self.suggestions.get(index))
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.chips.iter().any(|chip| chip.id == id)
    }

    /// Replace the query and recompute suggestions.
    pub fn on_type(&mut self, text: &str) {
        if self.query == text {
            return;
        }
        self.query = text.to_string();
        self.recompute();
    }

    /// Backspace on an empty query removes the last chip.
    pub fn on_backspace(&mut self) -> bool {
        if !self.query.is_empty() {
            return false;
        }
        self.remove_last()
    }

    /// Move a current suggestion into the chips. Anything else is a no-op.
    pub fn select(&mut self, id: u64) -> bool {
        let Some(contact) = self.suggestions.iter().find(|contact| contact.id == id) else {
            log::debug!("select({}) ignored: not a current suggestion", id);
            return false;
        };
        self.chips.push(Chip::from(contact));
        self.query.clear();
        log::debug!("selected contact {} ({} chips)", id, self.chips.len());
        self.recompute();
        true
    }

    pub fn select_highlighted(&mut self) -> bool {
        match self.highlighted_contact().map(|contact| contact.id) {
            Some(id) => self.select(id),
            None => false,
        }
    }

    /// Remove the chip with `id`; the contact becomes eligible again.
    pub fn remove(&mut self, id: u64) -> bool {
        let Some(index) = self.chips.iter().position(|chip| chip.id == id) else {
            log::debug!("remove({}) ignored: not selected", id);
            return false;
        };
        self.chips.remove(index);
        log::debug!("removed chip {} ({} chips)", id, self.chips.len());
        self.recompute();
        true
    }

    pub fn remove_last(&mut self) -> bool {
        match self.chips.last().map(|chip| chip.id) {
            Some(id) => self.remove(id),
            None => false,
        }
    }

    pub fn highlight_next(&mut self) {
        self.move_highlight(1);
    }

    pub fn highlight_prev(&mut self) {
        self.move_highlight(-1);
    }

    pub fn highlight(&mut self, index: usize) {
        if index < self.suggestions.len() {
            self.highlighted = Some(index);
        }
    }

    fn move_highlight(&mut self, delta: isize) {
        if self.suggestions.is_empty() {
            self.highlighted = None;
            return;
        }
        let len = self.suggestions.len() as isize;
        let current = self.highlighted.map(|i| i as isize).unwrap_or(-1);
        let index = (current + delta).clamp(0, len - 1);
        self.highlighted = Some(index as usize);
    }

    fn recompute(&mut self) {
        let previous = self.highlighted_contact().map(|contact| contact.id);
        self.suggestions = compute_suggestions(
            &self.catalog,
            &self.query,
            &self.chips,
            self.empty_query,
        );

        self.highlighted = if self.suggestions.is_empty() {
            None
        } else if let Some(index) = previous
            .and_then(|id| self.suggestions.iter().position(|contact| contact.id == id))
        {
            Some(index)
        } else {
            Some(
                self.highlighted
                    .unwrap_or(0)
                    .min(self.suggestions.len() - 1),
            )
        };
        log::debug!(
            "query {:?}: {} suggestions",
            self.query,
            self.suggestions.len()
        );
    }
}

/// Catalog filtered by `query`, minus the selected ids.
pub fn compute_suggestions(
    catalog: &Catalog,
    query: &str,
    chips: &[Chip],
    empty_query: EmptyQuery,
) -> Vec<Contact> {
    if query.is_empty() && empty_query == EmptyQuery::Hidden {
        return Vec::new();
    }
    let selected: HashSet<u64> = chips.iter().map(|chip| chip.id).collect();
    search::filter(
        query,
        catalog
            .contacts()
            .iter()
            .filter(|contact| !selected.contains(&contact.id)),
    )
}
