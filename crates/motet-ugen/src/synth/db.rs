//! Per-synth record of built generators, searchable by selector.

use crate::selector::Query;
use crate::ugen::UGen;

#[derive(Debug, Clone, Default)]
pub struct UGenDb {
    items: Vec<UGen>,
}

impl UGenDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, ugen: UGen) {
        self.items.push(ugen);
    }

    /// Generators matching `selector` (`key`, `.class`, `#id` or any
    /// combination), in build order. Malformed selectors match nothing.
    pub fn find(&self, selector: &str) -> Vec<UGen> {
        match Query::parse(selector) {
            Some(query) => self.query(&query),
            None => Vec::new(),
        }
    }

    pub fn query(&self, query: &Query) -> Vec<UGen> {
        self.items
            .iter()
            .filter(|ugen| query.matches(ugen.selector()))
            .cloned()
            .collect()
    }

    pub fn find_by_id(&self, id: &str) -> Option<UGen> {
        self.items.iter().find(|ugen| ugen.id() == Some(id)).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UGen> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
