//! Bounded traversal of an error's `source()` chain
//!
//! Stops at the end of the chain, at the first node seen twice, or after
//! `max_depth` nodes, whichever comes first.

use std::collections::HashSet;
use std::error::Error;

/// Default number of nodes inspected before giving up
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 32;

/// Iterator over an error and its transitive causes
pub struct ErrorChain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
    visited: HashSet<*const (dyn Error + 'static)>,
    remaining: usize,
}

impl<'a> ErrorChain<'a> {
    pub fn new(error: &'a (dyn Error + 'static)) -> Self {
        Self::with_max_depth(error, DEFAULT_MAX_CHAIN_DEPTH)
    }

    pub fn with_max_depth(error: &'a (dyn Error + 'static), max_depth: usize) -> Self {
        Self {
            next: Some(error),
            visited: HashSet::new(),
            remaining: max_depth,
        }
    }
}

impl<'a> Iterator for ErrorChain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            if self.next.is_some() {
                tracing::debug!(target = "proxy", "error chain truncated at depth limit");
                self.next = None;
            }
            return None;
        }
        let current = self.next.take()?;
        // address plus vtable: a wrapper and a cause stored at offset 0
        // share an address but never a type
        let node = current as *const (dyn Error + 'static);
        if !self.visited.insert(node) {
            tracing::debug!(target = "proxy", "error chain cycle detected, stopping walk");
            return None;
        }
        self.remaining -= 1;
        self.next = current.source();
        Some(current)
    }
}

/// Render a node the way an operator would see it: display text plus debug form
pub fn render_node(error: &(dyn Error + 'static)) -> String {
    format!("{error}\n{error:?}")
}
