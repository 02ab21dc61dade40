//! Crawl frontier
//!
//! Replaces recursive descent with an explicit work list owned by the engine.
//! Depth-first pops the most recently pushed URL, breadth-first the oldest.
//! Sibling links arrive sorted, and depth-first pushes them so the
//! lexicographically smallest sibling is visited first, which keeps traversal
//! order reproducible between runs.

use crate::config::TraversalOrder;
use std::collections::{HashSet, VecDeque};

/// Discovered-but-not-yet-visited URLs
#[derive(Debug)]
pub struct Frontier {
    order: TraversalOrder,
    queue: VecDeque<String>,
    /// Every URL ever pushed, so a URL is queued at most once per run
    enqueued: HashSet<String>,
}

impl Frontier {
    pub fn new(order: TraversalOrder) -> Self {
        Self {
            order,
            queue: VecDeque::new(),
            enqueued: HashSet::new(),
        }
    }

    pub fn order(&self) -> TraversalOrder {
        self.order
    }

    /// Queues a single URL; returns false if it was queued before
    pub fn push(&mut self, url: String) -> bool {
        if !self.enqueued.insert(url.clone()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Queues sibling links discovered on one page, in the given order
    ///
    /// Returns how many were new to the frontier.
    pub fn push_siblings<I>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: DoubleEndedIterator,
    {
        let links = links.into_iter();
        match self.order {
            TraversalOrder::DepthFirst => links.rev().filter(|link| self.push(link.clone())).count(),
            TraversalOrder::BreadthFirst => links.filter(|link| self.push(link.clone())).count(),
        }
    }

    /// Takes the next URL to visit
    pub fn pop(&mut self) -> Option<String> {
        match self.order {
            TraversalOrder::DepthFirst => self.queue.pop_back(),
            TraversalOrder::BreadthFirst => self.queue.pop_front(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
