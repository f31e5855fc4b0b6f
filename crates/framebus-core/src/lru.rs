//! Recency tracking for resident labels.
//!
//! A slab-backed doubly linked list ordered oldest → most recent, plus a
//! label → node map. Touch, insert and evict-oldest are all O(1).

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeIdx(u32);

#[derive(Debug)]
struct Node {
    label: String,
    prev: Option<NodeIdx>,
    next: Option<NodeIdx>,
}

/// Least-recently-used order over a set of labels.
#[derive(Debug, Default)]
pub struct RecencyTracker {
    slots: Vec<Option<Node>>,
    free: Vec<u32>,
    head: Option<NodeIdx>,
    tail: Option<NodeIdx>,
    lookup: HashMap<String, NodeIdx>,
}

impl RecencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker seeded with `labels`, first label oldest.
    #[cfg(test)]
    fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tracker = Self::new();
        for label in labels {
            tracker.touch(label);
        }
        tracker
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    #[cfg(test)]
    fn contains(&self, label: &str) -> bool {
        self.lookup.contains_key(label)
    }

    /// Mark `label` most recent, inserting it if absent.
    pub fn touch(&mut self, label: &str) {
        match self.lookup.get(label) {
            Some(&idx) => self.move_to_back(idx),
            None => {
                let idx = self.push_back(label.to_string());
                self.lookup.insert(label.to_string(), idx);
            }
        }
    }

    #[cfg(test)]
    fn oldest(&self) -> Option<&str> {
        self.head.map(|idx| self.node(idx).label.as_str())
    }

    /// Remove and return the least recently used label.
    pub fn pop_oldest(&mut self) -> Option<String> {
        let head = self.head?;
        let label = self.unlink(head);
        self.lookup.remove(&label);
        Some(label)
    }

    /// Labels from oldest to most recent.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let mut current = self.head;
        std::iter::from_fn(move || {
            let idx = current?;
            let node = self.node(idx);
            current = node.next;
            Some(node.label.as_str())
        })
    }

    fn push_back(&mut self, label: String) -> NodeIdx {
        let node = Node {
            label,
            prev: self.tail,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(free) => {
                self.slots[free as usize] = Some(node);
                NodeIdx(free)
            }
            None => {
                let raw = u32::try_from(self.slots.len()).expect("recency slab overflow");
                self.slots.push(Some(node));
                NodeIdx(raw)
            }
        };
        match self.tail {
            Some(old_tail) => self.node_mut(old_tail).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        idx
    }

    fn unlink(&mut self, idx: NodeIdx) -> String {
        let node = self.slots[idx.0 as usize]
            .take()
            .expect("unlink of vacant recency node");
        match node.prev {
            Some(p) => self.node_mut(p).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.node_mut(n).prev = node.prev,
            None => self.tail = node.prev,
        }
        self.free.push(idx.0);
        node.label
    }

    fn move_to_back(&mut self, idx: NodeIdx) {
        if self.tail == Some(idx) {
            return;
        }
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        if let Some(n) = next {
            self.node_mut(n).prev = prev;
        }
        let old_tail = self.tail;
        if let Some(t) = old_tail {
            self.node_mut(t).next = Some(idx);
        }
        let node = self.node_mut(idx);
        node.prev = old_tail;
        node.next = None;
        self.tail = Some(idx);
    }

    fn node(&self, idx: NodeIdx) -> &Node {
        self.slots[idx.0 as usize]
            .as_ref()
            .expect("dangling recency node")
    }

    fn node_mut(&mut self, idx: NodeIdx) -> &mut Node {
        self.slots[idx.0 as usize]
            .as_mut()
            .expect("dangling recency node")
    }
}
