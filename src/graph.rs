//! Index dependency graph of a conjunctive guard.
//!
//! Two variable indices of a sort are connected when some guard clause
//! constrains them jointly. The connected components drive the partitioning
//! of tuple positions in [`WnTuple::independent_components`][crate::tuple::WnTuple::independent_components].

use std::collections::BTreeMap;

use log::debug;

use crate::types::{Index, Indices, Sort};

/// Undirected graph over `(sort, index)` nodes, kept as a union-find forest.
#[derive(Debug, Clone, Default)]
pub struct IndexGraph {
    parent: BTreeMap<(Sort, Index), (Sort, Index)>,
}

impl IndexGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node without edges.
    pub fn add_node(&mut self, sort: Sort, index: Index) {
        self.parent.entry((sort, index)).or_insert((sort, index));
    }

    /// Connects all the given indices of `sort` with each other.
    pub fn connect_all(&mut self, sort: Sort, indices: impl IntoIterator<Item = Index>) {
        let mut first = None;
        for index in indices {
            self.add_node(sort, index);
            match first {
                None => first = Some(index),
                Some(root) => self.union((sort, root), (sort, index)),
            }
        }
    }

    fn find(&self, node: (Sort, Index)) -> (Sort, Index) {
        let mut current = node;
        while let Some(&next) = self.parent.get(&current) {
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn union(&mut self, a: (Sort, Index), b: (Sort, Index)) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        // Smaller root wins, which keeps representatives stable.
        let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent.insert(child, root);
    }

    /// Sorts that have at least one node.
    pub fn sorts(&self) -> Vec<Sort> {
        let mut sorts: Vec<Sort> = self.parent.keys().map(|&(s, _)| s).collect();
        sorts.dedup();
        sorts
    }

    /// Maximal groups of connected indices of `sort`.
    ///
    /// Groups are ordered by their smallest index.
    pub fn connected_indices(&self, sort: Sort) -> Vec<Indices> {
        let mut groups: BTreeMap<Index, Indices> = BTreeMap::new();
        for &(s, index) in self.parent.keys().filter(|(s, _)| *s == sort) {
            let (_, root) = self.find((s, index));
            groups.entry(root).or_default().insert(index);
        }
        let groups: Vec<Indices> = groups.into_values().collect();
        debug!("connected_indices({}) = {:?}", sort, groups);
        groups
    }
}
