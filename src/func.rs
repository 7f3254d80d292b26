//! Elementary class functions and their linear combinations.
//!
//! A tuple component is a [`LinearComb`]: a weighted sum of
//! [`ElementaryFn`]s of one sort, e.g. `2*X1 + !X2 + S`.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;

use crate::types::{Index, Indices, Sort};

/// An atomic class function over one sort.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ElementaryFn {
    /// Projection on variable `X_index`, followed by `succ` successor steps
    /// (negative for predecessors).
    Projection { index: Index, succ: i32 },
    /// The whole color class (`S`).
    All,
    /// A static subclass of the color class (`S_k`).
    Subclass(u32),
}

impl ElementaryFn {
    pub fn projection(index: u32) -> Self {
        ElementaryFn::Projection {
            index: Index::new(index),
            succ: 0,
        }
    }

    pub fn successor(index: u32, succ: i32) -> Self {
        ElementaryFn::Projection {
            index: Index::new(index),
            succ,
        }
    }

    /// The variable this function projects on, `None` for constants.
    pub fn index(&self) -> Option<Index> {
        match self {
            ElementaryFn::Projection { index, .. } => Some(*index),
            ElementaryFn::All | ElementaryFn::Subclass(_) => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.index().is_none()
    }

    fn renamed(&self, split: &BTreeMap<Index, Index>) -> Self {
        match *self {
            ElementaryFn::Projection { index, succ } => ElementaryFn::Projection {
                index: split.get(&index).copied().unwrap_or(index),
                succ,
            },
            other => other,
        }
    }
}

impl fmt::Display for ElementaryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementaryFn::Projection { index, succ: 0 } => write!(f, "{}", index),
            ElementaryFn::Projection { index, succ: 1 } => write!(f, "!{}", index),
            ElementaryFn::Projection { index, succ: -1 } => write!(f, "^{}", index),
            ElementaryFn::Projection { index, succ } => write!(f, "!{{{}}}{}", succ, index),
            ElementaryFn::All => write!(f, "S"),
            ElementaryFn::Subclass(k) => write!(f, "S{}", k),
        }
    }
}

/// A linear combination of elementary functions of a single sort.
///
/// Terms are kept in a sorted map, so two combinations with the same terms
/// are equal and hash identically regardless of construction order.
/// Multiplicities are always positive; an empty combination denotes the
/// zero function.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LinearComb {
    sort: Sort,
    terms: BTreeMap<ElementaryFn, u32>,
}

impl LinearComb {
    /// The zero combination of the given sort.
    pub fn zero(sort: Sort) -> Self {
        Self {
            sort,
            terms: BTreeMap::new(),
        }
    }

    pub fn from_terms(sort: Sort, terms: impl IntoIterator<Item = (ElementaryFn, u32)>) -> Self {
        terms
            .into_iter()
            .fold(Self::zero(sort), |acc, (func, mult)| acc.with(func, mult))
    }

    /// `X_index` alone.
    pub fn projection(sort: Sort, index: u32) -> Self {
        Self::zero(sort).with(ElementaryFn::projection(index), 1)
    }

    /// `S` alone.
    pub fn all(sort: Sort) -> Self {
        Self::zero(sort).with(ElementaryFn::All, 1)
    }

    /// Adds `mult` occurrences of `func`.
    ///
    /// Multiplicities saturate at `u32::MAX`.
    pub fn with(mut self, func: ElementaryFn, mult: u32) -> Self {
        if mult > 0 {
            let m = self.terms.entry(func).or_insert(0);
            *m = m.saturating_add(mult);
        }
        self
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn get(&self, func: &ElementaryFn) -> u32 {
        self.terms.get(func).copied().unwrap_or(0)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&ElementaryFn, u32)> + '_ {
        self.terms.iter().map(|(f, &m)| (f, m))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` for the zero function.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns `true` if the combination references no variable.
    pub fn is_constant(&self) -> bool {
        self.terms.keys().all(|f| f.is_constant())
    }

    /// The set of projection indices appearing in any term.
    pub fn index_set(&self) -> Indices {
        self.terms.keys().filter_map(|f| f.index()).collect()
    }

    /// Splits the combination into index-homogeneous parts.
    ///
    /// Each entry maps a variable index (`None` for constant terms) to the
    /// sub-combination of the terms projecting on it. Entries appear in the
    /// order their first term appears in `self`.
    pub fn group_by_index(&self) -> IndexMap<Option<Index>, LinearComb> {
        let mut groups: IndexMap<Option<Index>, LinearComb> = IndexMap::new();
        for (func, &mult) in self.terms.iter() {
            let group = groups
                .entry(func.index())
                .or_insert_with(|| LinearComb::zero(self.sort));
            group.terms.insert(*func, mult);
        }
        groups
    }

    /// Renames projection indices (domain-splitting clone).
    pub fn renamed(&self, split: &BTreeMap<Index, Index>) -> Self {
        let terms = self.terms.iter().map(|(f, &m)| (f.renamed(split), m));
        Self::from_terms(self.sort, terms)
    }
}

impl fmt::Display for LinearComb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (func, mult)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            if *mult != 1 {
                write!(f, "{}*", mult)?;
            }
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}
