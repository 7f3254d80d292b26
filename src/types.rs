//! Type-safe wrappers for color sorts, variable indices and literals.
//!
//! This module provides newtype wrappers that keep color sorts and variable
//! indices apart at compile time, plus the [`Lit`] atom used for plain
//! boolean expressions.
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Neg;

use crate::expr::Atom;

/// A color sort (color class) identifier.
///
/// Tuples and guards are scoped per sort. Sorts are 0-indexed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Sort(u32);

impl Sort {
    /// Creates a new sort with the given id.
    pub const fn new(id: u32) -> Self {
        Sort(id)
    }

    /// Returns the raw sort id.
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

impl From<u32> for Sort {
    fn from(id: u32) -> Self {
        Sort(id)
    }
}

/// A projection variable index (1-indexed).
///
/// `Index(3)` stands for the variable `X3` of some sort.
///
/// # Invariants
///
/// - Indices must be >= 1
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Index(u32);

impl Index {
    /// Creates a new index.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0`. Indices are 1-indexed.
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable indices must be >= 1");
        Index(id)
    }

    /// Returns the raw index as a `u32`.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}

impl From<Index> for u32 {
    fn from(index: Index) -> Self {
        index.0
    }
}

/// Set of variable indices referenced by a combination, a guard or a tuple.
///
/// Ordered, so that sets compare, hash and iterate deterministically.
pub type Indices = BTreeSet<Index>;

/// Builds an [`Indices`] from raw ids.
pub fn indices(ids: impl IntoIterator<Item = u32>) -> Indices {
    ids.into_iter().map(Index::new).collect()
}

/// Kind of the values an operator combines.
///
/// Complementary-pair elimination is only sound for purely boolean operands,
/// so the n-ary simplifier checks this before applying it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ElementKind {
    Boolean,
    TupleFunction,
}

/// A boolean literal: a variable id with a polarity.
///
/// Negative literals are represented by negative ids, as in DIMACS.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit(i32);

impl Lit {
    pub fn pos(var: u32) -> Self {
        assert_ne!(var, 0, "Variable index should not be zero");
        Lit(var as i32)
    }

    pub fn neg(var: u32) -> Self {
        assert_ne!(var, 0, "Variable index should not be zero");
        Lit(-(var as i32))
    }

    pub fn var(self) -> u32 {
        self.0.unsigned_abs()
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn to_dimacs(self) -> i32 {
        self.0
    }
}

impl From<i32> for Lit {
    fn from(value: i32) -> Self {
        assert_ne!(value, 0, "Variable index should not be zero");
        Lit(value)
    }
}

impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Lit(-self.0)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_positive() {
            write!(f, "x{}", self.var())
        } else {
            write!(f, "~x{}", self.var())
        }
    }
}

impl Atom for Lit {
    type Domain = ();

    fn is_complement(&self, other: &Self) -> bool {
        self.0 == -other.0
    }

    fn codomain(&self) -> Self::Domain {}

    fn rebind(&self, _codomain: &Self::Domain) -> Self {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_index_creation() {
        let x1 = Index::new(1);
        let x2 = Index::new(2);
        assert_eq!(x1.id(), 1);
        assert!(x1 < x2);
        assert_eq!(x2.to_string(), "X2");
    }

    #[test]
    #[should_panic(expected = "Variable indices must be >= 1")]
    fn test_index_zero_panics() {
        Index::new(0);
    }

    #[test]
    fn test_sort_display() {
        assert_eq!(Sort::new(0).to_string(), "C0");
        assert_eq!(Sort::from(3).id(), 3);
    }

    #[test]
    fn test_indices_are_ordered() {
        let set = indices([3, 1, 2, 1]);
        let ids: Vec<u32> = set.iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_lit_negation() {
        let x = Lit::pos(2);
        assert!(x.is_positive());
        assert_eq!(-x, Lit::neg(2));
        assert_eq!(-(-x), x);
        assert_eq!((-x).to_string(), "~x2");
        assert_eq!(Lit::from(-3).to_dimacs(), -3);
    }

    #[test]
    fn test_lit_complement() {
        let x = Lit::pos(1);
        assert!(x.is_complement(&-x));
        assert!(!x.is_complement(&x));
        assert!(!x.is_complement(&Lit::neg(2)));
    }
}
