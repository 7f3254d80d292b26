//! Color domains: the sort structure a tuple or an expression lives on.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::Sort;

/// A color domain, e.g. `C0^2 x C1`.
///
/// Maps each sort to the number of positions of that sort. Ordered by sort,
/// so equal domains always compare and print the same way.
#[derive(Debug, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Domain {
    sorts: BTreeMap<Sort, usize>,
}

impl Domain {
    /// The empty domain (arity zero).
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single-color domain `sort^arity`.
    pub fn single(sort: Sort, arity: usize) -> Self {
        Self::new([(sort, arity)])
    }

    pub fn new(sorts: impl IntoIterator<Item = (Sort, usize)>) -> Self {
        let mut map = BTreeMap::new();
        for (sort, n) in sorts {
            if n > 0 {
                *map.entry(sort).or_insert(0) += n;
            }
        }
        Self { sorts: map }
    }

    /// Number of positions of the given sort.
    pub fn mult(&self, sort: Sort) -> usize {
        self.sorts.get(&sort).copied().unwrap_or(0)
    }

    /// Total number of positions.
    pub fn arity(&self) -> usize {
        self.sorts.values().sum()
    }

    pub fn sorts(&self) -> impl Iterator<Item = Sort> + '_ {
        self.sorts.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.sorts.is_empty()
    }

    /// Returns `true` if at most one sort occurs in the domain.
    pub fn is_single_color(&self) -> bool {
        self.sorts.len() <= 1
    }

    /// Returns `true` if every sort of `other` also occurs in `self`.
    pub fn covers(&self, other: &Domain) -> bool {
        other.sorts.keys().all(|s| self.sorts.contains_key(s))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sorts.is_empty() {
            return write!(f, "()");
        }
        for (i, (sort, n)) in self.sorts.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            if *n == 1 {
                write!(f, "{}", sort)?;
            } else {
                write!(f, "{}^{}", sort, n)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_domain_arity() {
        let d = Domain::new([(Sort::new(0), 2), (Sort::new(1), 1), (Sort::new(0), 1)]);
        assert_eq!(d.arity(), 4);
        assert_eq!(d.mult(Sort::new(0)), 3);
        assert_eq!(d.mult(Sort::new(2)), 0);
        assert!(!d.is_single_color());
        assert_eq!(d.to_string(), "C0^3 x C1");
    }

    #[test]
    fn test_zero_multiplicities_are_dropped() {
        let d = Domain::new([(Sort::new(0), 0)]);
        assert!(d.is_empty());
        assert_eq!(d, Domain::empty());
        assert_eq!(d.to_string(), "()");
    }

    #[test]
    fn test_covers() {
        let big = Domain::new([(Sort::new(0), 1), (Sort::new(1), 1)]);
        let small = Domain::single(Sort::new(1), 3);
        assert!(big.covers(&small));
        assert!(!small.covers(&big));
        assert!(small.covers(&Domain::empty()));
    }
}
