//! Bags: weighted sums of tuple functions.
//!
//! A [`Bag`] maps elements (usually [`WnTuple`]s) to positive
//! multiplicities, e.g. `2*<X1, X2> + <S, X1>`. A bag may be declared
//! *disjoint*, meaning its elements denote pairwise disjoint value sets.
//! The flag is trusted, never verified.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use log::debug;
use num_bigint::BigUint;

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::expr::Simplify;
use crate::guard::Guard;
use crate::guarded::GuardTarget;
use crate::tuple::WnTuple;

/// Values a [`Bag`] can hold.
pub trait BagElement: Clone + Eq + Hash + fmt::Debug + fmt::Display {
    fn domain(&self) -> Domain;

    fn codomain(&self) -> Domain;

    /// Restricts the element by `guard` on its produced values.
    fn join_filter(&self, guard: &Guard) -> Self;

    /// Returns `true` if the element is known to denote the empty function.
    fn is_empty_function(&self) -> bool;

    /// Number of values the element denotes.
    fn card(&self) -> Result<BigUint> {
        Err(Error::NotSupported("cardinality"))
    }

    /// Splits the element along the delimiters of its static subclasses.
    fn split_delimiters(&self) -> Result<Vec<Self>> {
        Err(Error::NotSupported("delimiter splitting"))
    }
}

impl BagElement for WnTuple {
    fn domain(&self) -> Domain {
        WnTuple::domain(self).clone()
    }

    fn codomain(&self) -> Domain {
        WnTuple::codomain(self)
    }

    fn join_filter(&self, guard: &Guard) -> Self {
        WnTuple::join_filter(self, guard)
    }

    fn is_empty_function(&self) -> bool {
        self.is_false()
    }
}

/// A multiset of elements of type `T` between two color domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bag<T: BagElement> {
    domain: Domain,
    codomain: Domain,
    tuples: IndexMap<T, u32>,
    disjoint: bool,
}

impl<T: BagElement> Bag<T> {
    /// The empty bag from `domain` to `codomain`.
    pub fn empty(domain: Domain, codomain: Domain) -> Self {
        Self {
            domain,
            codomain,
            tuples: IndexMap::new(),
            disjoint: false,
        }
    }

    /// Builds a bag from explicit multiplicities.
    ///
    /// Multiplicities of repeated elements add up; zero multiplicities are
    /// dropped. Fails with [`Error::TypeMismatch`] if an element does not map
    /// `domain` to `codomain`.
    pub fn new(
        domain: Domain,
        codomain: Domain,
        tuples: impl IntoIterator<Item = (T, u32)>,
        disjoint: bool,
    ) -> Result<Self> {
        let mut bag = Self::empty(domain, codomain);
        bag.disjoint = disjoint;
        for (t, mult) in tuples {
            bag.add(t, mult)?;
        }
        Ok(bag)
    }

    /// The bag holding `mult` copies of `tuple`.
    pub fn singleton(tuple: T, mult: u32) -> Self {
        let mut bag = Self::empty(tuple.domain(), tuple.codomain());
        if mult > 0 {
            bag.tuples.insert(tuple, mult);
        }
        bag
    }

    /// An empty bag of the same kind over another pair of domains.
    pub fn build_empty(&self, domain: Domain, codomain: Domain) -> Self {
        Self::empty(domain, codomain)
    }

    /// A bag of the same kind and domains with the given content.
    pub fn build_from(&self, tuples: IndexMap<T, u32>, disjoint: bool) -> Result<Self> {
        Self::new(self.domain.clone(), self.codomain.clone(), tuples, disjoint)
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn codomain(&self) -> &Domain {
        &self.codomain
    }

    pub fn is_disjoint(&self) -> bool {
        self.disjoint
    }

    /// Number of distinct elements.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn multiplicity(&self, tuple: &T) -> u32 {
        self.tuples.get(tuple).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, u32)> + '_ {
        self.tuples.iter().map(|(t, &m)| (t, m))
    }

    /// Adds `mult` copies of `tuple`.
    ///
    /// Fails with [`Error::LimitExceeded`] if the multiplicity overflows.
    pub fn add(&mut self, tuple: T, mult: u32) -> Result<()> {
        if tuple.domain() != self.domain || tuple.codomain() != self.codomain {
            return Err(Error::mismatch(
                format!("an element from {} to {}", self.domain, self.codomain),
                format!("{} from {} to {}", tuple, tuple.domain(), tuple.codomain()),
            ));
        }
        if mult > 0 {
            let m = self.tuples.entry(tuple).or_insert(0);
            *m = m.checked_add(mult).ok_or(Error::LimitExceeded {
                what: "multiplicity",
                limit: u32::MAX as usize,
            })?;
        }
        Ok(())
    }

    pub fn with(mut self, tuple: T, mult: u32) -> Result<Self> {
        self.add(tuple, mult)?;
        Ok(self)
    }

    /// Joins every element with `guard`.
    ///
    /// Multiplicities and the disjointness flag are kept. Elements that
    /// become equal after filtering are merged, their multiplicities
    /// saturating at `u32::MAX`.
    pub fn apply_filter(&self, guard: &Guard) -> Self {
        debug!("apply_filter: [{}] on {} elements", guard, self.len());
        let mut tuples: IndexMap<T, u32> = IndexMap::with_capacity(self.tuples.len());
        for (t, &mult) in &self.tuples {
            let m = tuples.entry(t.join_filter(guard)).or_insert(0);
            *m = m.saturating_add(mult);
        }
        Self {
            domain: self.domain.clone(),
            codomain: self.codomain.clone(),
            tuples,
            disjoint: self.disjoint,
        }
    }

    /// Total number of values, counted with multiplicity.
    pub fn card(&self) -> Result<BigUint> {
        self.tuples
            .iter()
            .try_fold(BigUint::from(0u32), |acc, (t, &mult)| Ok(acc + t.card()? * mult))
    }

    /// Splits every element along the delimiters of its subclasses.
    pub fn split_delimiters(&self) -> Result<Self> {
        let mut res = self.build_empty(self.domain.clone(), self.codomain.clone());
        res.disjoint = self.disjoint;
        for (t, &mult) in &self.tuples {
            for part in t.split_delimiters()? {
                res.add(part, mult)?;
            }
        }
        Ok(res)
    }
}

impl<T: BagElement> Simplify for Bag<T> {
    /// Drops the elements that denote the empty function.
    fn gen_simplify(&self) -> Self {
        let mut res = self.clone();
        res.tuples.retain(|t, _| !t.is_empty_function());
        if res.len() != self.len() {
            debug!("bag: dropped {} empty elements", self.len() - res.len());
        }
        res
    }

    fn is_true(&self) -> bool {
        false
    }

    fn is_false(&self) -> bool {
        self.tuples.keys().all(|t| t.is_empty_function())
    }

    fn false_value(&self) -> Self {
        self.build_empty(self.domain.clone(), self.codomain.clone())
    }
}

impl<T: BagElement> GuardTarget for Bag<T> {
    /// A guard may only mention sorts of the bag's domain.
    fn check_guard(&self, guard: &Guard) -> Result<()> {
        match guard.sorts().into_iter().find(|&s| self.domain.mult(s) == 0) {
            None => Ok(()),
            Some(sort) => Err(Error::mismatch(
                format!("a guard over {}", self.domain),
                format!("{} (sort {})", guard, sort),
            )),
        }
    }
}

impl<T: BagElement> fmt::Display for Bag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tuples.is_empty() {
            return write!(f, "0");
        }
        for (i, (t, mult)) in self.tuples.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            if *mult != 1 {
                write!(f, "{}*", mult)?;
            }
            write!(f, "{}", t)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::func::LinearComb;
    use crate::guard::Predicate;
    use crate::guarded::{GuardedExpr, Reduced};
    use crate::types::Sort;

    fn c0() -> Sort {
        Sort::new(0)
    }

    fn d2() -> Domain {
        Domain::single(c0(), 2)
    }

    fn x(i: u32) -> LinearComb {
        LinearComb::projection(c0(), i)
    }

    fn t(components: Vec<LinearComb>) -> WnTuple {
        WnTuple::simple(d2(), components).unwrap()
    }

    fn bag() -> Bag<WnTuple> {
        Bag::new(
            d2(),
            d2(),
            [(t(vec![x(1), x(2)]), 2), (t(vec![x(2), x(1)]), 1)],
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_build() {
        let b = bag();
        assert_eq!(b.len(), 2);
        assert!(b.is_disjoint());
        assert_eq!(b.multiplicity(&t(vec![x(1), x(2)])), 2);
        assert_eq!(b.to_string(), "2*<X1, X2> + <X2, X1>");

        let b = b.with(t(vec![x(2), x(1)]), 3).unwrap();
        assert_eq!(b.multiplicity(&t(vec![x(2), x(1)])), 4);

        let e = b.build_empty(Domain::single(c0(), 1), d2());
        assert!(e.is_empty());
        assert_eq!(e.domain(), &Domain::single(c0(), 1));
        assert_eq!(e.to_string(), "0");
    }

    #[test]
    fn test_build_rejects_foreign_elements() {
        let narrow = WnTuple::simple(Domain::single(c0(), 2), vec![x(1)]).unwrap();
        let res = bag().build_from(IndexMap::from([(narrow, 1)]), false);
        assert!(matches!(res, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_singleton() {
        let tuple = t(vec![x(1), x(1)]);
        let b = Bag::singleton(tuple.clone(), 3);
        assert_eq!(b.domain(), &d2());
        assert_eq!(b.codomain(), &d2());
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![(&tuple, 3)]);
        assert!(!b.is_disjoint());
    }

    #[test]
    fn test_apply_filter() {
        let p = Guard::from(Predicate::eq(c0(), 1, 2));
        let b = bag().apply_filter(&p);
        assert!(b.is_disjoint());
        assert_eq!(b.len(), 2);
        assert_eq!(b.multiplicity(&t(vec![x(1), x(2)]).join_filter(&p)), 2);
        assert_eq!(b.multiplicity(&t(vec![x(2), x(1)]).join_filter(&p)), 1);
        assert!(b.iter().all(|(t, _)| t.filter() == &p));
    }

    #[test]
    fn test_multiplicity_overflow() {
        let tuple = t(vec![x(1), x(2)]);
        let b = Bag::singleton(tuple.clone(), u32::MAX);
        assert_eq!(
            b.clone().with(tuple.clone(), 1),
            Err(Error::LimitExceeded {
                what: "multiplicity",
                limit: u32::MAX as usize,
            })
        );
        assert_eq!(b.with(tuple.clone(), 0).unwrap().multiplicity(&tuple), u32::MAX);
    }

    #[test]
    fn test_not_supported() {
        assert_eq!(bag().card(), Err(Error::NotSupported("cardinality")));
        assert_eq!(
            bag().split_delimiters(),
            Err(Error::NotSupported("delimiter splitting"))
        );
        // The empty bag never asks its elements.
        assert_eq!(Bag::<WnTuple>::empty(d2(), d2()).card(), Ok(BigUint::from(0u32)));
    }

    /// An interval `[lo, hi)` of naturals, split at multiples of ten.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Range {
        lo: u32,
        hi: u32,
    }

    impl fmt::Display for Range {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "[{}, {})", self.lo, self.hi)
        }
    }

    impl BagElement for Range {
        fn domain(&self) -> Domain {
            Domain::empty()
        }

        fn codomain(&self) -> Domain {
            Domain::single(c0(), 1)
        }

        fn join_filter(&self, _guard: &Guard) -> Self {
            self.clone()
        }

        fn is_empty_function(&self) -> bool {
            self.lo >= self.hi
        }

        fn card(&self) -> Result<BigUint> {
            Ok(BigUint::from(self.hi.saturating_sub(self.lo)))
        }

        fn split_delimiters(&self) -> Result<Vec<Self>> {
            let mut parts = Vec::new();
            let mut lo = self.lo;
            while lo < self.hi {
                let hi = ((lo / 10 + 1) * 10).min(self.hi);
                parts.push(Range { lo, hi });
                lo = hi;
            }
            Ok(parts)
        }
    }

    fn range(lo: u32, hi: u32) -> Range {
        Range { lo, hi }
    }

    #[test]
    fn test_card_and_split() {
        let b = Bag::singleton(range(5, 25), 2).with(range(0, 3), 1).unwrap();
        assert_eq!(b.card(), Ok(BigUint::from(43u32)));

        let split = b.split_delimiters().unwrap();
        assert_eq!(split.len(), 4);
        assert_eq!(split.multiplicity(&range(10, 20)), 2);
        assert_eq!(split.multiplicity(&range(0, 3)), 1);
        assert_eq!(split.card(), b.card());
    }

    #[test]
    fn test_simplify_drops_empty_elements() {
        let b = Bag::singleton(range(1, 4), 1).with(range(7, 7), 5).unwrap();
        let s = b.normalize();
        assert_eq!(s.len(), 1);
        assert!(!s.is_false());
        assert!(Bag::singleton(range(3, 2), 1).is_false());
        assert_eq!(b.false_value(), Bag::empty(Domain::empty(), Domain::single(c0(), 1)));
    }

    #[test]
    fn test_guarded_bag() {
        let p = Guard::from(Predicate::eq(c0(), 1, 2));
        let g = GuardedExpr::build(bag(), Some(p.clone())).unwrap();
        match g.reduce() {
            Reduced::Guarded(r) => assert_eq!(r.expr(), &bag()),
            other => panic!("expected a guarded bag, got {:?}", other),
        }

        let void = GuardedExpr::build(bag(), Some(p.clone().and(p.not()))).unwrap();
        assert_eq!(void.reduce(), Reduced::Expr(Bag::empty(d2(), d2())));

        let foreign = Guard::from(Predicate::eq(Sort::new(1), 1, 2));
        assert!(matches!(
            GuardedExpr::build(bag(), Some(foreign)),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
