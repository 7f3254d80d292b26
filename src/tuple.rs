//! Tuples of linear combinations and their decomposition.
//!
//! A [`WnTuple`] `[g] <f1, .., fn> [h]` maps a color domain to the product
//! of the sorts of its components `fi`. The guard `g` restricts the domain,
//! the filter `h` restricts the produced values.
//!
//! Two decompositions are provided:
//!
//! - [`WnTuple::single_index_components_tuples`] splits a tuple whose
//!   components mix several variables into a sum of tuples whose components
//!   each project on at most one variable.
//! - [`WnTuple::independent_components`] partitions the positions of a tuple
//!   along the groups of variables the guard constrains jointly.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::debug;
use num_bigint::BigUint;

use crate::config::Config;
use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::expr::Atom;
use crate::func::{ElementaryFn, LinearComb};
use crate::guard::Guard;
use crate::types::{ElementKind, Index, Indices, Sort};

/// One index-homogeneous group choice per tuple position.
pub type Expansion = Vec<(Option<Index>, LinearComb)>;

/// A guarded, filtered tuple of linear combinations.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct WnTuple {
    domain: Domain,
    components: Vec<LinearComb>,
    filter: Guard,
    guard: Guard,
}

impl WnTuple {
    /// Creates a tuple over `domain`.
    ///
    /// Fails with [`Error::TypeMismatch`] if a component or the guard uses a
    /// variable the domain does not provide, or if the filter refers to a
    /// position the tuple does not produce.
    pub fn new(domain: Domain, components: Vec<LinearComb>, filter: Guard, guard: Guard) -> Result<Self> {
        for comp in &components {
            let mult = domain.mult(comp.sort());
            if comp.index_set().iter().any(|i| i.id() as usize > mult) {
                return Err(Error::mismatch(
                    format!("a component over {}", domain),
                    format!("{} of sort {}", comp, comp.sort()),
                ));
            }
        }
        let tuple = Self {
            domain,
            components,
            filter,
            guard,
        };
        check_scope(&tuple.guard, &tuple.domain, "guard")?;
        check_scope(&tuple.filter, &tuple.codomain(), "filter")?;
        Ok(tuple)
    }

    /// An unguarded, unfiltered tuple.
    pub fn simple(domain: Domain, components: Vec<LinearComb>) -> Result<Self> {
        Self::new(domain, components, Guard::True, Guard::True)
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn components(&self) -> &[LinearComb] {
        &self.components
    }

    pub fn filter(&self) -> &Guard {
        &self.filter
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub fn arity(&self) -> usize {
        self.components.len()
    }

    /// The sorts of the produced values.
    pub fn codomain(&self) -> Domain {
        Domain::new(self.components.iter().map(|c| (c.sort(), 1)))
    }

    /// The unique sort of a single-color tuple.
    pub fn sort(&self) -> Option<Sort> {
        if !self.is_single_color() {
            return None;
        }
        self.domain.sorts().next().or_else(|| self.components.first().map(|c| c.sort()))
    }

    /// Returns `true` if domain and components all share one sort.
    pub fn is_single_color(&self) -> bool {
        let mut sorts = self.domain.sorts().chain(self.components.iter().map(|c| c.sort()));
        match sorts.next() {
            None => true,
            Some(first) => sorts.all(|s| s == first),
        }
    }

    /// Variables referenced by any component.
    pub fn index_set(&self) -> Indices {
        self.components.iter().flat_map(|c| c.index_set()).collect()
    }

    /// Conjoins `guard` into the filter.
    pub fn join_filter(&self, guard: &Guard) -> Self {
        let filter = self.filter.clone().and(guard.clone()).normalize();
        debug!("join_filter: [{}] && [{}] => [{}]", self.filter, guard, filter);
        Self {
            filter,
            ..self.clone()
        }
    }

    /// Returns `true` if the tuple denotes the empty function.
    pub fn is_false(&self) -> bool {
        self.components.iter().any(|c| c.is_empty())
            || self.guard.normalize().is_false()
            || self.filter.normalize().is_false()
    }

    fn is_unrestricted(&self) -> bool {
        self.guard.normalize().is_trivial() && self.filter.normalize().is_trivial()
    }

    fn require_single_color(&self, what: &str) -> Result<()> {
        if self.is_single_color() {
            Ok(())
        } else {
            Err(Error::precondition(format!(
                "{} requires a single-color tuple, got {}",
                what, self
            )))
        }
    }

    /// Cartesian product of the index groups of every component.
    ///
    /// Each element picks one index-homogeneous group per position. A tuple
    /// without components has exactly one (empty) choice.
    pub fn expand(&self) -> Result<Vec<Expansion>> {
        self.require_single_color("expand")?;
        if self.components.is_empty() {
            return Ok(vec![Vec::new()]);
        }
        let choices = self
            .components
            .iter()
            .map(|c| c.group_by_index().into_iter().collect::<Vec<_>>())
            .multi_cartesian_product()
            .collect();
        Ok(choices)
    }

    /// Number of elements [`WnTuple::expand`] produces.
    pub fn expansion_size(&self) -> BigUint {
        self.components
            .iter()
            .map(|c| BigUint::from(c.group_by_index().len()))
            .product()
    }

    /// Splits the tuple into a sum of tuples with single-index components,
    /// using the default [`Config`].
    pub fn single_index_components_tuples(&self) -> Result<IndexSet<WnTuple>> {
        self.single_index_components_tuples_with(&Config::default())
    }

    /// Splits the tuple into a sum of tuples with single-index components.
    ///
    /// If there is nothing to split, the result holds `self` alone.
    pub fn single_index_components_tuples_with(&self, config: &Config) -> Result<IndexSet<WnTuple>> {
        self.require_single_color("single-index decomposition")?;

        let size = self.expansion_size();
        debug!("single_index_components_tuples: {} -> {} tuples", self, size);
        if size == BigUint::from(1u32) {
            return Ok(IndexSet::from([self.clone()]));
        }
        if size > BigUint::from(config.max_expansion) {
            return Err(Error::LimitExceeded {
                what: "single-index decomposition",
                limit: config.max_expansion,
            });
        }

        let tuples = self
            .expand()?
            .into_iter()
            .map(|choice| Self {
                components: choice.into_iter().map(|(_, comp)| comp).collect(),
                ..self.clone()
            })
            .collect();
        Ok(tuples)
    }

    /// Partitions the positions along the given groups of connected indices.
    ///
    /// A position goes to the group equal to its index set, else to the first
    /// group containing it, else to a fresh group keyed by its index set.
    /// Groups receiving no position are left out.
    pub fn independent_components_in(
        &self,
        partition: &[Indices],
    ) -> Result<IndexMap<Indices, IndexMap<usize, LinearComb>>> {
        self.require_single_color("independent components")?;

        let mut groups: IndexMap<Indices, IndexMap<usize, LinearComb>> =
            partition.iter().map(|p| (p.clone(), IndexMap::new())).collect();

        for (pos, comp) in self.components.iter().enumerate() {
            let set = comp.index_set();
            let key = if groups.contains_key(&set) {
                set
            } else {
                match groups.keys().find(|k| k.is_superset(&set)) {
                    Some(k) => k.clone(),
                    None => {
                        debug!("independent_components: new group {:?} for position {}", set, pos);
                        set
                    }
                }
            };
            groups.entry(key).or_default().insert(pos, comp.clone());
        }

        groups.retain(|_, positions| !positions.is_empty());
        Ok(groups)
    }

    /// Like [`WnTuple::independent_components_in`], keeping positions only.
    pub fn independent_components_v2(&self, partition: &[Indices]) -> Result<IndexMap<Indices, Vec<usize>>> {
        let groups = self.independent_components_in(partition)?;
        Ok(groups
            .into_iter()
            .map(|(key, positions)| (key, positions.into_keys().collect()))
            .collect())
    }

    /// Partitions the positions along the dependency graph of the guard.
    ///
    /// The tuple must be single-color with a conjunctive guard. A trivial
    /// guard supplies no grouping at all.
    pub fn independent_components(&self) -> Result<IndexMap<Indices, IndexMap<usize, LinearComb>>> {
        self.require_single_color("independent components")?;
        let guard = self.guard.normalize();
        if !guard.is_and_form() {
            return Err(Error::precondition(format!(
                "independent components require a conjunctive guard, got {}",
                guard
            )));
        }

        let partition = match (guard.is_trivial(), self.sort()) {
            (false, Some(sort)) => guard.dependency_graph()?.connected_indices(sort),
            _ => Vec::new(),
        };
        self.independent_components_in(&partition)
    }

    /// Returns `true` if every position projects on the matching variable.
    fn is_identity_map(&self) -> bool {
        if self.domain != self.codomain() {
            return false;
        }
        let mut next: IndexMap<Sort, u32> = IndexMap::new();
        self.components.iter().all(|c| {
            let n = next.entry(c.sort()).or_insert(0);
            *n += 1;
            c.len() == 1 && c.get(&ElementaryFn::projection(*n)) == 1
        })
    }
}

/// Checks that every predicate of `guard` refers to a variable of `scope`.
fn check_scope(guard: &Guard, scope: &Domain, what: &str) -> Result<()> {
    for pred in guard.predicates() {
        let mult = scope.mult(pred.sort());
        if pred.indices().iter().any(|i| i.id() as usize > mult) {
            return Err(Error::mismatch(
                format!("a {} over {}", what, scope),
                pred.to_string(),
            ));
        }
    }
    Ok(())
}

impl Atom for WnTuple {
    type Domain = Domain;

    const ELEMENT: ElementKind = ElementKind::TupleFunction;

    fn is_identity(&self) -> bool {
        self.is_unrestricted() && self.is_identity_map()
    }

    fn is_constant(&self) -> bool {
        self.guard.normalize().is_trivial() && self.components.iter().all(|c| c.is_constant())
    }

    fn is_nonzero(&self) -> bool {
        self.is_unrestricted() && self.components.iter().all(|c| !c.is_empty())
    }

    fn is_false(&self) -> bool {
        WnTuple::is_false(self)
    }

    fn check_guard(&self, guard: &Guard) -> Result<()> {
        check_scope(guard, &self.domain, "guard")
    }

    fn codomain(&self) -> Domain {
        WnTuple::codomain(self)
    }

    fn rebind(&self, codomain: &Domain) -> Self {
        Self {
            domain: codomain.clone(),
            ..self.clone()
        }
    }
}

impl fmt::Display for WnTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.guard.is_trivial() {
            write!(f, "[{}]", self.guard)?;
        }
        write!(f, "<{}>", self.components.iter().join(", "))?;
        if !self.filter.is_trivial() {
            write!(f, "[{}]", self.filter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::expr::LogicalExpr;
    use crate::guard::Predicate;
    use crate::types::indices;

    fn c0() -> Sort {
        Sort::new(0)
    }

    fn x(i: u32) -> LinearComb {
        LinearComb::projection(c0(), i)
    }

    fn s() -> LinearComb {
        LinearComb::all(c0())
    }

    fn tuple(components: Vec<LinearComb>) -> WnTuple {
        WnTuple::simple(Domain::single(c0(), 4), components).unwrap()
    }

    #[test]
    fn test_new_checks_indices() {
        let res = WnTuple::simple(Domain::single(c0(), 2), vec![x(3)]);
        assert!(matches!(res, Err(Error::TypeMismatch { .. })));

        let guard = Guard::from(Predicate::eq(Sort::new(1), 1, 2));
        let res = WnTuple::new(Domain::single(c0(), 2), vec![x(1)], Guard::True, guard);
        assert!(matches!(res, Err(Error::TypeMismatch { .. })));

        let filter = Guard::from(Predicate::eq(c0(), 1, 2));
        let res = WnTuple::new(Domain::single(c0(), 2), vec![x(1)], filter, Guard::True);
        assert!(matches!(res, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_accessors() {
        let t = tuple(vec![x(1), s(), x(3)]);
        assert_eq!(t.arity(), 3);
        assert_eq!(t.codomain(), Domain::single(c0(), 3));
        assert_eq!(t.sort(), Some(c0()));
        assert_eq!(t.index_set(), indices([1, 3]));
        assert_eq!(t.to_string(), "<X1, S, X3>");
    }

    #[test]
    fn test_multi_color() {
        let c1 = Sort::new(1);
        let d = Domain::new([(c0(), 1), (c1, 1)]);
        let t = WnTuple::simple(d, vec![x(1), LinearComb::projection(c1, 1)]).unwrap();
        assert!(!t.is_single_color());
        assert_eq!(t.sort(), None);
        assert!(matches!(t.expand(), Err(Error::Precondition(_))));
        assert!(matches!(t.independent_components(), Err(Error::Precondition(_))));
    }

    #[test]
    fn test_join_filter() {
        let t = tuple(vec![x(1), x(2)]);
        let p = Guard::from(Predicate::eq(c0(), 1, 2));
        let f = t.join_filter(&p);
        assert_eq!(f.filter(), &p);
        assert_eq!(f.components(), t.components());
        assert!(!f.is_false());
        assert!(f.join_filter(&p.clone().not()).is_false());
        assert_eq!(f.to_string(), "<X1, X2>[X1 = X2]");
    }

    #[test]
    fn test_expand() {
        let t = tuple(vec![x(1).with(ElementaryFn::projection(2), 1), s()]);
        let choices = t.expand().unwrap();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0][0], (Some(Index::new(1)), x(1)));
        assert_eq!(choices[1][0], (Some(Index::new(2)), x(2)));
        assert!(choices.iter().all(|c| c[1] == (None, s())));

        let empty = WnTuple::simple(Domain::empty(), vec![]).unwrap();
        assert_eq!(empty.expand().unwrap(), vec![Vec::new()]);
    }

    #[test]
    fn test_single_index_split() {
        // <X1 + X2> => {<X1>, <X2>}
        let t = tuple(vec![x(1).with(ElementaryFn::projection(2), 1)]);
        let split = t.single_index_components_tuples().unwrap();
        assert_eq!(split.len(), 2);
        assert!(split.contains(&tuple(vec![x(1)])));
        assert!(split.contains(&tuple(vec![x(2)])));
    }

    #[test]
    fn test_single_index_split_keeps_constants_together() {
        // <X1 + ^X1 + S, X2 + X3> => {<X1 + ^X1>, <S>} x {<X2>, <X3>}
        let first = x(1).with(ElementaryFn::successor(1, -1), 1).with(ElementaryFn::All, 1);
        let second = x(2).with(ElementaryFn::projection(3), 1);
        let t = tuple(vec![first, second]);
        assert_eq!(t.expansion_size(), BigUint::from(4u32));
        let split = t.single_index_components_tuples().unwrap();
        assert_eq!(split.len(), 4);
        let pred = x(1).with(ElementaryFn::successor(1, -1), 1);
        assert!(split.contains(&tuple(vec![pred, x(3)])));
        assert!(split.contains(&tuple(vec![s(), x(2)])));
    }

    #[test]
    fn test_single_index_nothing_to_split() {
        let t = tuple(vec![x(1).with(ElementaryFn::successor(1, 1), 2), s()]);
        let split = t.single_index_components_tuples().unwrap();
        assert_eq!(split.len(), 1);
        assert_eq!(split.first(), Some(&t));
    }

    #[test]
    fn test_single_index_limit() {
        let wide = x(1).with(ElementaryFn::projection(2), 1).with(ElementaryFn::projection(3), 1);
        let t = tuple(vec![wide.clone(), wide.clone(), wide]);
        assert_eq!(t.expansion_size(), BigUint::from(27u32));
        let config = Config {
            max_expansion: 10,
            ..Config::default()
        };
        assert!(matches!(
            t.single_index_components_tuples_with(&config),
            Err(Error::LimitExceeded { limit: 10, .. })
        ));
    }

    #[test]
    fn test_independent_components_trivial_guard() {
        // <S, X3> with no guard: {} -> [0], {3} -> [1]
        let t = tuple(vec![s(), x(3)]);
        let groups = t.independent_components().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&indices([])], IndexMap::from([(0, s())]));
        assert_eq!(groups[&indices([3])], IndexMap::from([(1, x(3))]));
    }

    #[test]
    fn test_independent_components_with_guard() {
        // [X1 = X2 && X3 != X4] <X1, X3, X2, S, X4>
        let guard = Guard::And(vec![
            Predicate::eq(c0(), 1, 2).into(),
            Predicate::neq(c0(), 3, 4).into(),
        ]);
        let t = WnTuple::new(
            Domain::single(c0(), 4),
            vec![x(1), x(3), x(2), s(), x(4)],
            Guard::True,
            guard,
        )
        .unwrap();
        let groups = t.independent_components_v2(&[indices([1, 2]), indices([3, 4])]).unwrap();
        assert_eq!(
            groups,
            IndexMap::from([(indices([1, 2]), vec![0, 2, 3]), (indices([3, 4]), vec![1, 4])])
        );
        let full = t.independent_components().unwrap();
        assert_eq!(full.keys().cloned().collect::<Vec<_>>(), vec![indices([1, 2]), indices([3, 4])]);
    }

    #[test]
    fn test_independent_components_drops_empty_groups() {
        let t = tuple(vec![x(1)]);
        let groups = t.independent_components_in(&[indices([2]), indices([1])]).unwrap();
        assert_eq!(groups.keys().cloned().collect::<Vec<_>>(), vec![indices([1])]);
    }

    #[test]
    fn test_independent_components_requires_and_form() {
        let guard = Guard::from(Predicate::eq(c0(), 1, 2)).or(Predicate::eq(c0(), 3, 4).into());
        let t = WnTuple::new(Domain::single(c0(), 4), vec![x(1)], Guard::True, guard).unwrap();
        assert!(matches!(t.independent_components(), Err(Error::Precondition(_))));
    }

    #[test]
    fn test_atom_queries() {
        let id = WnTuple::simple(Domain::single(c0(), 2), vec![x(1), x(2)]).unwrap();
        assert!(id.is_identity());
        let swapped = WnTuple::simple(Domain::single(c0(), 2), vec![x(2), x(1)]).unwrap();
        assert!(!swapped.is_identity());

        let k = tuple(vec![s()]);
        assert!(k.is_constant());
        assert!(k.is_nonzero());
        let rebound = k.rebind(&Domain::single(c0(), 1));
        assert_eq!(rebound.domain(), &Domain::single(c0(), 1));
        assert_eq!(rebound.components(), k.components());

        let zero = tuple(vec![LinearComb::zero(c0())]);
        assert!(zero.is_false());
        assert!(!zero.is_nonzero());
    }

    #[test]
    fn test_tuple_expressions() {
        // <S> . <X1> => <S> over the codomain of <X1>
        let k = LogicalExpr::term(tuple(vec![s()]));
        let f = LogicalExpr::term(tuple(vec![x(1)]));
        let e = LogicalExpr::compose(k, f);
        let expected = WnTuple::simple(Domain::single(c0(), 1), vec![s()]).unwrap();
        assert_eq!(e.normalize(), LogicalExpr::term(expected.clone()));

        // The constant keeps its values, only its input structure changes.
        assert_eq!(expected.codomain(), Domain::single(c0(), 1));
        assert_eq!(expected.components(), &[s()]);

        // Complementary-pair detection is disabled for tuple functions.
        let a = LogicalExpr::term(tuple(vec![x(1)]));
        let e = LogicalExpr::and([a.clone(), LogicalExpr::not(a.clone())]);
        assert_eq!(e.normalize(), e);
    }

    #[test]
    fn test_false_tuple_absorbs() {
        let zero = LogicalExpr::term(tuple(vec![LinearComb::zero(c0())]));
        let f = LogicalExpr::term(tuple(vec![x(1)]));
        assert!(zero.is_false());
        assert_eq!(zero.gen_simplify(), LogicalExpr::False);
        assert_eq!(LogicalExpr::and([zero.clone(), f.clone()]).normalize(), LogicalExpr::False);
        assert_eq!(LogicalExpr::compose(f.clone(), zero.clone()).normalize(), LogicalExpr::False);
        assert_eq!(LogicalExpr::compose(zero.clone(), f.clone()).normalize(), LogicalExpr::False);
        assert_eq!(LogicalExpr::or([zero, f.clone()]).normalize(), f);

        let p = Guard::from(Predicate::eq(c0(), 1, 2));
        let dead = WnTuple::new(Domain::single(c0(), 4), vec![x(1)], Guard::True, p.clone().and(p.not())).unwrap();
        assert_eq!(LogicalExpr::term(dead).normalize(), LogicalExpr::False);
    }

    #[test]
    fn test_guard_outside_domain() {
        let t = WnTuple::simple(Domain::single(c0(), 2), vec![x(1)]).unwrap();
        let foreign = Guard::from(Predicate::eq(Sort::new(5), 1, 9));
        let res = LogicalExpr::guarded(LogicalExpr::term(t.clone()), Some(foreign.clone()));
        assert!(matches!(res, Err(Error::TypeMismatch { .. })));

        let too_far = Guard::from(Predicate::eq(c0(), 1, 3));
        let nested = LogicalExpr::and([LogicalExpr::True, LogicalExpr::not(LogicalExpr::term(t.clone()))]);
        assert!(matches!(
            LogicalExpr::guarded(nested, Some(too_far)),
            Err(Error::TypeMismatch { .. })
        ));

        let inner = Guard::from(Predicate::neq(c0(), 1, 2));
        let e = LogicalExpr::guarded(LogicalExpr::term(t), Some(inner)).unwrap();
        assert_eq!(e.to_string(), "[X1 != X2] <X1>");
        assert!(LogicalExpr::guarded(LogicalExpr::<WnTuple>::True, Some(foreign)).is_ok());
    }
}
